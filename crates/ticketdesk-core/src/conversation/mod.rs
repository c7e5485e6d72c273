//! Conversation transcript for one ticket viewing session.

mod entry;
mod log;

pub use entry::{ConversationEntry, Delivery, EntryPayload, Sender, TicketSummary};
pub use log::ConversationLog;
