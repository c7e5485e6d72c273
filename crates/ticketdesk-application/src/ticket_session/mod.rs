//! Per-ticket real-time session.
//!
//! # Module Structure
//!
//! - `view`: the snapshot published to observers
//! - `channel`: the session channel and its dispatcher task

mod channel;
mod view;

pub use channel::TicketSessionChannel;
pub use view::SessionView;
