//! Ticket domain module.
//!
//! # Module Structure
//!
//! - `model`: the cached ticket (`Ticket`)
//! - `status`: enumerated status codes and the declarative status table
//! - `stage`: pipeline stage derivation (`derive_stages`)
//! - `action`: user actions gated on status (`TicketAction`)
//! - `api`: REST contract for ticket endpoints (`TicketApi`)

mod action;
mod api;
mod model;
mod stage;
mod status;

pub use action::{FeedbackVerdict, TicketAction, ensure_action_allowed, legal_actions};
pub use api::{NewTicket, StateCounts, TicketApi};
pub use model::Ticket;
pub use stage::{Pipeline, PipelineStage, StageMarker, derive_stages};
pub use status::{Escalation, EscalationMatch, StatusCode, StatusTone, TicketStatus};
