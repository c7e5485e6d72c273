//! Application layer for ticketdesk.
//!
//! Use cases that sit between the domain model in `ticketdesk-core` and the
//! network clients: login/logout, the per-ticket session channel and the
//! ticket view controller built on top of it.

pub mod auth_service;
pub mod ticket_session;
pub mod ticket_view;

pub use auth_service::AuthService;
pub use ticket_session::{SessionView, TicketSessionChannel};
pub use ticket_view::TicketViewController;
