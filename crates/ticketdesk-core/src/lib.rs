//! Domain model and seam traits for the Ticketdesk client session layer.

pub mod auth;
pub mod channel;
pub mod clock;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod ticket;

// Re-export common error type
pub use error::{DeskError, Result};
