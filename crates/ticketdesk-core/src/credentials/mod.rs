//! Credential domain module.
//!
//! # Module Structure
//!
//! - `model`: the stored session (`Credentials`) and its lease policy
//! - `store`: read/write accessors for the process-wide credential store
//!
//! Only the token lifecycle manager and the login/logout flow receive a
//! [`CredentialWriter`]; every other component gets a [`CredentialReader`].

mod model;
mod store;

pub use model::{Credentials, REFRESH_BUFFER, SESSION_LEASE};
pub use store::{CredentialReader, CredentialWriter};
