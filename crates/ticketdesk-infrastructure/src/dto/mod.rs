//! On-disk representations of domain types.

mod credentials;

pub use credentials::{CREDENTIALS_SCHEMA_VERSION, CredentialsDto};
