//! # Authentication
//!
//! Server credentials for the WebDAV backup target and their persistence in
//! the platform secure store.

pub mod credentials;
pub mod error;
pub mod types;

pub use credentials::{CredentialStore, CREDENTIALS_KEY};
pub use error::{AuthError, Result};
pub use types::ServerCredentials;
