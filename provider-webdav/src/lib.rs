//! # WebDAV Provider
//!
//! Backup target for Nextcloud-style WebDAV servers.
//!
//! ## Overview
//!
//! This module provides:
//! - Server reachability checks (`status.php`)
//! - Authenticated connectivity checks (`PROPFIND` on the user root)
//! - Remote inventory listing from `207 Multi-Status` responses
//! - File uploads with `PUT` and a retry policy
//! - Extension based content types

pub mod connector;
pub mod error;
pub mod mime;
pub mod multistatus;
pub mod types;

pub use connector::WebDavConnector;
pub use error::{Result, WebDavError};
pub use mime::content_type_for;
pub use types::{RemoteDirectory, RemoteInventory, ServerStatus};
