//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the photo backup core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - Bounded diagnostic logs and status reporting
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that discovery, backup and the
//! service facade depend on. It establishes the logging conventions, the
//! configuration builder and the event broadcasting used throughout the system.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod logging;
pub mod status;

pub use error::{Error, Result};
