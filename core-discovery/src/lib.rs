//! # Local Discovery
//!
//! Finds the photos that are candidates for backup.
//!
//! ## Components
//!
//! - **Engine** (`engine`): scan lifecycle, result cache and cancellation
//! - **Strategies** (`strategy`, `catalog`, `walk`): platform media catalog
//!   query and recursive directory walk
//! - **Classification** (`classify`): photo extensions and reserved paths
//! - **Cache** (`cache`): time-boxed result of the last completed scan

pub mod cache;
pub mod catalog;
pub mod classify;
pub mod engine;
pub mod error;
pub mod strategy;
pub mod types;
pub mod walk;

pub use cache::ScanCache;
pub use catalog::CatalogStrategy;
pub use engine::DiscoveryEngine;
pub use error::{DiscoveryError, Result};
pub use strategy::{DiscoveryStrategy, ScanSession};
pub use types::{LocalFileRef, ScanOutcome, ScanSource, SourceDirectory};
pub use walk::WalkStrategy;
