use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No source directory configured")]
    NoSourceDirectories,

    #[error("Discovery strategy '{strategy}' failed: {message}")]
    Strategy {
        strategy: &'static str,
        message: String,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
