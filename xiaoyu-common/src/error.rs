//! Common error types for Xiaoyu services

use thiserror::Error;

/// Common result type for Xiaoyu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Xiaoyu services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
