//! Common error types for CDL

use thiserror::Error;

/// Common result type for CDL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CDL crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),
}
