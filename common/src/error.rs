//! Error types

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    /// The model output could not be decoded as JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed JSON with the wrong shape (e.g. missing `image_index`).
    #[error("Structure error: {0}")]
    Structure(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
