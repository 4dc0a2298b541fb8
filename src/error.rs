//! Error type shared by the whole crate.
//!
//! Load failures are not errors: they travel through the completion channel
//! as [`LoadFailure`](crate::resources::loadprogress::LoadFailure) values.

use thiserror::Error;

/// Everything that can go wrong when calling into the sprite manager.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpriteError {
    /// Unknown or not yet loaded asset, or an instance this manager does not track.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed argument: renderer not ready, non-positive throttle, bad direction...
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Configuration file could not be read or written.
    #[error("config error: {0}")]
    Config(String),
    /// Animation options could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SpriteError>;

impl From<serde_json::Error> for SpriteError {
    fn from(e: serde_json::Error) -> Self {
        SpriteError::Parse(e.to_string())
    }
}
