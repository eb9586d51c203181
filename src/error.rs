//! Error types for the EQ trainer engine.

use thiserror::Error;

/// Every failure the engine can surface to a caller.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid center frequency {center_hz} Hz for sample rate {sample_rate} Hz")]
    InvalidFrequency { center_hz: f64, sample_rate: f64 },

    #[error("Invalid Q factor {0}: must be greater than zero")]
    InvalidQ(f64),

    #[error("No source audio available")]
    NoSourceAvailable,

    #[error("No active game session: request a bundle first")]
    NoActiveSession,

    #[error("Invalid guess: {0}")]
    InvalidGuessFormat(String),

    #[error("Range index {0} is out of bounds")]
    InvalidRange(usize),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a transport should classify a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    NotFound,
    BadRequest,
    Internal,
}

impl GameError {
    pub fn status_class(&self) -> StatusClass {
        match self {
            GameError::NoSourceAvailable | GameError::NoActiveSession => StatusClass::NotFound,
            GameError::InvalidGuessFormat(_) => StatusClass::BadRequest,
            _ => StatusClass::Internal,
        }
    }
}

impl From<hound::Error> for GameError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => GameError::Io(io),
            other => GameError::Codec(other.to_string()),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, GameError>;
