use thiserror::Error;

/// Errors emitted by waiting-store implementations.
#[derive(Debug, Error, Clone)]
pub enum DbError {
    #[error("entry with txid does not exist")]
    NonExistentEntry,

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("codec error {0}")]
    CodecError(String),

    #[error("operation timed out")]
    TimedOut,

    #[error("resource busy")]
    Busy,

    #[error("{0}")]
    Other(String),
}
