//! Error types for weightcache

use std::fmt;
use std::io;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug)]
pub enum Error {
    /// Key is already resident; nothing was changed
    AlreadyExists(String),

    /// Adding the entry would overflow the running weight total
    WeightOverflow {
        /// Key of the rejected entry
        key: String,
        /// Weight of the rejected entry
        weight: u64,
    },

    /// The notice sink failed while reporting an eviction.
    ///
    /// The insert itself went through and eviction ran to completion.
    Notice(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlreadyExists(key) => write!(f, "key already exists: {}", key),
            Error::WeightOverflow { key, weight } => {
                write!(f, "weight overflow inserting {} ({})", key, weight)
            }
            Error::Notice(e) => write!(f, "eviction notice failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Notice(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Notice(err)
    }
}
