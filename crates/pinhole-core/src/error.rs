use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors related to the core domain types of the link service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Failures of a [`LinkStore`](crate::repository::LinkStore) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The persisted state exists but could not be read or parsed.
    #[error("failed to read link store: {0}")]
    Read(String),
    /// The persisted state could not be replaced.
    #[error("failed to write link store: {0}")]
    Write(String),
}

/// Errors surfaced by the shortening service to its callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage read failed: {0}")]
    StorageRead(String),
    #[error("storage write failed: {0}")]
    StorageWrite(String),
    #[error("no free short code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}

impl ShortenerError {
    /// Whether the error maps to a "not found" response at the boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the error was caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Read(message) => Self::StorageRead(message),
            StorageError::Write(message) => Self::StorageWrite(message),
        }
    }
}
