//! Core error types for the Omie dashboard.
//!
//! Errors here describe failures of the local process: persisted state that
//! cannot be read or written, user input that fails validation, and internal
//! invariants. Remote API failures are *not* errors at this level; the
//! gateway reports them as data (see `omie_connect::ApiResponse`).

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the dashboard core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Failed to decode API payload for {entity}: {message}")]
    PayloadDecode { entity: String, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Backend-agnostic error type for the key-value settings store.
///
/// Store implementations convert their own failures (I/O, encryption,
/// serialization) into these variants.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing medium could not be read.
    #[error("Failed to read store: {0}")]
    ReadFailed(String),

    /// The backing medium could not be written.
    #[error("Failed to write store: {0}")]
    WriteFailed(String),

    /// The stored content is not in the expected format.
    #[error("Corrupt store content: {0}")]
    Corrupt(String),

    /// The store is encrypted and cannot be opened with the configured key.
    #[error("Store encryption error: {0}")]
    Encryption(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(StorageError::Corrupt(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
