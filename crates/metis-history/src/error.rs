//! Error types for versioned records.

use metis_encrypt::EncryptionError;
use metis_fields::CatalogError;
use thiserror::Error;

/// Errors surfaced by [`crate::VersionedRecord`].
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),
}

/// Convenience alias for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
