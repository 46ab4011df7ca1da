//! Error types for the encrypted field family.

use metis_crypto::CryptoError;
use metis_types::{TypeError, ValueKind};

/// Failure converting between a value and its byte encoding.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid integer: {0}")]
    Integer(#[from] std::num::ParseIntError),

    #[error("invalid float: {0}")]
    Float(#[from] std::num::ParseFloatError),

    #[error("invalid boolean: {0}")]
    Boolean(#[from] std::str::ParseBoolError),

    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),

    #[error(transparent)]
    Value(#[from] TypeError),

    #[error("empty big integer encoding")]
    EmptyInteger,
}

/// Errors from encrypted field operations.
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// An encrypt or decrypt was attempted without a key-set.
    #[error("encryption not initialised: no key-set available")]
    EncryptionNotInitialized,

    /// A value could not be converted to or from its byte encoding.
    #[error("failed to convert {kind} value: {source}")]
    ValueConversionFailed {
        kind: ValueKind,
        #[source]
        source: ConversionError,
    },

    /// The factory has no adapter for the requested type tag.
    #[error("unsupported value type: {tag}")]
    UnsupportedValueType { tag: String },

    /// The key-set failed to encrypt or decrypt.
    #[error("key-set error: {0}")]
    KeySet(#[from] CryptoError),
}

impl EncryptionError {
    pub(crate) fn conversion(kind: ValueKind, source: ConversionError) -> Self {
        Self::ValueConversionFailed { kind, source }
    }
}

/// Convenience alias for encryption results.
pub type Result<T> = std::result::Result<T, EncryptionError>;
