use thiserror::Error;

/// Errors produced when parsing or constructing value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("invalid decimal {input:?}: {reason}")]
    InvalidDecimal { input: String, reason: String },

    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("missing currency separator in {0:?}")]
    MissingCurrency(String),

    #[error("unknown value kind: {0:?}")]
    UnknownKind(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for value type results.
pub type Result<T> = std::result::Result<T, TypeError>;
