/// Errors from key-set operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// Ciphertext is shorter than the framing requires.
    #[error("ciphertext truncated: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    /// The authentication tag did not match (wrong key or tampered bytes).
    #[error("ciphertext authentication failed")]
    AuthenticationFailed,

    /// Key-set configuration is unusable.
    #[error("invalid key-set configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by an external key-set implementation.
    #[error("key-set backend error: {0}")]
    Backend(String),
}

/// Convenience alias for key-set results.
pub type Result<T> = std::result::Result<T, CryptoError>;
