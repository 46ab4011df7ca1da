//! Error types for catalog operations.

use thiserror::Error;

use crate::catalog::CatalogId;

/// Errors that can occur while declaring or resolving catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A field name is already declared in this catalog or an ancestor.
    #[error("duplicate field name '{name}' in catalog '{catalog}'")]
    DuplicateFieldName { name: String, catalog: String },

    /// No catalog with this id has been registered.
    #[error("unknown catalog: {0}")]
    UnknownCatalog(CatalogId),

    /// The registry lock was poisoned by a panicking writer.
    #[error("registry lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
