//! Arena of built catalogs indexed by [`CatalogId`].
//!
//! [`CatalogRegistry`] keeps every registered catalog alive and lets callers
//! resolve a parent by id when declaring a subtype. Catalogs are immutable,
//! so readers only ever take the read lock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::catalog::{CatalogBuilder, CatalogId, FieldCatalog};
use crate::error::{CatalogError, Result};

/// Thread-safe catalog arena.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    catalogs: RwLock<HashMap<CatalogId, Arc<FieldCatalog>>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a built catalog.
    pub fn register(&self, catalog: Arc<FieldCatalog>) -> Result<CatalogId> {
        let id = catalog.id();
        let mut catalogs = self
            .catalogs
            .write()
            .map_err(|e| CatalogError::LockPoisoned(e.to_string()))?;
        debug!(catalog = %catalog.name(), id = %id, "catalog registered");
        catalogs.insert(id, catalog);
        Ok(id)
    }

    pub fn get(&self, id: CatalogId) -> Result<Arc<FieldCatalog>> {
        let catalogs = self
            .catalogs
            .read()
            .map_err(|e| CatalogError::LockPoisoned(e.to_string()))?;
        catalogs
            .get(&id)
            .cloned()
            .ok_or(CatalogError::UnknownCatalog(id))
    }

    /// Start a builder, resolving `parent` from this registry.
    pub fn builder_for(
        &self,
        name: impl Into<String>,
        parent: Option<CatalogId>,
    ) -> Result<CatalogBuilder> {
        match parent {
            Some(id) => Ok(CatalogBuilder::extending(name, self.get(id)?)),
            None => Ok(CatalogBuilder::new(name)),
        }
    }

    pub fn len(&self) -> usize {
        self.catalogs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let registry = CatalogRegistry::new();
        assert!(registry.is_empty());

        let mut b = registry.builder_for("Parent", None).unwrap();
        b.declare_equality_field("amount").unwrap();
        let parent_id = registry.register(b.build()).unwrap();

        let mut b = registry.builder_for("Child", Some(parent_id)).unwrap();
        let extra = b.declare_equality_field("extra").unwrap();
        let child_id = registry.register(b.build()).unwrap();

        assert_eq!(registry.len(), 2);
        let child = registry.get(child_id).unwrap();
        assert_eq!(child.parent().map(|p| p.id()), Some(parent_id));
        assert_eq!(extra.slot_index(), Some(1));
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let registry = CatalogRegistry::new();
        let stray = CatalogBuilder::new("Stray").build();
        let err = registry.builder_for("Child", Some(stray.id())).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCatalog(id) if id == stray.id()));
    }

    #[test]
    fn shared_across_threads() {
        let registry = Arc::new(CatalogRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let mut b = CatalogBuilder::new(format!("T{i}"));
                    b.declare_equality_field("f").unwrap();
                    registry.register(b.build()).unwrap()
                })
            })
            .collect();
        let ids: Vec<CatalogId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 4);
        for id in ids {
            assert_eq!(registry.get(id).unwrap().total_slots(), 1);
        }
    }
}
