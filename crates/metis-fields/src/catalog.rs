//! Field catalogs: per-record-type field metadata.
//!
//! A [`CatalogBuilder`] declares fields and assigns each slotted field a
//! stable slot index. [`CatalogBuilder::build`] freezes the result into an
//! immutable [`FieldCatalog`] shared through `Arc`. A child catalog continues
//! its parent's numbering, so a subtype's slot array is a strict extension of
//! its parent's layout.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, Result};

static NEXT_CATALOG_ID: AtomicU32 = AtomicU32::new(1);

/// Process-wide unique catalog identity, assigned in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogId(u32);

impl CatalogId {
    fn next() -> Self {
        Self(NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cat:{}", self.0)
    }
}

/// Metadata for one declared field.
///
/// Descriptors are handed out at declaration time and stay valid for the
/// lifetime of the catalog; the indices they carry are never renumbered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
    index: usize,
    slot_index: Option<usize>,
    is_equality: bool,
    owner: CatalogId,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position among all fields of the owning catalog's lineage.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Storage slot, present only for slotted fields.
    pub fn slot_index(&self) -> Option<usize> {
        self.slot_index
    }

    pub fn is_equality(&self) -> bool {
        self.is_equality
    }

    pub fn is_slotted(&self) -> bool {
        self.slot_index.is_some()
    }

    /// The catalog that declared this field.
    pub fn owner(&self) -> CatalogId {
        self.owner
    }

    /// Returns `true` if this field takes part in difference checks.
    pub fn tracks_difference(&self) -> bool {
        self.is_equality && self.is_slotted()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declares fields for a new catalog.
///
/// Declaration takes `&mut self`, so a builder has a single writer.
#[derive(Debug)]
pub struct CatalogBuilder {
    id: CatalogId,
    name: String,
    parent: Option<Arc<FieldCatalog>>,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    next_slot: usize,
}

impl CatalogBuilder {
    /// Start a root catalog.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parent(name, None)
    }

    /// Start a catalog that extends `parent`.
    pub fn extending(name: impl Into<String>, parent: Arc<FieldCatalog>) -> Self {
        Self::with_parent(name, Some(parent))
    }

    fn with_parent(name: impl Into<String>, parent: Option<Arc<FieldCatalog>>) -> Self {
        let next_slot = parent.as_ref().map_or(0, |p| p.total_slots());
        Self {
            id: CatalogId::next(),
            name: name.into(),
            parent,
            fields: Vec::new(),
            by_name: HashMap::new(),
            next_slot,
        }
    }

    pub fn id(&self) -> CatalogId {
        self.id
    }

    /// Declare a field.
    ///
    /// Fails if the name is already used here or by any ancestor.
    pub fn declare_field(
        &mut self,
        name: impl Into<String>,
        is_equality: bool,
        is_slotted: bool,
    ) -> Result<FieldDescriptor> {
        let name = name.into();
        let inherited = self
            .parent
            .as_ref()
            .is_some_and(|p| p.field(&name).is_some());
        if inherited || self.by_name.contains_key(&name) {
            return Err(CatalogError::DuplicateFieldName {
                name,
                catalog: self.name.clone(),
            });
        }

        let parent_count = self.parent.as_ref().map_or(0, |p| p.field_count());
        let slot_index = is_slotted.then(|| {
            let slot = self.next_slot;
            self.next_slot += 1;
            slot
        });
        let field = FieldDescriptor {
            name: name.clone(),
            index: parent_count + self.fields.len(),
            slot_index,
            is_equality,
            owner: self.id,
        };
        self.by_name.insert(name, self.fields.len());
        self.fields.push(field.clone());
        Ok(field)
    }

    /// Declare a slotted field that takes part in equality.
    pub fn declare_equality_field(&mut self, name: impl Into<String>) -> Result<FieldDescriptor> {
        self.declare_field(name, true, true)
    }

    /// Declare a bookkeeping field with a position but no storage.
    pub fn declare_index_field(&mut self, name: impl Into<String>) -> Result<FieldDescriptor> {
        self.declare_field(name, false, false)
    }

    /// Freeze the declarations.
    pub fn build(self) -> Arc<FieldCatalog> {
        debug!(
            catalog = %self.name,
            id = %self.id,
            parent = ?self.parent.as_ref().map(|p| p.id()),
            fields = self.fields.len(),
            total_slots = self.next_slot,
            "catalog built"
        );
        Arc::new(FieldCatalog {
            id: self.id,
            name: self.name,
            parent: self.parent,
            fields: self.fields,
            by_name: self.by_name,
            total_slots: self.next_slot,
        })
    }
}

/// Immutable field metadata for one record type.
#[derive(Debug)]
pub struct FieldCatalog {
    id: CatalogId,
    name: String,
    parent: Option<Arc<FieldCatalog>>,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    total_slots: usize,
}

impl FieldCatalog {
    pub fn id(&self) -> CatalogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<FieldCatalog>> {
        self.parent.as_ref()
    }

    /// Number of storage slots, including every ancestor's.
    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    /// Number of fields, including every ancestor's.
    pub fn field_count(&self) -> usize {
        self.parent_field_count() + self.fields.len()
    }

    /// Fields declared by this catalog alone.
    pub fn local_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// All fields, ancestors first.
    pub fn iter_fields(&self) -> Fields<'_> {
        let mut lineage = Vec::new();
        let mut next = Some(self);
        while let Some(catalog) = next {
            lineage.push(catalog);
            next = catalog.parent.as_deref();
        }
        Fields {
            lineage,
            current: Default::default(),
        }
    }

    /// Look up a field by name here or in any ancestor.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        match self.by_name.get(name) {
            Some(&i) => self.fields.get(i),
            None => self.parent.as_ref().and_then(|p| p.field(name)),
        }
    }

    /// Look up a field by position index.
    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor> {
        let parent_count = self.parent_field_count();
        if index < parent_count {
            self.parent.as_ref().and_then(|p| p.field_at(index))
        } else {
            self.fields.get(index - parent_count)
        }
    }

    /// Returns `true` if `id` is this catalog or one of its ancestors.
    pub fn is_descendant_of(&self, id: CatalogId) -> bool {
        self.id == id || self.parent.as_ref().is_some_and(|p| p.is_descendant_of(id))
    }

    /// Returns `true` if `field` was declared by this catalog's lineage.
    pub fn owns(&self, field: &FieldDescriptor) -> bool {
        self.is_descendant_of(field.owner)
    }

    fn parent_field_count(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.field_count())
    }
}

/// Ancestor-first iterator over a catalog's fields.
pub struct Fields<'a> {
    lineage: Vec<&'a FieldCatalog>,
    current: std::slice::Iter<'a, FieldDescriptor>,
}

impl<'a> Iterator for Fields<'a> {
    type Item = &'a FieldDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(field) = self.current.next() {
                return Some(field);
            }
            self.current = self.lineage.pop()?.fields.iter();
        }
    }
}
