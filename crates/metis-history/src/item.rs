//! Records that own versioned field values.
//!
//! [`FieldedItem`] is the view collaborators need of a record: its catalog
//! and its live values. [`VersionedRecord`] is the stock implementation,
//! holding a [`HistoryStack`] and the [`EncryptionGenerator`] used to write
//! encrypted fields.

use std::sync::Arc;

use metis_crypto::SharedKeySet;
use metis_encrypt::{EncryptionError, EncryptionGenerator};
use metis_fields::{
    CatalogId, CatalogRegistry, FieldCatalog, FieldDescriptor, SlotValue, ValueSlots,
};
use metis_types::{DifferenceResult, FieldValue, ValueFormatter};
use tracing::debug;

use crate::error::Result;
use crate::stack::HistoryStack;

/// A record exposing its field layout and current values.
pub trait FieldedItem {
    fn catalog(&self) -> &Arc<FieldCatalog>;

    fn value_slots(&self) -> &ValueSlots;

    /// The business value of `field`, if set.
    fn value(&self, field: &FieldDescriptor) -> Option<FieldValue> {
        self.value_slots().get(field).map(SlotValue::value)
    }
}

/// A record with checkpointed history and encrypted field support.
#[derive(Clone, Debug)]
pub struct VersionedRecord {
    history: HistoryStack,
    generator: EncryptionGenerator,
}

impl VersionedRecord {
    /// An empty record laid out by `catalog`.
    pub fn new(catalog: Arc<FieldCatalog>, generator: EncryptionGenerator) -> Self {
        Self::load(ValueSlots::new(catalog), generator)
    }

    /// An empty record whose catalog is resolved from `registry`.
    pub fn from_registry(
        registry: &CatalogRegistry,
        id: CatalogId,
        generator: EncryptionGenerator,
    ) -> Result<Self> {
        Ok(Self::new(registry.get(id)?, generator))
    }

    /// A record holding previously stored values, with no history.
    pub fn load(values: ValueSlots, generator: EncryptionGenerator) -> Self {
        Self {
            history: HistoryStack::new(values),
            generator,
        }
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStack {
        &mut self.history
    }

    pub fn generator(&self) -> &EncryptionGenerator {
        &self.generator
    }

    pub fn get(&self, field: &FieldDescriptor) -> Option<&SlotValue> {
        self.history.current().get(field)
    }

    pub fn set(&mut self, field: &FieldDescriptor, value: impl Into<FieldValue>) {
        self.history.current_mut().set_plain(field, value);
    }

    /// Write `value` encrypted under the record's key-set.
    pub fn set_encrypted(
        &mut self,
        field: &FieldDescriptor,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        self.history
            .current_mut()
            .set_encrypted(field, value.into(), &self.generator)?;
        Ok(())
    }

    pub fn clear(&mut self, field: &FieldDescriptor) {
        self.history.current_mut().set(field, None);
    }

    pub fn mark_deleted(&mut self) {
        self.history.current_mut().set_deletion(true);
    }

    pub fn field_changed(&self, field: &FieldDescriptor) -> DifferenceResult {
        self.history.field_changed(field)
    }

    /// Switch to `keyset` and re-encrypt every encrypted field.
    ///
    /// Returns the number of fields re-keyed. On failure the record keeps
    /// its previous values and key-set.
    pub fn rekey(&mut self, keyset: SharedKeySet) -> Result<usize> {
        let mut next = self.history.current().clone();
        let rekeyed = next.update_security(&keyset)?;
        *self.history.current_mut() = next;
        self.generator.set_keyset(Some(keyset));
        Ok(rekeyed)
    }

    /// Bring encrypted fields under the record's key-set, reusing ciphertext
    /// from `base` for fields it already encrypts with the same value.
    pub fn adopt_security(&mut self, base: &ValueSlots) -> Result<()> {
        let keyset = self
            .generator
            .keyset()
            .cloned()
            .ok_or(EncryptionError::EncryptionNotInitialized)?;
        self.history.current_mut().adopt_security(&keyset, base)?;
        Ok(())
    }

    /// One line per field changed since the original values.
    pub fn audit(&self, formatter: &dyn ValueFormatter) -> Vec<String> {
        let lines: Vec<String> = self
            .history
            .net_delta()
            .changed()
            .map(|delta| delta.describe(formatter))
            .collect();
        debug!(
            catalog = %self.catalog().name(),
            changed = lines.len(),
            "audit rendered"
        );
        lines
    }
}

impl FieldedItem for VersionedRecord {
    fn catalog(&self) -> &Arc<FieldCatalog> {
        self.history.current().catalog()
    }

    fn value_slots(&self) -> &ValueSlots {
        self.history.current()
    }
}
