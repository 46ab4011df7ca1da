//! Versioned value slots.
//!
//! [`ValueSlots`] is the fixed-size array of field values for one record
//! version. Its layout comes from a [`FieldCatalog`]; only slotted fields
//! have storage, and only equality fields take part in comparisons.

use std::sync::Arc;

use metis_crypto::SharedKeySet;
use metis_encrypt::{EncryptedValue, EncryptionError, EncryptionGenerator};
use metis_types::{
    compare_with, Difference, DifferenceResult, FieldValue, ValueFormatter, ValueKind,
};
use tracing::{debug, trace, warn};

use crate::catalog::{FieldCatalog, FieldDescriptor};

/// The content of one slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotValue {
    Plain(FieldValue),
    Encrypted(EncryptedValue),
}

impl SlotValue {
    /// The business value, decrypted where necessary.
    pub fn value(&self) -> FieldValue {
        match self {
            Self::Plain(v) => v.clone(),
            Self::Encrypted(v) => v.value(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Plain(v) => v.kind(),
            Self::Encrypted(v) => v.kind(),
        }
    }

    pub fn as_encrypted(&self) -> Option<&EncryptedValue> {
        match self {
            Self::Encrypted(v) => Some(v),
            Self::Plain(_) => None,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }

    pub fn formatted(&self, formatter: &dyn ValueFormatter) -> String {
        match self {
            Self::Plain(v) => formatter.format_object(v),
            Self::Encrypted(v) => v.formatted(formatter),
        }
    }
}

impl Difference for SlotValue {
    fn difference(&self, other: &Self) -> DifferenceResult {
        match (self, other) {
            (Self::Encrypted(a), Self::Encrypted(b)) => a.difference(b),
            _ => DifferenceResult::from_equality(self == other),
        }
    }
}

impl From<FieldValue> for SlotValue {
    fn from(value: FieldValue) -> Self {
        Self::Plain(value)
    }
}

impl From<EncryptedValue> for SlotValue {
    fn from(value: EncryptedValue) -> Self {
        Self::Encrypted(value)
    }
}

/// Field values of one record version.
///
/// The array always has exactly `catalog.total_slots()` entries. Reads and
/// writes through a field that is not slotted, or not part of the catalog's
/// lineage, are ignored.
#[derive(Clone, Debug)]
pub struct ValueSlots {
    catalog: Arc<FieldCatalog>,
    values: Vec<Option<SlotValue>>,
    version: u32,
    is_deletion: bool,
}

impl ValueSlots {
    /// An empty slot array laid out by `catalog`.
    pub fn new(catalog: Arc<FieldCatalog>) -> Self {
        let values = vec![None; catalog.total_slots()];
        Self {
            catalog,
            values,
            version: 0,
            is_deletion: false,
        }
    }

    pub fn catalog(&self) -> &Arc<FieldCatalog> {
        &self.catalog
    }

    pub fn slot_count(&self) -> usize {
        self.values.len()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    pub fn is_deletion(&self) -> bool {
        self.is_deletion
    }

    pub fn set_deletion(&mut self, is_deletion: bool) {
        self.is_deletion = is_deletion;
    }

    pub fn get(&self, field: &FieldDescriptor) -> Option<&SlotValue> {
        if !self.catalog.owns(field) {
            return None;
        }
        self.slot(field)
    }

    /// Store `value` in the field's slot; `None` clears it.
    pub fn set(&mut self, field: &FieldDescriptor, value: Option<SlotValue>) {
        if !self.catalog.owns(field) {
            warn!(
                field = %field,
                catalog = %self.catalog.name(),
                "ignoring write to field of another catalog"
            );
            return;
        }
        if let Some(slot) = field.slot_index().and_then(|i| self.values.get_mut(i)) {
            *slot = value;
        }
    }

    pub fn set_plain(&mut self, field: &FieldDescriptor, value: impl Into<FieldValue>) {
        self.set(field, Some(SlotValue::Plain(value.into())));
    }

    /// Store `value` encrypted under the generator's key-set.
    ///
    /// Writing the value already held keeps the existing ciphertext.
    pub fn set_encrypted(
        &mut self,
        field: &FieldDescriptor,
        value: FieldValue,
        generator: &EncryptionGenerator,
    ) -> Result<(), EncryptionError> {
        let current = self.get(field).and_then(SlotValue::as_encrypted);
        let encrypted = generator.encrypt_value(current, value)?;
        self.set(field, Some(SlotValue::Encrypted(encrypted)));
        Ok(())
    }

    /// The same values laid out by another catalog, typically a subtype.
    ///
    /// Copies as many slots as both layouts share and keeps the version and
    /// deletion flag.
    pub fn migrate(&self, catalog: Arc<FieldCatalog>) -> Self {
        trace!(
            from = %self.catalog.name(),
            to = %catalog.name(),
            "migrating value slots"
        );
        let mut migrated = Self::new(catalog);
        migrated.copy_from(self);
        migrated
    }

    /// Overwrite values, version and deletion flag from `other`.
    ///
    /// Slots beyond the shorter array are left untouched.
    pub fn copy_from(&mut self, other: &ValueSlots) {
        for (dst, src) in self.values.iter_mut().zip(&other.values) {
            dst.clone_from(src);
        }
        self.version = other.version;
        self.is_deletion = other.is_deletion;
    }

    /// Business equality over equality fields.
    ///
    /// A security-only difference still counts as equal.
    pub fn equals(&self, other: &ValueSlots) -> bool {
        if self.is_deletion != other.is_deletion || self.slot_count() != other.slot_count() {
            return false;
        }
        self.compared_fields()
            .all(|f| !compare_with(self.slot(f), other.slot(f)).is_different())
    }

    /// Aggregate difference over equality fields.
    ///
    /// The first `Different` field ends the scan; a `SecurityDifferent`
    /// field is remembered while the scan carries on.
    pub fn differs(&self, other: &ValueSlots) -> DifferenceResult {
        if self.is_deletion != other.is_deletion || self.slot_count() != other.slot_count() {
            return DifferenceResult::Different;
        }
        let mut result = DifferenceResult::Identical;
        for field in self.compared_fields() {
            match compare_with(self.slot(field), other.slot(field)) {
                DifferenceResult::Different => return DifferenceResult::Different,
                DifferenceResult::SecurityDifferent => {
                    result = DifferenceResult::SecurityDifferent;
                }
                DifferenceResult::Identical => {}
            }
        }
        result
    }

    /// Difference of one field against `original`.
    ///
    /// Fields the catalog does not own are `Identical`.
    pub fn field_changed(&self, field: &FieldDescriptor, original: &ValueSlots) -> DifferenceResult {
        if !field.tracks_difference() || !self.catalog.owns(field) {
            return DifferenceResult::Identical;
        }
        compare_with(self.slot(field), original.slot(field))
    }

    /// Re-encrypt every encrypted slot under `keyset`.
    ///
    /// Returns the number of slots re-keyed.
    pub fn update_security(&mut self, keyset: &SharedKeySet) -> Result<usize, EncryptionError> {
        let mut rekeyed = 0;
        for value in self.encrypted_slots_mut() {
            value.apply_encryption(keyset.clone())?;
            rekeyed += 1;
        }
        debug!(
            catalog = %self.catalog.name(),
            keyset = %keyset.id().short_hex(),
            rekeyed,
            "updated slot security"
        );
        Ok(rekeyed)
    }

    /// Bring every encrypted slot under `keyset`, reusing ciphertext from
    /// the matching slot of `base` where it already encrypts the same value.
    pub fn adopt_security(
        &mut self,
        keyset: &SharedKeySet,
        base: &ValueSlots,
    ) -> Result<(), EncryptionError> {
        for (i, slot) in self.values.iter_mut().enumerate() {
            if let Some(SlotValue::Encrypted(value)) = slot {
                let source = base
                    .values
                    .get(i)
                    .and_then(Option::as_ref)
                    .and_then(SlotValue::as_encrypted);
                value.adopt_encryption(keyset.clone(), source)?;
            }
        }
        Ok(())
    }

    fn slot(&self, field: &FieldDescriptor) -> Option<&SlotValue> {
        field
            .slot_index()
            .and_then(|i| self.values.get(i))
            .and_then(Option::as_ref)
    }

    fn compared_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.catalog
            .iter_fields()
            .filter(|f| f.tracks_difference())
    }

    fn encrypted_slots_mut(&mut self) -> impl Iterator<Item = &mut EncryptedValue> {
        self.values.iter_mut().filter_map(|slot| match slot {
            Some(SlotValue::Encrypted(value)) => Some(value),
            _ => None,
        })
    }
}

impl PartialEq for ValueSlots {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Difference for ValueSlots {
    fn difference(&self, other: &Self) -> DifferenceResult {
        self.differs(other)
    }
}

#[cfg(test)]
mod tests {
    use metis_crypto::{Blake3KeySet, KeySetConfig};
    use metis_types::{Currency, Money};

    use super::*;
    use crate::catalog::CatalogBuilder;

    struct Fixture {
        catalog: Arc<FieldCatalog>,
        amount: FieldDescriptor,
        note: FieldDescriptor,
        scratch: FieldDescriptor,
        label: FieldDescriptor,
    }

    fn fixture() -> Fixture {
        let mut b = CatalogBuilder::new("Trade");
        let amount = b.declare_equality_field("amount").unwrap();
        let note = b.declare_equality_field("note").unwrap();
        let scratch = b.declare_field("scratch", false, true).unwrap();
        let label = b.declare_index_field("label").unwrap();
        Fixture {
            catalog: b.build(),
            amount,
            note,
            scratch,
            label,
        }
    }

    fn keyset(secret: &[u8]) -> SharedKeySet {
        SharedKeySet::new(Blake3KeySet::from_secret(secret, &KeySetConfig::default()).unwrap())
    }

    fn money(amount: &str) -> FieldValue {
        FieldValue::Money(Money::parse(amount, Currency::GBP).unwrap())
    }

    #[test]
    fn new_slots_are_empty() {
        let fx = fixture();
        let slots = ValueSlots::new(Arc::clone(&fx.catalog));
        assert_eq!(slots.slot_count(), 3);
        assert_eq!(slots.version(), 0);
        assert!(!slots.is_deletion());
        assert!(slots.get(&fx.amount).is_none());
    }

    #[test]
    fn unslotted_fields_have_no_storage() {
        let fx = fixture();
        let mut slots = ValueSlots::new(fx.catalog);
        slots.set_plain(&fx.label, "ignored");
        assert!(slots.get(&fx.label).is_none());
    }

    #[test]
    fn foreign_fields_are_ignored() {
        let fx = fixture();
        let mut other = CatalogBuilder::new("Other");
        let foreign = other.declare_equality_field("amount").unwrap();
        let mut slots = ValueSlots::new(fx.catalog);
        slots.set_plain(&foreign, 1i32);
        assert!(slots.get(&fx.amount).is_none());
        assert!(slots.get(&foreign).is_none());
    }

    #[test]
    fn clone_is_independent() {
        let fx = fixture();
        let mut a = ValueSlots::new(fx.catalog);
        a.set_plain(&fx.note, "a");
        a.set_version(3);
        a.set_deletion(true);

        let mut b = a.clone();
        b.set_plain(&fx.note, "b");
        assert_eq!(a.get(&fx.note), Some(&SlotValue::Plain("a".into())));
        assert_eq!(b.version(), 3);
        assert!(b.is_deletion());
    }

    #[test]
    fn migrate_extends_layout() {
        let fx = fixture();
        let mut parent_slots = ValueSlots::new(Arc::clone(&fx.catalog));
        parent_slots.set_plain(&fx.amount, money("1.00"));
        parent_slots.set_version(2);

        let mut b = CatalogBuilder::extending("Child", fx.catalog);
        let extra = b.declare_equality_field("extra").unwrap();
        let child = b.build();

        let mut migrated = parent_slots.migrate(child);
        assert_eq!(migrated.slot_count(), 4);
        assert_eq!(migrated.version(), 2);
        assert_eq!(migrated.get(&fx.amount), parent_slots.get(&fx.amount));
        migrated.set_plain(&extra, true);
        assert!(migrated.get(&extra).is_some());
    }

    #[test]
    fn copy_from_overwrites_everything() {
        let fx = fixture();
        let mut a = ValueSlots::new(Arc::clone(&fx.catalog));
        a.set_plain(&fx.note, "x");
        let mut b = ValueSlots::new(fx.catalog);
        b.set_plain(&fx.note, "y");
        b.set_version(7);
        b.set_deletion(true);

        a.copy_from(&b);
        assert_eq!(a.get(&fx.note), b.get(&fx.note));
        assert_eq!(a.version(), 7);
        assert!(a.is_deletion());
    }

    #[test]
    fn equality_ignores_non_equality_fields() {
        let fx = fixture();
        let mut a = ValueSlots::new(Arc::clone(&fx.catalog));
        a.set_plain(&fx.amount, money("5.00"));
        let mut b = a.clone();
        b.set_plain(&fx.scratch, 99i64);

        assert!(a.equals(&b));
        assert_eq!(a.differs(&b), DifferenceResult::Identical);

        b.set_plain(&fx.amount, money("6.00"));
        assert!(!a.equals(&b));
        assert_eq!(a.differs(&b), DifferenceResult::Different);
    }

    #[test]
    fn deletion_flag_breaks_equality() {
        let fx = fixture();
        let a = ValueSlots::new(fx.catalog);
        let mut b = a.clone();
        b.set_deletion(true);
        assert!(!a.equals(&b));
        assert_eq!(a.differs(&b), DifferenceResult::Different);
    }

    #[test]
    fn slot_count_mismatch_breaks_equality() {
        let fx = fixture();
        let a = ValueSlots::new(Arc::clone(&fx.catalog));
        let mut b = CatalogBuilder::extending("Child", fx.catalog);
        b.declare_equality_field("extra").unwrap();
        let wider = a.migrate(b.build());
        assert!(!a.equals(&wider));
        assert_eq!(a.differs(&wider), DifferenceResult::Different);
    }

    #[test]
    fn absent_against_present_is_different() {
        let fx = fixture();
        let a = ValueSlots::new(Arc::clone(&fx.catalog));
        let mut b = a.clone();
        b.set_plain(&fx.note, "n");
        assert_eq!(a.field_changed(&fx.note, &b), DifferenceResult::Different);
        b.set(&fx.note, None);
        assert_eq!(a.field_changed(&fx.note, &b), DifferenceResult::Identical);
    }

    #[test]
    fn field_changed_filters_untracked_fields() {
        let fx = fixture();
        let a = ValueSlots::new(fx.catalog);
        let mut b = a.clone();
        b.set_plain(&fx.scratch, 1i32);
        assert_eq!(b.field_changed(&fx.scratch, &a), DifferenceResult::Identical);
        assert_eq!(b.field_changed(&fx.label, &a), DifferenceResult::Identical);
    }

    #[test]
    fn field_changed_ignores_foreign_fields() {
        let fx = fixture();
        let mut other = CatalogBuilder::new("Other");
        let foreign = other.declare_equality_field("foreign").unwrap();
        other.build();
        assert_eq!(foreign.slot_index(), fx.amount.slot_index());

        let a = ValueSlots::new(fx.catalog);
        let mut b = a.clone();
        b.set_plain(&fx.amount, 5i64);
        assert_eq!(b.field_changed(&fx.amount, &a), DifferenceResult::Different);
        assert_eq!(b.field_changed(&foreign, &a), DifferenceResult::Identical);
        assert!(b.get(&foreign).is_none());
    }

    #[test]
    fn rekey_is_security_different_only() {
        let fx = fixture();
        let gen = EncryptionGenerator::with_keyset(keyset(b"k1"));
        let mut a = ValueSlots::new(fx.catalog);
        a.set_encrypted(&fx.amount, money("12.34"), &gen).unwrap();
        a.set_plain(&fx.note, "plain");

        let mut b = a.clone();
        assert_eq!(b.update_security(&keyset(b"k2")).unwrap(), 1);

        assert!(a.equals(&b));
        assert_eq!(a.differs(&b), DifferenceResult::SecurityDifferent);
        assert_eq!(b.field_changed(&fx.amount, &a), DifferenceResult::SecurityDifferent);
        assert_eq!(b.field_changed(&fx.note, &a), DifferenceResult::Identical);
    }

    #[test]
    fn different_wins_over_earlier_security_difference() {
        let fx = fixture();
        let gen = EncryptionGenerator::with_keyset(keyset(b"k1"));
        let mut a = ValueSlots::new(fx.catalog);
        a.set_encrypted(&fx.amount, money("1.00"), &gen).unwrap();
        a.set_plain(&fx.note, "before");

        let mut b = a.clone();
        b.update_security(&keyset(b"k2")).unwrap();
        b.set_plain(&fx.note, "after");

        assert_eq!(a.differs(&b), DifferenceResult::Different);
    }

    #[test]
    fn writing_same_encrypted_value_keeps_ciphertext() {
        let fx = fixture();
        let gen = EncryptionGenerator::with_keyset(keyset(b"k"));
        let mut a = ValueSlots::new(fx.catalog);
        a.set_encrypted(&fx.amount, money("3.00"), &gen).unwrap();
        let before = a.clone();
        a.set_encrypted(&fx.amount, money("3.00"), &gen).unwrap();
        assert_eq!(a.differs(&before), DifferenceResult::Identical);
    }

    #[test]
    fn adopt_security_reuses_base_ciphertext() {
        let fx = fixture();
        let ks = keyset(b"k");
        let gen = EncryptionGenerator::with_keyset(ks.clone());
        let mut base = ValueSlots::new(Arc::clone(&fx.catalog));
        base.set_encrypted(&fx.amount, money("8.00"), &gen).unwrap();

        let mut loaded = ValueSlots::new(fx.catalog);
        loaded
            .set_encrypted(&fx.amount, money("8.00"), &EncryptionGenerator::default())
            .unwrap();
        loaded.adopt_security(&ks, &base).unwrap();

        assert_eq!(loaded.differs(&base), DifferenceResult::Identical);
        let ct = |s: &ValueSlots| {
            s.get(&fx.amount)
                .and_then(SlotValue::as_encrypted)
                .and_then(EncryptedValue::ciphertext)
                .cloned()
        };
        assert_eq!(ct(&loaded), ct(&base));
    }

    #[test]
    fn slot_value_difference_mixes_plain_and_encrypted() {
        let plain = SlotValue::Plain(FieldValue::Integer(1));
        let encrypted =
            SlotValue::Encrypted(EncryptedValue::from_value(None, FieldValue::Integer(1)).unwrap());
        assert_eq!(plain.difference(&encrypted), DifferenceResult::Different);
        assert_eq!(plain.value(), encrypted.value());
    }
}
