//! Factory for encrypted values.
//!
//! [`EncryptionGenerator`] holds the key-set of the current session and
//! dispatches construction by runtime value kind (encrypt path) or by an
//! explicit kind tag (decrypt path).

use bytes::Bytes;
use metis_crypto::SharedKeySet;
use metis_types::{FieldValue, ValueKind};
use tracing::trace;

use crate::error::{EncryptionError, Result};
use crate::value::EncryptedValue;

/// Builds, decrypts and re-keys [`EncryptedValue`]s under one key-set.
#[derive(Clone, Debug, Default)]
pub struct EncryptionGenerator {
    keyset: Option<SharedKeySet>,
}

impl EncryptionGenerator {
    pub fn new(keyset: Option<SharedKeySet>) -> Self {
        Self { keyset }
    }

    pub fn with_keyset(keyset: SharedKeySet) -> Self {
        Self {
            keyset: Some(keyset),
        }
    }

    pub fn keyset(&self) -> Option<&SharedKeySet> {
        self.keyset.as_ref()
    }

    pub fn set_keyset(&mut self, keyset: Option<SharedKeySet>) {
        self.keyset = keyset;
    }

    /// Encrypt `value`, replacing `current`.
    ///
    /// When `current` already holds an equal value under this generator's
    /// key-set it is returned unchanged, so no-op writes keep their
    /// ciphertext.
    pub fn encrypt_value(
        &self,
        current: Option<&EncryptedValue>,
        value: FieldValue,
    ) -> Result<EncryptedValue> {
        if let Some(current) = current {
            if current.keyset() == self.keyset.as_ref() && current.holds(&value) {
                trace!(kind = %value.kind(), "value unchanged; keeping ciphertext");
                return Ok(current.clone());
            }
        }
        EncryptedValue::from_value(self.keyset.clone(), value)
    }

    /// Decrypt `ciphertext` as a value of `kind`.
    pub fn decrypt_value(
        &self,
        ciphertext: impl Into<Bytes>,
        kind: ValueKind,
    ) -> Result<EncryptedValue> {
        EncryptedValue::from_ciphertext(self.keyset.clone(), ciphertext.into(), kind)
    }

    /// Decrypt `ciphertext` using a textual kind tag, as found in persisted
    /// data.
    pub fn decrypt_tagged(&self, ciphertext: impl Into<Bytes>, tag: &str) -> Result<EncryptedValue> {
        let kind = tag
            .parse::<ValueKind>()
            .map_err(|_| EncryptionError::UnsupportedValueType {
                tag: tag.to_string(),
            })?;
        self.decrypt_value(ciphertext, kind)
    }

    /// Re-encrypt `target` under this generator's key-set.
    pub fn apply_encryption(&self, target: &mut EncryptedValue) -> Result<()> {
        target.apply_encryption(self.require_keyset()?)
    }

    /// Bring `target` under this generator's key-set, reusing `source`'s
    /// ciphertext when it already encrypts the same value.
    pub fn adopt_encryption(
        &self,
        target: &mut EncryptedValue,
        source: Option<&EncryptedValue>,
    ) -> Result<()> {
        target.adopt_encryption(self.require_keyset()?, source)
    }

    fn require_keyset(&self) -> Result<SharedKeySet> {
        self.keyset
            .clone()
            .ok_or(EncryptionError::EncryptionNotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use metis_crypto::{Blake3KeySet, KeySetConfig};
    use metis_types::{
        BigDecimal, BigInt, CalendarDay, Currency, Difference, DifferenceResult, Dilution, Money,
        NaiveDate, Price, Rate, Ratio, Units,
    };
    use proptest::prelude::*;

    use super::*;

    fn keyset(secret: &[u8]) -> SharedKeySet {
        SharedKeySet::new(Blake3KeySet::from_secret(secret, &KeySetConfig::default()).unwrap())
    }

    fn generator() -> EncryptionGenerator {
        EncryptionGenerator::with_keyset(keyset(b"generator"))
    }

    fn roundtrip(gen: &EncryptionGenerator, value: FieldValue) -> FieldValue {
        let encrypted = gen.encrypt_value(None, value.clone()).unwrap();
        let ciphertext = encrypted.ciphertext().unwrap().clone();
        let decrypted = gen.decrypt_value(ciphertext, value.kind()).unwrap();
        decrypted.value()
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn representative_values() -> Vec<FieldValue> {
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        vec![
            FieldValue::Text(String::new()),
            FieldValue::Text("naïve café ✓ 日本".into()),
            FieldValue::Short(0),
            FieldValue::Short(i16::MIN),
            FieldValue::Integer(-1),
            FieldValue::Integer(i32::MAX),
            FieldValue::Long(i64::MIN),
            FieldValue::Long(i64::MAX),
            FieldValue::Boolean(true),
            FieldValue::Boolean(false),
            FieldValue::Date(date),
            FieldValue::Day(CalendarDay::new(date)),
            FieldValue::Chars(Vec::new()),
            FieldValue::Chars("ß∂ƒ©".chars().collect()),
            FieldValue::Float(-0.0),
            FieldValue::Float(f32::MAX),
            FieldValue::Double(f64::MIN_POSITIVE),
            FieldValue::Double(-1.0e300),
            FieldValue::BigInteger(BigInt::from(0)),
            FieldValue::BigInteger(BigInt::from_str("-98765432109876543210987654321").unwrap()),
            FieldValue::Decimal(decimal("0")),
            FieldValue::Decimal(decimal("-123456789.000000001")),
            FieldValue::Money(Money::new(decimal("-12.34"), Currency::GBP)),
            FieldValue::Price(Price::new(decimal("0.0001"), Currency::USD)),
            FieldValue::Rate(Rate::new(decimal("0.0525"))),
            FieldValue::Ratio(Ratio::new(decimal("1.234567"))),
            FieldValue::Dilution(Dilution::new(decimal("0.999999"))),
            FieldValue::Units(Units::new(decimal("1000000.5"))),
        ]
    }

    #[test]
    fn every_kind_roundtrips() {
        let gen = generator();
        let values = representative_values();
        let mut kinds: Vec<ValueKind> = values.iter().map(FieldValue::kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds, ValueKind::ALL.to_vec());

        for value in values {
            assert_eq!(roundtrip(&gen, value.clone()), value, "kind {}", value.kind());
        }
    }

    #[test]
    fn unchanged_value_keeps_existing_field() {
        let gen = generator();
        let first = gen.encrypt_value(None, FieldValue::Long(5)).unwrap();
        let second = gen.encrypt_value(Some(&first), FieldValue::Long(5)).unwrap();
        assert_eq!(second, first);
        assert_eq!(
            second.ciphertext().unwrap().as_ptr(),
            first.ciphertext().unwrap().as_ptr()
        );
    }

    #[test]
    fn changed_value_encrypts_afresh() {
        let gen = generator();
        let first = gen.encrypt_value(None, FieldValue::Long(5)).unwrap();
        let second = gen.encrypt_value(Some(&first), FieldValue::Long(6)).unwrap();
        assert_eq!(second.difference(&first), DifferenceResult::Different);
    }

    #[test]
    fn changed_keyset_encrypts_afresh() {
        let first = generator().encrypt_value(None, FieldValue::Long(5)).unwrap();
        let other = EncryptionGenerator::with_keyset(keyset(b"other"));
        let second = other.encrypt_value(Some(&first), FieldValue::Long(5)).unwrap();
        assert_eq!(second.keyset(), other.keyset());
        assert_eq!(second.difference(&first), DifferenceResult::SecurityDifferent);
    }

    #[test]
    fn generator_without_keyset_leaves_values_unencrypted() {
        let gen = EncryptionGenerator::default();
        let v = gen.encrypt_value(None, FieldValue::Boolean(true)).unwrap();
        assert!(!v.is_encrypted());
    }

    #[test]
    fn decrypt_without_keyset_fails() {
        let err = EncryptionGenerator::default()
            .decrypt_value(vec![0u8; 64], ValueKind::Text)
            .unwrap_err();
        assert!(matches!(err, EncryptionError::EncryptionNotInitialized));
    }

    #[test]
    fn rekey_without_keyset_fails() {
        let mut v = EncryptionGenerator::default()
            .encrypt_value(None, FieldValue::Short(1))
            .unwrap();
        let err = EncryptionGenerator::default()
            .apply_encryption(&mut v)
            .unwrap_err();
        assert!(matches!(err, EncryptionError::EncryptionNotInitialized));
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let err = generator().decrypt_tagged(vec![0u8; 64], "blob").unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::UnsupportedValueType { ref tag } if tag == "blob"
        ));
    }

    #[test]
    fn known_tag_decrypts() {
        let gen = generator();
        let v = gen.encrypt_value(None, FieldValue::Integer(77)).unwrap();
        let back = gen
            .decrypt_tagged(v.ciphertext().unwrap().clone(), "integer")
            .unwrap();
        assert_eq!(back.value(), FieldValue::Integer(77));
    }

    #[test]
    fn decrypting_as_wrong_kind_fails_conversion() {
        let gen = generator();
        let v = gen.encrypt_value(None, FieldValue::Text("abc".into())).unwrap();
        let err = gen
            .decrypt_value(v.ciphertext().unwrap().clone(), ValueKind::Integer)
            .unwrap_err();
        assert!(matches!(
            err,
            EncryptionError::ValueConversionFailed { kind: ValueKind::Integer, .. }
        ));
    }

    #[test]
    fn adopt_through_generator() {
        let gen = generator();
        let source = gen.encrypt_value(None, FieldValue::Integer(3)).unwrap();
        let mut target = EncryptionGenerator::default()
            .encrypt_value(None, FieldValue::Integer(3))
            .unwrap();
        gen.adopt_encryption(&mut target, Some(&source)).unwrap();
        assert_eq!(target, source);
    }

    proptest! {
        #[test]
        fn text_roundtrips(s in "\\PC*") {
            let gen = generator();
            prop_assert_eq!(roundtrip(&gen, FieldValue::Text(s.clone())), FieldValue::Text(s));
        }

        #[test]
        fn long_roundtrips(v in any::<i64>()) {
            let gen = generator();
            prop_assert_eq!(roundtrip(&gen, FieldValue::Long(v)), FieldValue::Long(v));
        }

        #[test]
        fn double_roundtrips(v in any::<f64>().prop_filter("NaN payloads are not preserved", |v| !v.is_nan())) {
            let gen = generator();
            prop_assert_eq!(roundtrip(&gen, FieldValue::Double(v)), FieldValue::Double(v));
        }

        #[test]
        fn big_integer_roundtrips(bytes in proptest::collection::vec(any::<u8>(), 1..40)) {
            let gen = generator();
            let value = FieldValue::BigInteger(BigInt::from_signed_bytes_be(&bytes));
            prop_assert_eq!(roundtrip(&gen, value.clone()), value);
        }
    }
}
