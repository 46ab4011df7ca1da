//! Type-erased encrypted values.

use bytes::Bytes;
use metis_crypto::SharedKeySet;
use metis_types::{
    BigDecimal, BigInt, CalendarDay, Difference, DifferenceResult, Dilution, FieldValue, Money,
    NaiveDate, Price, Rate, Ratio, Units, ValueFormatter, ValueKind,
};

use crate::error::Result;
use crate::field::EncryptedField;

macro_rules! encrypted_values {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        /// An [`EncryptedField`] of any supported type, tagged by kind.
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum EncryptedValue {
            $($variant(EncryptedField<$ty>),)+
        }

        impl EncryptedValue {
            /// Wrap a plaintext value, encrypting it when a key-set is given.
            pub fn from_value(keyset: Option<SharedKeySet>, value: FieldValue) -> Result<Self> {
                match value {
                    $(FieldValue::$variant(v) => {
                        EncryptedField::from_value(keyset, v).map(Self::$variant)
                    })+
                }
            }

            /// Decrypt ciphertext as a value of `kind`.
            pub fn from_ciphertext(
                keyset: Option<SharedKeySet>,
                ciphertext: Bytes,
                kind: ValueKind,
            ) -> Result<Self> {
                match kind {
                    $(ValueKind::$variant => {
                        EncryptedField::from_ciphertext(keyset, ciphertext).map(Self::$variant)
                    })+
                }
            }

            pub fn kind(&self) -> ValueKind {
                match self {
                    $(Self::$variant(_) => ValueKind::$variant,)+
                }
            }

            /// The decrypted value.
            pub fn value(&self) -> FieldValue {
                match self {
                    $(Self::$variant(f) => FieldValue::$variant(f.value().clone()),)+
                }
            }

            /// Returns `true` if this holds `value` (same kind, same value).
            pub fn holds(&self, value: &FieldValue) -> bool {
                match (self, value) {
                    $((Self::$variant(f), FieldValue::$variant(v)) => {
                        metis_types::ValueType::same_value(f.value(), v)
                    })+
                    _ => false,
                }
            }

            pub fn keyset(&self) -> Option<&SharedKeySet> {
                match self {
                    $(Self::$variant(f) => f.keyset(),)+
                }
            }

            pub fn ciphertext(&self) -> Option<&Bytes> {
                match self {
                    $(Self::$variant(f) => f.ciphertext(),)+
                }
            }

            pub fn is_encrypted(&self) -> bool {
                self.ciphertext().is_some()
            }

            /// Re-encrypt under `keyset`, unconditionally.
            pub fn apply_encryption(&mut self, keyset: SharedKeySet) -> Result<()> {
                match self {
                    $(Self::$variant(f) => f.apply_encryption(keyset),)+
                }
            }

            /// Take on `keyset`, reusing `source`'s ciphertext where possible.
            /// A source of another kind counts as no source.
            pub fn adopt_encryption(
                &mut self,
                keyset: SharedKeySet,
                source: Option<&Self>,
            ) -> Result<()> {
                match self {
                    $(Self::$variant(f) => {
                        let source = match source {
                            Some(Self::$variant(s)) => Some(s),
                            _ => None,
                        };
                        f.adopt_encryption(keyset, source)
                    })+
                }
            }

            pub fn formatted(&self, formatter: &dyn ValueFormatter) -> String {
                match self {
                    $(Self::$variant(f) => f.formatted(formatter),)+
                }
            }
        }

        impl Difference for EncryptedValue {
            fn difference(&self, other: &Self) -> DifferenceResult {
                match (self, other) {
                    $((Self::$variant(a), Self::$variant(b)) => a.difference(b),)+
                    _ => DifferenceResult::Different,
                }
            }
        }

        $(
            impl From<EncryptedField<$ty>> for EncryptedValue {
                fn from(field: EncryptedField<$ty>) -> Self {
                    Self::$variant(field)
                }
            }
        )+
    };
}

encrypted_values! {
    Text => String,
    Short => i16,
    Integer => i32,
    Long => i64,
    Boolean => bool,
    Date => NaiveDate,
    Day => CalendarDay,
    Chars => Vec<char>,
    Float => f32,
    Double => f64,
    BigInteger => BigInt,
    Decimal => BigDecimal,
    Money => Money,
    Price => Price,
    Rate => Rate,
    Ratio => Ratio,
    Dilution => Dilution,
    Units => Units,
}
