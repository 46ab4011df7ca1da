use std::fmt;

use bytes::Bytes;
use metis_crypto::SharedKeySet;
use metis_types::{Difference, DifferenceResult, ValueFormatter, ValueType};
use tracing::{debug, trace, warn};

use crate::codec::FieldCodec;
use crate::error::{EncryptionError, Result};

/// A value held in both plaintext and encrypted form.
///
/// The ciphertext is absent only while no key-set has been applied. Equality
/// requires both the value and the ciphertext bytes to match, which is
/// stricter than business equality; use [`Difference`] to tell the two apart.
#[derive(Clone)]
pub struct EncryptedField<T> {
    keyset: Option<SharedKeySet>,
    ciphertext: Option<Bytes>,
    value: T,
}

impl<T: FieldCodec> EncryptedField<T> {
    /// Wrap a plaintext value, encrypting it immediately when a key-set is
    /// available.
    pub fn from_value(keyset: Option<SharedKeySet>, value: T) -> Result<Self> {
        let mut field = Self {
            keyset: None,
            ciphertext: None,
            value,
        };
        if let Some(keyset) = keyset {
            field.encrypt_with(keyset)?;
        }
        Ok(field)
    }

    /// Decrypt and decode stored ciphertext.
    pub fn from_ciphertext(
        keyset: Option<SharedKeySet>,
        ciphertext: impl Into<Bytes>,
    ) -> Result<Self> {
        let keyset = keyset.ok_or(EncryptionError::EncryptionNotInitialized)?;
        let ciphertext = ciphertext.into();

        let plaintext = keyset.decrypt(&ciphertext).inspect_err(|e| {
            warn!(
                kind = %T::KIND,
                keyset = %keyset.id().short_hex(),
                error = %e,
                "field decryption failed"
            );
        })?;
        let value =
            T::decode(&plaintext).map_err(|source| EncryptionError::conversion(T::KIND, source))?;

        Ok(Self {
            keyset: Some(keyset),
            ciphertext: Some(ciphertext),
            value,
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn keyset(&self) -> Option<&SharedKeySet> {
        self.keyset.as_ref()
    }

    pub fn ciphertext(&self) -> Option<&Bytes> {
        self.ciphertext.as_ref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.ciphertext.is_some()
    }

    /// Re-encrypt under `keyset`, unconditionally.
    pub fn apply_encryption(&mut self, keyset: SharedKeySet) -> Result<()> {
        debug!(
            kind = %T::KIND,
            from = ?self.keyset.as_ref().map(|k| k.id().short_hex()),
            to = %keyset.id().short_hex(),
            "re-keying field"
        );
        self.encrypt_with(keyset)
    }

    /// Take on `keyset`, reusing `source`'s ciphertext when it already
    /// encrypts this value under an equal key-set.
    pub fn adopt_encryption(&mut self, keyset: SharedKeySet, source: Option<&Self>) -> Result<()> {
        if let Some(source) = source {
            let reusable = source.keyset.as_ref() == Some(&keyset)
                && source.value.same_value(&self.value)
                && source.ciphertext.is_some();
            if reusable {
                trace!(kind = %T::KIND, "adopting existing ciphertext");
                self.keyset = Some(keyset);
                self.ciphertext = source.ciphertext.clone();
                return Ok(());
            }
        }
        self.encrypt_with(keyset)
    }

    /// Render the plaintext through a formatter.
    pub fn formatted(&self, formatter: &dyn ValueFormatter) -> String {
        formatter.format_object(&self.value.clone().into_value())
    }

    fn encrypt_with(&mut self, keyset: SharedKeySet) -> Result<()> {
        let bytes = self
            .value
            .encode()
            .map_err(|source| EncryptionError::conversion(T::KIND, source))?;
        let ciphertext = keyset.encrypt(&bytes)?;
        self.keyset = Some(keyset);
        self.ciphertext = Some(Bytes::from(ciphertext));
        Ok(())
    }
}

impl<T: FieldCodec> Difference for EncryptedField<T> {
    fn difference(&self, other: &Self) -> DifferenceResult {
        if !self.value.same_value(&other.value) {
            DifferenceResult::Different
        } else if self.ciphertext != other.ciphertext {
            DifferenceResult::SecurityDifferent
        } else {
            DifferenceResult::Identical
        }
    }
}

impl<T: FieldCodec> PartialEq for EncryptedField<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value.same_value(&other.value) && self.ciphertext == other.ciphertext
    }
}

impl<T: FieldCodec> Eq for EncryptedField<T> {}

impl<T: FieldCodec> fmt::Debug for EncryptedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedField")
            .field("kind", &T::KIND)
            .field("value", &"<redacted>")
            .field("ciphertext_len", &self.ciphertext.as_ref().map(Bytes::len))
            .field("keyset", &self.keyset)
            .finish()
    }
}
