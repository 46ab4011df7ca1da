use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Identity of a key-set.
///
/// Two key-sets with the same id produce mutually decryptable ciphertext, so
/// ciphertext produced under one may be adopted by the other.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySetId([u8; 32]);

impl KeySetId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for KeySetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeySetId({})", self.short_hex())
    }
}

impl fmt::Display for KeySetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Symmetric key-set consumed by encrypted fields.
///
/// Implementations must round-trip: `decrypt(encrypt(b)) == b`. Nothing else
/// about the algorithm or the ciphertext layout is assumed.
pub trait KeySet: Send + Sync {
    fn id(&self) -> KeySetId;

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Cheaply cloneable handle to a key-set. Equality is key-set identity.
#[derive(Clone)]
pub struct SharedKeySet(Arc<dyn KeySet>);

impl SharedKeySet {
    pub fn new<K: KeySet + 'static>(keyset: K) -> Self {
        Self(Arc::new(keyset))
    }

    pub fn id(&self) -> KeySetId {
        self.0.id()
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.0.encrypt(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0.decrypt(ciphertext)
    }
}

impl From<Arc<dyn KeySet>> for SharedKeySet {
    fn from(keyset: Arc<dyn KeySet>) -> Self {
        Self(keyset)
    }
}

impl PartialEq for SharedKeySet {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for SharedKeySet {}

impl fmt::Debug for SharedKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedKeySet({})", self.id().short_hex())
    }
}
