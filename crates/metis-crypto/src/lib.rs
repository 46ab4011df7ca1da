//! Key-set abstraction for Metis encrypted fields.
//!
//! Encrypted fields only ever see the [`KeySet`] trait: encrypt bytes,
//! decrypt bytes, and an identity used to detect re-keying. The crate also
//! ships [`Blake3KeySet`], a reference implementation built on BLAKE3 keyed
//! hashing, so the field layer can be exercised end to end.

pub mod blake3_keyset;
pub mod config;
pub mod error;
pub mod keyset;

pub use blake3_keyset::Blake3KeySet;
pub use config::KeySetConfig;
pub use error::{CryptoError, Result};
pub use keyset::{KeySet, KeySetId, SharedKeySet};
