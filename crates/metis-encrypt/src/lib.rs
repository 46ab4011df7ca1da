//! Encrypted field family for Metis.
//!
//! An [`EncryptedField`] keeps a value alongside its ciphertext under a
//! [`metis_crypto::KeySet`]. [`EncryptedValue`] erases the value type so a
//! slot can hold any of the eighteen supported kinds, and
//! [`EncryptionGenerator`] builds them for the session's key-set.
//!
//! Comparing two encrypted values yields
//! [`metis_types::DifferenceResult::SecurityDifferent`] when only the
//! ciphertext changed, which is how re-keying shows up in history.

pub mod codec;
pub mod error;
pub mod field;
pub mod generator;
pub mod value;

pub use codec::FieldCodec;
pub use error::{ConversionError, EncryptionError, Result};
pub use field::EncryptedField;
pub use generator::EncryptionGenerator;
pub use value::EncryptedValue;
