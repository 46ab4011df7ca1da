//! Version history for Metis records.
//!
//! [`HistoryStack`] keeps a record's live values together with the
//! snapshots taken at each checkpoint, and answers which fields changed
//! since the original. [`VersionedRecord`] wraps a stack with the
//! [`metis_encrypt::EncryptionGenerator`] a record uses for its encrypted
//! fields.

pub mod error;
pub mod item;
pub mod stack;

pub use error::{HistoryError, Result};
pub use item::{FieldedItem, VersionedRecord};
pub use stack::HistoryStack;
