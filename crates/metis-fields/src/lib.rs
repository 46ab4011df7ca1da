//! Field catalogs and versioned value slots for Metis records.
//!
//! # Key Types
//!
//! - [`CatalogBuilder`] / [`FieldCatalog`] -- Field declaration and immutable layout
//! - [`CatalogRegistry`] -- Arena of catalogs addressed by [`CatalogId`]
//! - [`ValueSlots`] -- One record version's field values
//! - [`DeltaView`] -- Per-field comparison of two versions

pub mod catalog;
pub mod delta;
pub mod error;
pub mod registry;
pub mod slots;

pub use catalog::{CatalogBuilder, CatalogId, FieldCatalog, FieldDescriptor, Fields};
pub use delta::{DeltaView, FieldDelta};
pub use error::{CatalogError, Result};
pub use registry::CatalogRegistry;
pub use slots::{SlotValue, ValueSlots};
