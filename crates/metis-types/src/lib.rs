//! Foundation types for Metis fields.
//!
//! This crate provides the difference engine and the value types shared by
//! every other Metis crate.
//!
//! # Key Types
//!
//! - [`DifferenceResult`] -- Tri-state comparison outcome
//! - [`compare`] -- Null-aware generic comparison
//! - [`FieldValue`] / [`ValueKind`] -- Closed set of supported value types
//! - [`Money`], [`Price`], [`Rate`], [`Ratio`], [`Dilution`], [`Units`] -- Finance decimals
//! - [`CalendarDay`] -- Finance-layer calendar day
//! - [`DecimalFormatter`] / [`ValueFormatter`] -- Formatting collaborators

pub mod date;
pub mod decimal;
pub mod difference;
pub mod error;
pub mod format;
pub mod value;

pub use bigdecimal::BigDecimal;
pub use chrono::NaiveDate;
pub use num_bigint::BigInt;

pub use date::CalendarDay;
pub use decimal::{Currency, Dilution, Money, Price, Rate, Ratio, Units};
pub use difference::{compare, compare_with, Difference, DifferenceResult};
pub use error::TypeError;
pub use format::{DecimalFormatter, DisplayConfig, DisplayFormatter, ValueFormatter};
pub use value::{FieldValue, ValueKind, ValueType};
