//! Tri-state difference engine.
//!
//! [`compare`] is the generic comparison used for every plain value: two
//! absent values are identical, a single absent value is a difference, and
//! present values defer to the type's own equality. It never produces
//! [`DifferenceResult::SecurityDifferent`]; that outcome belongs to values
//! that carry an encrypted representation and report it through the
//! [`Difference`] trait.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of comparing two values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceResult {
    /// No change.
    #[default]
    Identical,
    /// The business value changed.
    Different,
    /// The business value is unchanged but its encrypted form changed.
    SecurityDifferent,
}

impl DifferenceResult {
    /// Returns `true` for [`DifferenceResult::Identical`].
    pub fn is_identical(self) -> bool {
        self == Self::Identical
    }

    /// Returns `true` for [`DifferenceResult::Different`].
    pub fn is_different(self) -> bool {
        self == Self::Different
    }

    /// Returns `true` for [`DifferenceResult::SecurityDifferent`].
    pub fn is_security_different(self) -> bool {
        self == Self::SecurityDifferent
    }

    /// Merge two outcomes. `Different` dominates `SecurityDifferent`, which
    /// dominates `Identical`.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Different, _) | (_, Self::Different) => Self::Different,
            (Self::SecurityDifferent, _) | (_, Self::SecurityDifferent) => {
                Self::SecurityDifferent
            }
            _ => Self::Identical,
        }
    }

    /// Map a plain equality check onto the two business outcomes.
    pub fn from_equality(equal: bool) -> Self {
        if equal {
            Self::Identical
        } else {
            Self::Different
        }
    }
}

impl fmt::Display for DifferenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Identical => "identical",
            Self::Different => "different",
            Self::SecurityDifferent => "security-different",
        };
        f.write_str(label)
    }
}

/// Values that know how to compare themselves beyond plain equality.
pub trait Difference {
    fn difference(&self, other: &Self) -> DifferenceResult;
}

/// Compare two optional values using the type's own equality.
pub fn compare<T: PartialEq + ?Sized>(a: Option<&T>, b: Option<&T>) -> DifferenceResult {
    match (a, b) {
        (None, None) => DifferenceResult::Identical,
        (Some(a), Some(b)) => DifferenceResult::from_equality(a == b),
        _ => DifferenceResult::Different,
    }
}

/// Compare two optional values through their [`Difference`] implementation,
/// with the same absent-value rules as [`compare`].
pub fn compare_with<T: Difference + ?Sized>(a: Option<&T>, b: Option<&T>) -> DifferenceResult {
    match (a, b) {
        (None, None) => DifferenceResult::Identical,
        (Some(a), Some(b)) => a.difference(b),
        _ => DifferenceResult::Different,
    }
}
