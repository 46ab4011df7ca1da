//! The closed set of field value types.
//!
//! [`FieldValue`] has one arm per supported type and [`ValueKind`] is its
//! tag. [`ValueType`] links a Rust type to its arm so generic code (such as
//! encrypted fields) can move between typed and erased values.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::date::CalendarDay;
use crate::decimal::{Dilution, Money, Price, Rate, Ratio, Units};
use crate::error::TypeError;

/// Tag naming the runtime type of a [`FieldValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Short,
    Integer,
    Long,
    Boolean,
    Date,
    Day,
    Chars,
    Float,
    Double,
    BigInteger,
    Decimal,
    Money,
    Price,
    Rate,
    Ratio,
    Dilution,
    Units,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 18] = [
        Self::Text,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Boolean,
        Self::Date,
        Self::Day,
        Self::Chars,
        Self::Float,
        Self::Double,
        Self::BigInteger,
        Self::Decimal,
        Self::Money,
        Self::Price,
        Self::Rate,
        Self::Ratio,
        Self::Dilution,
        Self::Units,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Day => "day",
            Self::Chars => "chars",
            Self::Float => "float",
            Self::Double => "double",
            Self::BigInteger => "big-integer",
            Self::Decimal => "decimal",
            Self::Money => "money",
            Self::Price => "price",
            Self::Rate => "rate",
            Self::Ratio => "ratio",
            Self::Dilution => "dilution",
            Self::Units => "units",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, TypeError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TypeError::UnknownKind(s.to_string()))
    }
}

/// A type-erased field value.
///
/// Floating point arms compare by bit pattern, so every value is equal to
/// itself (including NaN) and `0.0` differs from `-0.0`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Short(i16),
    Integer(i32),
    Long(i64),
    Boolean(bool),
    Date(NaiveDate),
    Day(CalendarDay),
    Chars(Vec<char>),
    Float(f32),
    Double(f64),
    BigInteger(BigInt),
    Decimal(BigDecimal),
    Money(Money),
    Price(Price),
    Rate(Rate),
    Ratio(Ratio),
    Dilution(Dilution),
    Units(Units),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Short(_) => ValueKind::Short,
            Self::Integer(_) => ValueKind::Integer,
            Self::Long(_) => ValueKind::Long,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Day(_) => ValueKind::Day,
            Self::Chars(_) => ValueKind::Chars,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::BigInteger(_) => ValueKind::BigInteger,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Money(_) => ValueKind::Money,
            Self::Price(_) => ValueKind::Price,
            Self::Rate(_) => ValueKind::Rate,
            Self::Ratio(_) => ValueKind::Ratio,
            Self::Dilution(_) => ValueKind::Dilution,
            Self::Units(_) => ValueKind::Units,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Day(a), Self::Day(b)) => a == b,
            (Self::Chars(a), Self::Chars(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.same_value(b),
            (Self::Double(a), Self::Double(b)) => a.same_value(b),
            (Self::BigInteger(a), Self::BigInteger(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Money(a), Self::Money(b)) => a == b,
            (Self::Price(a), Self::Price(b)) => a == b,
            (Self::Rate(a), Self::Rate(b)) => a == b,
            (Self::Ratio(a), Self::Ratio(b)) => a == b,
            (Self::Dilution(a), Self::Dilution(b)) => a == b,
            (Self::Units(a), Self::Units(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

/// A Rust type with a dedicated [`FieldValue`] arm.
pub trait ValueType: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> FieldValue;

    /// Extract the typed value, handing the input back on a kind mismatch.
    fn try_from_value(value: FieldValue) -> Result<Self, FieldValue>;

    /// Value equality as used by difference computations.
    fn same_value(&self, other: &Self) -> bool;
}

macro_rules! value_type {
    ($ty:ty, $variant:ident) => {
        impl ValueType for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }

            fn try_from_value(value: FieldValue) -> Result<Self, FieldValue> {
                match value {
                    FieldValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }

            fn same_value(&self, other: &Self) -> bool {
                self == other
            }
        }

        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value)
            }
        }
    };
}

value_type!(String, Text);
value_type!(i16, Short);
value_type!(i32, Integer);
value_type!(i64, Long);
value_type!(bool, Boolean);
value_type!(NaiveDate, Date);
value_type!(CalendarDay, Day);
value_type!(Vec<char>, Chars);
value_type!(BigInt, BigInteger);
value_type!(BigDecimal, Decimal);
value_type!(Money, Money);
value_type!(Price, Price);
value_type!(Rate, Rate);
value_type!(Ratio, Ratio);
value_type!(Dilution, Dilution);
value_type!(Units, Units);

macro_rules! float_value_type {
    ($ty:ty, $variant:ident) => {
        impl ValueType for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }

            fn try_from_value(value: FieldValue) -> Result<Self, FieldValue> {
                match value {
                    FieldValue::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }

            fn same_value(&self, other: &Self) -> bool {
                self.to_bits() == other.to_bits()
            }
        }

        impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::$variant(value)
            }
        }
    };
}

float_value_type!(f32, Float);
float_value_type!(f64, Double);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}
