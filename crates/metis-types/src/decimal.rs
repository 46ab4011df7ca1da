//! Finance decimal kinds.
//!
//! Every kind wraps a [`BigDecimal`]. [`Money`] and [`Price`] additionally
//! carry a [`Currency`]. Equality is numeric, so `10.0` and `10.00` are the
//! same amount.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// ISO-4217 style currency code: three upper-case ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency([u8; 3]);

impl Currency {
    pub const GBP: Self = Self(*b"GBP");
    pub const USD: Self = Self(*b"USD");
    pub const EUR: Self = Self(*b"EUR");

    /// Parse a currency code.
    pub fn new(code: &str) -> Result<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(TypeError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }

    /// The three-letter code.
    pub fn code(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

pub(crate) fn parse_decimal(input: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(input.trim()).map_err(|e| TypeError::InvalidDecimal {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// A monetary amount in a currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: BigDecimal,
    currency: Currency,
}

impl Money {
    /// Standard number of decimal places for display.
    pub const SCALE: i64 = 2;

    pub fn new(amount: BigDecimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse a plain decimal amount in the given currency.
    pub fn parse(amount: &str, currency: Currency) -> Result<Self> {
        Ok(Self::new(parse_decimal(amount)?, currency))
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The amount rounded to [`Money::SCALE`] places.
    pub fn rounded(&self) -> BigDecimal {
        self.amount.round(Self::SCALE)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rounded(), self.currency)
    }
}

/// A unit price in a currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    value: BigDecimal,
    currency: Currency,
}

impl Price {
    pub const SCALE: i64 = 4;

    pub fn new(value: BigDecimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    pub fn parse(value: &str, currency: Currency) -> Result<Self> {
        Ok(Self::new(parse_decimal(value)?, currency))
    }

    pub fn value(&self) -> &BigDecimal {
        &self.value
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn rounded(&self) -> BigDecimal {
        self.value.round(Self::SCALE)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rounded(), self.currency)
    }
}

macro_rules! plain_decimal {
    ($(#[$meta:meta])* $name:ident, $scale:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(BigDecimal);

        impl $name {
            /// Standard number of decimal places for display.
            pub const SCALE: i64 = $scale;

            pub fn new(value: BigDecimal) -> Self {
                Self(value)
            }

            pub fn value(&self) -> &BigDecimal {
                &self.0
            }

            pub fn rounded(&self) -> BigDecimal {
                self.0.round(Self::SCALE)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self> {
                parse_decimal(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.rounded())
            }
        }

        impl From<BigDecimal> for $name {
            fn from(value: BigDecimal) -> Self {
                Self(value)
            }
        }
    };
}

plain_decimal!(
    /// An interest or growth rate.
    Rate,
    4
);
plain_decimal!(
    /// An exchange or conversion ratio.
    Ratio,
    6
);
plain_decimal!(
    /// A share dilution factor.
    Dilution,
    6
);
plain_decimal!(
    /// A quantity of holding units.
    Units,
    4
);
