//! Formatting collaborators.
//!
//! [`DecimalFormatter`] is the canonical textual encoder/decoder shared by the
//! finance decimal kinds; its output is stable and lossless. Money and prices
//! are written currency-first (`GBP:12.34`). [`ValueFormatter`] renders values
//! for people and is free to round or reorder.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::date::{DATE_FORMAT, DAY_FORMAT};
use crate::decimal::{parse_decimal, Currency, Money, Price};
use crate::error::{Result, TypeError};
use crate::value::FieldValue;

const CURRENCY_SEPARATOR: char = ':';

/// Lossless textual codec for decimal kinds.
pub struct DecimalFormatter;

impl DecimalFormatter {
    pub fn format_decimal(value: &BigDecimal) -> String {
        value.to_string()
    }

    pub fn parse_decimal(input: &str) -> Result<BigDecimal> {
        parse_decimal(input)
    }

    pub fn format_money(money: &Money) -> String {
        Self::format_with_currency(money.currency(), money.amount())
    }

    pub fn parse_money(input: &str) -> Result<Money> {
        let (currency, amount) = Self::split_currency(input)?;
        Ok(Money::new(amount, currency))
    }

    pub fn format_price(price: &Price) -> String {
        Self::format_with_currency(price.currency(), price.value())
    }

    pub fn parse_price(input: &str) -> Result<Price> {
        let (currency, value) = Self::split_currency(input)?;
        Ok(Price::new(value, currency))
    }

    fn format_with_currency(currency: Currency, value: &BigDecimal) -> String {
        format!("{currency}{CURRENCY_SEPARATOR}{value}")
    }

    fn split_currency(input: &str) -> Result<(Currency, BigDecimal)> {
        let (code, amount) = input
            .split_once(CURRENCY_SEPARATOR)
            .ok_or_else(|| TypeError::MissingCurrency(input.to_string()))?;
        Ok((Currency::new(code)?, parse_decimal(amount)?))
    }
}

/// Display settings for [`DisplayFormatter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `chrono` format string for plain dates.
    pub date_format: String,
    /// `chrono` format string for calendar days.
    pub day_format: String,
    /// Append the currency code to money and prices.
    pub show_currency: bool,
    /// Text shown for an absent value.
    pub absent: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DATE_FORMAT.to_string(),
            day_format: DAY_FORMAT.to_string(),
            show_currency: true,
            absent: String::new(),
        }
    }
}

impl DisplayConfig {
    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| TypeError::Config(e.to_string()))
    }
}

/// Renders values for human consumption.
pub trait ValueFormatter {
    fn format_object(&self, value: &FieldValue) -> String;

    fn format_optional(&self, value: Option<&FieldValue>) -> String {
        value.map(|v| self.format_object(v)).unwrap_or_default()
    }
}

/// The stock [`ValueFormatter`].
#[derive(Clone, Debug, Default)]
pub struct DisplayFormatter {
    config: DisplayConfig,
}

impl DisplayFormatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    fn with_currency(&self, value: BigDecimal, currency: Currency) -> String {
        if self.config.show_currency {
            format!("{value} {currency}")
        } else {
            value.to_string()
        }
    }
}

impl ValueFormatter for DisplayFormatter {
    fn format_object(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Chars(c) => c.iter().collect(),
            FieldValue::Short(v) => v.to_string(),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Long(v) => v.to_string(),
            FieldValue::Boolean(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Double(v) => v.to_string(),
            FieldValue::Date(d) => d.format(&self.config.date_format).to_string(),
            FieldValue::Day(d) => d.date().format(&self.config.day_format).to_string(),
            FieldValue::BigInteger(v) => v.to_string(),
            FieldValue::Decimal(v) => v.to_string(),
            FieldValue::Money(m) => self.with_currency(m.rounded(), m.currency()),
            FieldValue::Price(p) => self.with_currency(p.rounded(), p.currency()),
            FieldValue::Rate(r) => r.to_string(),
            FieldValue::Ratio(r) => r.to_string(),
            FieldValue::Dilution(d) => d.to_string(),
            FieldValue::Units(u) => u.to_string(),
        }
    }

    fn format_optional(&self, value: Option<&FieldValue>) -> String {
        match value {
            Some(v) => self.format_object(v),
            None => self.config.absent.clone(),
        }
    }
}
