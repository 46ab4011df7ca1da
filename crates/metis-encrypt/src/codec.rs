//! Byte codecs for every encryptable value type.
//!
//! Most types travel as UTF-8 text. Character sequences are written as their
//! UTF-8 bytes directly and big integers as big-endian two's-complement
//! bytes. Decimal kinds go through [`DecimalFormatter`], which writes money
//! and prices currency-first.

use metis_types::date::DATE_FORMAT;
use metis_types::{
    BigDecimal, BigInt, CalendarDay, DecimalFormatter, Dilution, Money, NaiveDate, Price, Rate,
    Ratio, Units, ValueType,
};

use crate::error::ConversionError;

/// Conversion between a value and the bytes handed to the key-set.
pub trait FieldCodec: ValueType {
    fn encode(&self) -> Result<Vec<u8>, ConversionError>;

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError>;
}

fn text(bytes: &[u8]) -> Result<&str, ConversionError> {
    Ok(std::str::from_utf8(bytes)?)
}

impl FieldCodec for String {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        text(bytes).map(str::to_owned)
    }
}

macro_rules! display_codec {
    ($($ty:ty),+) => {
        $(
            impl FieldCodec for $ty {
                fn encode(&self) -> Result<Vec<u8>, ConversionError> {
                    Ok(self.to_string().into_bytes())
                }

                fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
                    Ok(text(bytes)?.parse::<$ty>()?)
                }
            }
        )+
    };
}

// Rust's float formatting is shortest-round-trip, so text is lossless.
display_codec!(i16, i32, i64, bool, f32, f64, CalendarDay);

impl FieldCodec for NaiveDate {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(self.format(DATE_FORMAT).to_string().into_bytes())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        Ok(NaiveDate::parse_from_str(text(bytes)?, DATE_FORMAT)?)
    }
}

impl FieldCodec for Vec<char> {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        let mut out = Vec::with_capacity(self.len());
        let mut buf = [0u8; 4];
        for c in self {
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        Ok(out)
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        Ok(text(bytes)?.chars().collect())
    }
}

impl FieldCodec for BigInt {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(self.to_signed_bytes_be())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        if bytes.is_empty() {
            return Err(ConversionError::EmptyInteger);
        }
        Ok(BigInt::from_signed_bytes_be(bytes))
    }
}

impl FieldCodec for BigDecimal {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(DecimalFormatter::format_decimal(self).into_bytes())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        Ok(DecimalFormatter::parse_decimal(text(bytes)?)?)
    }
}

impl FieldCodec for Money {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(DecimalFormatter::format_money(self).into_bytes())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        Ok(DecimalFormatter::parse_money(text(bytes)?)?)
    }
}

impl FieldCodec for Price {
    fn encode(&self) -> Result<Vec<u8>, ConversionError> {
        Ok(DecimalFormatter::format_price(self).into_bytes())
    }

    fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
        Ok(DecimalFormatter::parse_price(text(bytes)?)?)
    }
}

macro_rules! plain_decimal_codec {
    ($($ty:ty),+) => {
        $(
            impl FieldCodec for $ty {
                fn encode(&self) -> Result<Vec<u8>, ConversionError> {
                    Ok(DecimalFormatter::format_decimal(self.value()).into_bytes())
                }

                fn decode(bytes: &[u8]) -> Result<Self, ConversionError> {
                    Ok(<$ty>::new(DecimalFormatter::parse_decimal(text(bytes)?)?))
                }
            }
        )+
    };
}

plain_decimal_codec!(Rate, Ratio, Dilution, Units);

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use metis_types::Currency;

    use super::*;

    fn roundtrip<T: FieldCodec>(value: T) -> T {
        let bytes = value.encode().unwrap();
        T::decode(&bytes).unwrap()
    }

    #[test]
    fn integers_are_textual() {
        assert_eq!(i32::MIN.encode().unwrap(), b"-2147483648");
        assert_eq!(roundtrip(i16::MAX), i16::MAX);
        assert_eq!(roundtrip(i64::MIN), i64::MIN);
    }

    #[test]
    fn chars_are_raw_utf8() {
        let chars: Vec<char> = "héllo✓".chars().collect();
        assert_eq!(chars.encode().unwrap(), "héllo✓".as_bytes());
        assert_eq!(roundtrip(chars.clone()), chars);
    }

    #[test]
    fn big_integer_is_twos_complement() {
        let minus_one = BigInt::from(-1);
        assert_eq!(minus_one.encode().unwrap(), vec![0xff]);
        let big = BigInt::from_str("-123456789012345678901234567890").unwrap();
        assert_eq!(roundtrip(big.clone()), big);
    }

    #[test]
    fn empty_big_integer_is_rejected() {
        assert!(matches!(
            BigInt::decode(&[]),
            Err(ConversionError::EmptyInteger)
        ));
    }

    #[test]
    fn dates_use_distinct_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date.encode().unwrap(), b"2024-01-05");
        let day = CalendarDay::new(date);
        assert_eq!(day.encode().unwrap(), b"05-Jan-2024");
        assert!(CalendarDay::decode(b"2024-01-05").is_err());
        assert!(NaiveDate::decode(b"05-Jan-2024").is_err());
    }

    #[test]
    fn money_is_currency_aware() {
        let money = Money::parse("12.34", Currency::GBP).unwrap();
        assert_eq!(money.encode().unwrap(), b"GBP:12.34");
        assert!(Money::decode(b"12.34").is_err());
    }

    #[test]
    fn rate_is_plain_decimal() {
        let rate: Rate = "0.0525".parse().unwrap();
        assert_eq!(rate.encode().unwrap(), b"0.0525");
        assert_eq!(roundtrip(rate.clone()), rate);
    }

    #[test]
    fn bad_utf8_is_rejected() {
        assert!(matches!(
            String::decode(&[0xff, 0xfe]),
            Err(ConversionError::Utf8(_))
        ));
    }

    #[test]
    fn bad_boolean_is_rejected() {
        assert!(matches!(
            bool::decode(b"yes"),
            Err(ConversionError::Boolean(_))
        ));
    }

    #[test]
    fn float_extremes_roundtrip() {
        for v in [f64::MAX, f64::MIN_POSITIVE, -0.0, f64::INFINITY] {
            assert_eq!(roundtrip(v).to_bits(), v.to_bits());
        }
        assert!(roundtrip(f32::NAN).is_nan());
    }
}
