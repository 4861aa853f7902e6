//! Conversion of raw parameter strings into typed values.
//!
//! Integer literals select their base from the prefix:
//!
//! | Prefix | Base |
//! |---|---|
//! | `0x` / `0X` | 16 |
//! | `0b` / `0B` | 2 |
//! | `0o` / `0O` | 8 |
//! | `0` followed by more digits | 8 |
//! | none | 10 |
//!
//! A bare leading zero means octal, so `"0123"` loads as `83`, not `123`.
//! Signed kinds accept a leading `+` or `-` before the prefix; unsigned kinds
//! accept no sign at all. Digit separators such as `"1_000"` are rejected.
//!
//! Floats are parsed as `f64` and narrowed to `f32` when the destination is
//! 32 bits wide. Narrowing rounds to the nearest representable value and is
//! never an error. Only decimal float syntax is accepted; hexadecimal floats
//! such as `"0x1p-2"` fail with [`CoerceError::InvalidFloat`].
//!
//! Booleans accept `true`, `t`, `1`, `false`, `f` and `0`, ignoring ASCII
//! case. Strings are taken verbatim.

use thiserror::Error;

use crate::kind::{FieldKind, ParamValue};

/// Why a raw value could not be coerced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceError {
    /// The value has no digits.
    #[error("empty numeric literal")]
    Empty,

    /// The value contains a character that is not a digit of its base.
    #[error("invalid digit in integer literal")]
    InvalidDigit,

    /// The value does not fit the destination width.
    #[error("value out of range for destination type")]
    Overflow,

    /// The value is not a valid float literal.
    #[error("invalid float literal")]
    InvalidFloat,

    /// The value is not one of the accepted boolean literals.
    #[error("invalid boolean literal")]
    InvalidBool,

    /// The destination kind cannot be coerced into.
    #[error("unsupported destination type")]
    Unsupported,
}

/// Coerces `raw` into a value of the given kind.
///
/// # Example
///
/// ```
/// use paramstore::{coerce, FieldKind, ParamValue};
///
/// assert_eq!(coerce(FieldKind::I32, "-0x80000000"), Ok(ParamValue::I32(i32::MIN)));
/// assert_eq!(coerce(FieldKind::U8, "0b11111111"), Ok(ParamValue::U8(255)));
/// assert_eq!(coerce(FieldKind::Bool, "T"), Ok(ParamValue::Bool(true)));
/// assert!(coerce(FieldKind::U16, "65536").is_err());
/// ```
pub fn coerce(kind: FieldKind, raw: &str) -> Result<ParamValue, CoerceError> {
    let value = match kind {
        FieldKind::I8 => ParamValue::I8(parse_signed(raw)?),
        FieldKind::I16 => ParamValue::I16(parse_signed(raw)?),
        FieldKind::I32 => ParamValue::I32(parse_signed(raw)?),
        FieldKind::I64 => ParamValue::I64(parse_signed(raw)?),
        FieldKind::I128 => ParamValue::I128(parse_signed(raw)?),
        FieldKind::Isize => ParamValue::Isize(parse_signed(raw)?),
        FieldKind::U8 => ParamValue::U8(parse_unsigned(raw)?),
        FieldKind::U16 => ParamValue::U16(parse_unsigned(raw)?),
        FieldKind::U32 => ParamValue::U32(parse_unsigned(raw)?),
        FieldKind::U64 => ParamValue::U64(parse_unsigned(raw)?),
        FieldKind::U128 => ParamValue::U128(parse_unsigned(raw)?),
        FieldKind::Usize => ParamValue::Usize(parse_unsigned(raw)?),
        #[allow(clippy::cast_possible_truncation)]
        FieldKind::F32 => ParamValue::F32(parse_float(raw)? as f32),
        FieldKind::F64 => ParamValue::F64(parse_float(raw)?),
        FieldKind::Bool => ParamValue::Bool(parse_bool(raw)?),
        FieldKind::String => ParamValue::String(raw.to_string()),
        FieldKind::Unsupported(_) => return Err(CoerceError::Unsupported),
    };
    Ok(value)
}

/// Parses a signed integer with base detection.
pub fn parse_signed<T: TryFrom<i128>>(raw: &str) -> Result<T, CoerceError> {
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let magnitude = parse_magnitude(rest)?;

    let value = if negative {
        // i128::MIN has no positive counterpart.
        if magnitude == i128::MIN.unsigned_abs() {
            i128::MIN
        } else {
            i128::try_from(magnitude)
                .map(|m| -m)
                .map_err(|_| CoerceError::Overflow)?
        }
    } else {
        i128::try_from(magnitude).map_err(|_| CoerceError::Overflow)?
    };

    T::try_from(value).map_err(|_| CoerceError::Overflow)
}

/// Parses an unsigned integer with base detection. No sign is accepted.
pub fn parse_unsigned<T: TryFrom<u128>>(raw: &str) -> Result<T, CoerceError> {
    let magnitude = parse_magnitude(raw)?;
    T::try_from(magnitude).map_err(|_| CoerceError::Overflow)
}

/// Parses a float as `f64`.
///
/// Finite literals too large for `f64` are rejected; `inf`, `infinity` and
/// `nan` are accepted as written.
pub fn parse_float(raw: &str) -> Result<f64, CoerceError> {
    let value: f64 = raw.parse().map_err(|_| CoerceError::InvalidFloat)?;
    if value.is_infinite() && !raw.to_ascii_lowercase().contains("inf") {
        return Err(CoerceError::Overflow);
    }
    Ok(value)
}

/// Parses a boolean literal.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(CoerceError::InvalidBool),
    }
}

// Parse an unsigned magnitude, picking the base from its prefix
fn parse_magnitude(literal: &str) -> Result<u128, CoerceError> {
    let (radix, digits) = split_radix(literal);
    if digits.is_empty() {
        return Err(CoerceError::Empty);
    }
    // from_str_radix would accept a second sign here.
    if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CoerceError::InvalidDigit);
    }
    u128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => CoerceError::Overflow,
        _ => CoerceError::InvalidDigit,
    })
}

fn split_radix(literal: &str) -> (u32, &str) {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &literal[2..]),
            b'b' | b'B' => return (2, &literal[2..]),
            b'o' | b'O' => return (8, &literal[2..]),
            _ => return (8, &literal[1..]),
        }
    }
    (10, literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_signed_decimal_and_prefixes() {
        assert_eq!(parse_signed::<i32>("-2147483648"), Ok(i32::MIN));
        assert_eq!(
            parse_signed::<i64>("-0b10000000000000000000000000000000"),
            Ok(-2_147_483_648)
        );
        assert_eq!(parse_signed::<i64>("-0o20000000000"), Ok(-2_147_483_648));
        assert_eq!(parse_signed::<i64>("-0x80000000"), Ok(-2_147_483_648));
        assert_eq!(parse_signed::<i16>("0XfF"), Ok(255));
        assert_eq!(parse_signed::<i8>("+12"), Ok(12));
    }

    #[test]
    fn test_leading_zero_is_octal() {
        assert_eq!(parse_signed::<i32>("0123"), Ok(83));
        assert_eq!(parse_unsigned::<u32>("010"), Ok(8));
        assert_eq!(parse_signed::<i32>("0"), Ok(0));
        assert_eq!(parse_signed::<i32>("09"), Err(CoerceError::InvalidDigit));
    }

    #[test]
    fn test_signed_overflow() {
        assert_eq!(parse_signed::<i8>("128"), Err(CoerceError::Overflow));
        assert_eq!(parse_signed::<i8>("-129"), Err(CoerceError::Overflow));
        assert_eq!(parse_signed::<i8>("-128"), Ok(i8::MIN));
        assert_eq!(
            parse_signed::<i128>("-170141183460469231731687303715884105728"),
            Ok(i128::MIN)
        );
        assert_eq!(
            parse_signed::<i128>("170141183460469231731687303715884105728"),
            Err(CoerceError::Overflow)
        );
    }

    #[test]
    fn test_malformed_integers() {
        assert_eq!(parse_signed::<i32>(""), Err(CoerceError::Empty));
        assert_eq!(parse_signed::<i32>("-"), Err(CoerceError::Empty));
        assert_eq!(parse_signed::<i32>("0x"), Err(CoerceError::Empty));
        assert_eq!(parse_signed::<i32>("--5"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_signed::<i32>("-+5"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_signed::<i32>("error"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_signed::<i32>(" 5"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_signed::<i32>("0b102"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_signed::<i32>("1_000"), Err(CoerceError::InvalidDigit));
    }

    #[test]
    fn test_unsigned_rejects_sign() {
        assert_eq!(parse_unsigned::<u32>("-1"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_unsigned::<u32>("+1"), Err(CoerceError::InvalidDigit));
        assert_eq!(parse_unsigned::<u32>("-0"), Err(CoerceError::InvalidDigit));
    }

    #[test]
    fn test_unsigned_bounds() {
        assert_eq!(parse_unsigned::<u8>("255"), Ok(u8::MAX));
        assert_eq!(parse_unsigned::<u8>("256"), Err(CoerceError::Overflow));
        assert_eq!(
            parse_unsigned::<u64>("18446744073709551615"),
            Ok(u64::MAX)
        );
        assert_eq!(
            parse_unsigned::<u128>("0xffffffffffffffffffffffffffffffffff"),
            Err(CoerceError::Overflow)
        );
    }

    #[test]
    fn test_float_narrowing() {
        let value = coerce(FieldKind::F32, "0.123456789121212").unwrap();
        assert_eq!(value, ParamValue::F32(0.123_456_789_121_212_f64 as f32));

        let value = coerce(FieldKind::F64, "0.123456789121212121212").unwrap();
        assert_eq!(value, ParamValue::F64(0.123_456_789_121_212_121_212));
    }

    #[test]
    fn test_float_errors() {
        assert_eq!(parse_float("error"), Err(CoerceError::InvalidFloat));
        assert_eq!(parse_float(""), Err(CoerceError::InvalidFloat));
        assert_eq!(parse_float("0x1p-2"), Err(CoerceError::InvalidFloat));
        assert_eq!(parse_float("1e400"), Err(CoerceError::Overflow));
        assert_eq!(parse_float("-inf"), Ok(f64::NEG_INFINITY));
        assert!(parse_float("NaN").unwrap().is_nan());
    }

    #[test]
    fn test_bool_vocabulary() {
        for raw in ["true", "TRUE", "True", "t", "T", "1"] {
            assert_eq!(coerce(FieldKind::Bool, raw), Ok(ParamValue::Bool(true)), "{raw}");
        }
        for raw in ["false", "FALSE", "False", "f", "F", "0"] {
            assert_eq!(coerce(FieldKind::Bool, raw), Ok(ParamValue::Bool(false)), "{raw}");
        }
        for raw in ["yes", "no", "on", "off", "", "2", "error", " true"] {
            assert_eq!(coerce(FieldKind::Bool, raw), Err(CoerceError::InvalidBool), "{raw}");
        }
    }

    #[test]
    fn test_string_is_verbatim() {
        assert_eq!(
            coerce(FieldKind::String, "  hello world! "),
            Ok(ParamValue::String("  hello world! ".to_string()))
        );
        assert_eq!(coerce(FieldKind::String, ""), Ok(ParamValue::String(String::new())));
    }

    #[test]
    fn test_unsupported_kind() {
        assert_eq!(
            coerce(FieldKind::Unsupported("Vec<u8>"), "1"),
            Err(CoerceError::Unsupported)
        );
    }

    fn formats(negative: bool, magnitude: u128) -> Vec<String> {
        let sign = if negative { "-" } else { "" };
        vec![
            format!("{sign}{magnitude}"),
            format!("{sign}0b{magnitude:b}"),
            format!("{sign}0o{magnitude:o}"),
            format!("{sign}0x{magnitude:x}"),
        ]
    }

    fn check_signed<T>(min: T, max: T)
    where
        T: TryFrom<i128> + Into<i128> + Copy + PartialEq + std::fmt::Debug,
    {
        for value in [min, max] {
            let wide: i128 = value.into();
            for literal in formats(wide < 0, wide.unsigned_abs()) {
                assert_eq!(parse_signed::<T>(&literal).ok(), Some(value), "{literal}");
            }
        }
    }

    fn check_unsigned<T>(max: T)
    where
        T: TryFrom<u128> + Into<u128> + Copy + PartialEq + std::fmt::Debug,
    {
        for literal in formats(false, max.into()) {
            assert_eq!(parse_unsigned::<T>(&literal).ok(), Some(max), "{literal}");
        }
        assert_eq!(parse_unsigned::<T>("0b0").ok().map(Into::into), Some(0u128));
    }

    #[test]
    fn test_width_bounds_in_every_base() {
        check_signed(i8::MIN, i8::MAX);
        check_signed(i16::MIN, i16::MAX);
        check_signed(i32::MIN, i32::MAX);
        check_signed(i64::MIN, i64::MAX);
        check_signed(i128::MIN, i128::MAX);
        check_unsigned(u8::MAX);
        check_unsigned(u16::MAX);
        check_unsigned(u32::MAX);
        check_unsigned(u64::MAX);
        check_unsigned(u128::MAX);
    }

    #[test]
    fn test_pointer_width_bounds() {
        assert_eq!(parse_signed::<isize>(&isize::MIN.to_string()), Ok(isize::MIN));
        assert_eq!(parse_signed::<isize>(&format!("0x{:x}", isize::MAX)), Ok(isize::MAX));
        assert_eq!(parse_unsigned::<usize>(&format!("0o{:o}", usize::MAX)), Ok(usize::MAX));
        assert_eq!(parse_unsigned::<usize>(&format!("0b{:b}", usize::MAX)), Ok(usize::MAX));
    }

    proptest! {
        #[test]
        fn prop_i64_round_trips_in_every_base(value in any::<i64>()) {
            let wide = i128::from(value);
            for literal in formats(wide < 0, wide.unsigned_abs()) {
                prop_assert_eq!(parse_signed::<i64>(&literal), Ok(value));
            }
        }

        #[test]
        fn prop_u32_round_trips_in_every_base(value in any::<u32>()) {
            for literal in formats(false, u128::from(value)) {
                prop_assert_eq!(parse_unsigned::<u32>(&literal), Ok(value));
            }
        }

        #[test]
        fn prop_i16_out_of_range_overflows(value in (i128::from(i16::MAX) + 1)..i128::from(i64::MAX)) {
            prop_assert_eq!(parse_signed::<i16>(&value.to_string()), Err(CoerceError::Overflow));
        }
    }
}
