use thiserror::Error;

use crate::key::Key;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKeyError {
    #[error("invalid digit {0:?}")]
    InvalidDigit(char),
    #[error("missing 0x prefix")]
    MissingHexPrefix,
    #[error("value does not fit the field width")]
    Overflow,
    #[error("empty value")]
    Empty,
}

/// Parse a binary prefix string (`10110…`), left-aligning the bits.
pub fn parse_binary(s: &str) -> Result<Key, ParseKeyError> {
    let mut value = Key::ZERO;
    let mut bit = Key::HIGH_BIT;
    for c in s.chars() {
        match c {
            '1' => value |= bit,
            '0' => {}
            other => return Err(ParseKeyError::InvalidDigit(other)),
        }
        bit = bit.shr(1);
    }
    Ok(value)
}

/// Parse a `0x…` hex string for a `width`-bit field, left-aligning the
/// digits. Widths that are not a nibble multiple realign the final sub-nibble.
pub fn parse_hex(s: &str, width: u8) -> Result<Key, ParseKeyError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(ParseKeyError::MissingHexPrefix)?;
    if digits.is_empty() {
        return Err(ParseKeyError::Empty);
    }
    let mut value = Key::ZERO;
    let mut shift: i32 = 124;
    for c in digits.chars() {
        let d = c.to_digit(16).ok_or(ParseKeyError::InvalidDigit(c))?;
        if shift < 0 {
            return Err(ParseKeyError::Overflow);
        }
        value |= Key::new(u128::from(d) << shift);
        shift -= 4;
    }
    if width % 4 != 0 {
        value = value.shl(u32::from(4 - width % 4));
    }
    Ok(value)
}

/// Parse a decimal value for a `width`-bit field, left-aligning the result.
/// Values wider than 64 bits use the `high'low` form.
pub fn parse_decimal(s: &str, width: u8) -> Result<Key, ParseKeyError> {
    let raw = if let Some((high, low)) = s.split_once('\'') {
        let high = parse_u64(high)?;
        let low = parse_u64(low)?;
        u128::from(high) << 64 | u128::from(low)
    } else {
        u128::from(parse_u64(s)?)
    };
    if width < 128 && raw >> width != 0 {
        return Err(ParseKeyError::Overflow);
    }
    Ok(Key::new(raw).shl(128 - u32::from(width)))
}

fn parse_u64(s: &str) -> Result<u64, ParseKeyError> {
    if s.is_empty() {
        return Err(ParseKeyError::Empty);
    }
    let mut value: u64 = 0;
    for c in s.chars() {
        let d = c.to_digit(10).ok_or(ParseKeyError::InvalidDigit(c))?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or(ParseKeyError::Overflow)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("101", 0b101u128, 3 ; "three bits")]
    #[test_case("", 0, 0 ; "empty is zero")]
    fn binary_round_trip(s: &str, value: u128, width: u8) {
        let key = parse_binary(s).unwrap();
        if width > 0 {
            assert_eq!(key.top(width), value);
            assert_eq!(key.to_binary(width), s);
        } else {
            assert!(key.is_zero());
        }
    }

    #[test]
    fn hex_round_trip() {
        for width in [6u8, 8, 16, 32, 48, 128] {
            for value in [0u128, 1, 37, 255] {
                let aligned = Key::new(value).shl(128 - u32::from(width));
                let rendered = format!("0x{}", aligned.to_hex(width));
                assert_eq!(parse_hex(&rendered, width).unwrap(), aligned);
            }
        }
    }

    #[test]
    fn decimal_round_trip() {
        let key = parse_decimal("300", 16).unwrap();
        assert_eq!(key.to_decimal(16), "300");
        let wide = parse_decimal("5'7", 70).unwrap();
        assert_eq!(wide.to_decimal(70), "5'7");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_binary("102").is_err());
        assert!(parse_hex("ff", 8).is_err());
        assert!(parse_decimal("12x", 16).is_err());
        assert!(parse_decimal("70000", 16).is_err());
    }
}
