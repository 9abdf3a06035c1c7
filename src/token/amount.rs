//! Token amount codec
//!
//! A token cell's data is its balance as an unsigned 128-bit integer: the
//! low 64 bits little-endian followed by the high 64 bits little-endian.

use std::num::IntErrorKind;

use super::error::TokenError;

/// Encoded amount length in bytes
pub const AMOUNT_SIZE: usize = 16;

pub fn encode_amount(amount: u128) -> [u8; AMOUNT_SIZE] {
    let mut out = [0u8; AMOUNT_SIZE];
    out[..8].copy_from_slice(&(amount as u64).to_le_bytes());
    out[8..].copy_from_slice(&((amount >> 64) as u64).to_le_bytes());
    out
}

/// Decode a cell data payload; anything but exactly 16 bytes is rejected
pub fn decode_amount(data: &[u8]) -> Result<u128, TokenError> {
    if data.len() != AMOUNT_SIZE {
        return Err(TokenError::MalformedInput { len: data.len() });
    }

    let mut low = [0u8; 8];
    let mut high = [0u8; 8];
    low.copy_from_slice(&data[..8]);
    high.copy_from_slice(&data[8..]);
    Ok((u128::from(u64::from_le_bytes(high)) << 64) | u128::from(u64::from_le_bytes(low)))
}

/// Parse a decimal amount
///
/// Negative values and values of 2^128 or more are `OutOfRange`.
pub fn parse_amount(input: &str) -> Result<u128, TokenError> {
    let input = input.trim();
    if let Some(magnitude) = input.strip_prefix('-') {
        if !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
            if magnitude.bytes().all(|b| b == b'0') {
                return Ok(0);
            }
            return Err(TokenError::OutOfRange(input.to_string()));
        }
    }

    input.parse::<u128>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => TokenError::OutOfRange(input.to_string()),
        _ => TokenError::InvalidAmount(input.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let encoded = encode_amount((7u128 << 64) | 0x0102);
        assert_eq!(&encoded[..8], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&encoded[8..], &[7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_boundaries_roundtrip() {
        for amount in [0, 1, 100, u128::from(u64::MAX), u128::from(u64::MAX) + 1, u128::MAX] {
            assert_eq!(decode_amount(&encode_amount(amount)).unwrap(), amount);
        }
        assert_eq!(encode_amount(u128::MAX), [0xff; 16]);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(
            decode_amount(&[0u8; 15]),
            Err(TokenError::MalformedInput { len: 15 })
        ));
        assert!(matches!(
            decode_amount(&[0u8; 17]),
            Err(TokenError::MalformedInput { len: 17 })
        ));
        assert!(matches!(
            decode_amount(&[]),
            Err(TokenError::MalformedInput { len: 0 })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("350").unwrap(), 350);
        assert_eq!(parse_amount(" 0 ").unwrap(), 0);
        assert_eq!(parse_amount("-0").unwrap(), 0);
        assert_eq!(parse_amount(&u128::MAX.to_string()).unwrap(), u128::MAX);

        // 2^128
        assert!(matches!(
            parse_amount("340282366920938463463374607431768211456"),
            Err(TokenError::OutOfRange(_))
        ));
        assert!(matches!(parse_amount("-5"), Err(TokenError::OutOfRange(_))));
        assert!(matches!(parse_amount("12ab"), Err(TokenError::InvalidAmount(_))));
        assert!(matches!(parse_amount(""), Err(TokenError::InvalidAmount(_))));
    }
}
