//! Constraint-carrying value types
//!
//! The string types carry their ASN.1 constraints (size bounds, extension
//! marker, aligned/unaligned variant) as const generic parameters, so a field
//! declared as `OCTET STRING (SIZE (1..32))` in a protocol module maps onto a
//! single Rust type. Their PER codecs live in the `ranasn-per` crate; this
//! module only provides storage and the human-facing views (hex text, binary
//! text, numeric value).

pub mod bit_string;
pub mod char_string;
pub mod octet_string;

pub use bit_string::{BitString, BoundedBitString, DynBitString, FixedBitString};
pub use char_string::{AsnString, CharSet, Ia5, Printable, PrintableString, Visible, VisibleString};
pub use octet_string::{BoundedOctString, DynOctString, FixedOctString, UnboundedOctString};

use crate::error::{PerError, PerResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[0-9a-fA-F]{2})*$").expect("valid hex pattern"));

static BIT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[01]*$").expect("valid bit pattern"));

/// Render octets as lower-case hex, two digits per octet
pub fn octets_to_hex(octets: &[u8]) -> String {
    let mut text = String::with_capacity(octets.len() * 2);
    for byte in octets {
        let _ = write!(text, "{:02x}", byte);
    }
    text
}

/// Parse a hex string ("014477aaff") into octets
///
/// # Error Handling
/// Returns `InvalidValue` for odd-length input or non-hex characters.
pub fn hex_to_octets(text: &str) -> PerResult<Vec<u8>> {
    if !HEX_PATTERN.is_match(text) {
        log::error!("Invalid hex string \"{}\"", text);
        return Err(PerError::InvalidValue(format!("invalid hex string \"{}\"", text)));
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let digits = std::str::from_utf8(pair).map_err(|e| PerError::InvalidValue(e.to_string()))?;
            u8::from_str_radix(digits, 16).map_err(|e| PerError::InvalidValue(e.to_string()))
        })
        .collect()
}

/// Check a "0101..." binary string
pub fn validate_bit_text(text: &str) -> PerResult<()> {
    if BIT_PATTERN.is_match(text) {
        Ok(())
    } else {
        log::error!("Invalid bit string \"{}\"", text);
        Err(PerError::InvalidValue(format!("invalid bit string \"{}\"", text)))
    }
}

/// Interpret octets as a big-endian unsigned number
pub fn octets_to_number(octets: &[u8]) -> PerResult<u64> {
    if octets.len() > 8 {
        log::error!("Octet string of {} octets does not fit a 64-bit number", octets.len());
        return Err(PerError::InvalidValue(format!(
            "{} octets do not fit a 64-bit number",
            octets.len()
        )));
    }
    Ok(octets.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Minimal big-endian octets of `value`, at least one octet
pub fn number_to_octets(value: u64) -> Vec<u8> {
    let nof_octets = (8 - value.leading_zeros() as usize / 8).max(1);
    value.to_be_bytes()[8 - nof_octets..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let octets = hex_to_octets("014477aaFF").unwrap();
        assert_eq!(octets, vec![0x01, 0x44, 0x77, 0xAA, 0xFF]);
        assert_eq!(octets_to_hex(&octets), "014477aaff");
    }

    #[test]
    fn test_hex_rejects_malformed() {
        assert!(hex_to_octets("abc").is_err());
        assert!(hex_to_octets("zz").is_err());
        assert_eq!(hex_to_octets("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_number_views() {
        assert_eq!(octets_to_number(&[0x01, 0x44, 0x77, 0xAA, 0xFF]).unwrap(), 5443660543);
        assert_eq!(number_to_octets(5443660543), vec![0x01, 0x44, 0x77, 0xAA, 0xFF]);
        assert_eq!(number_to_octets(0), vec![0]);
        assert!(octets_to_number(&[0; 9]).is_err());
    }

    #[test]
    fn test_bit_text() {
        assert!(validate_bit_text("0110").is_ok());
        assert!(validate_bit_text("0120").is_err());
    }
}
