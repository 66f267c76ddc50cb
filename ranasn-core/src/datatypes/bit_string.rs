//! Bit string type for ASN.1 `BIT STRING`
//!
//! # Bit Numbering
//!
//! Bit `0` is the least significant bit of the value: it is the last bit on
//! the wire and the right-most character of the text view. For a ten bit
//! string with bits 7 and 9 set:
//!
//! ```text
//! index:  9 8 7 6 5 4 3 2 1 0
//! text:   1 0 1 0 0 0 0 0 0 0     -> "1010000000", number 640
//! ```
//!
//! Storage keeps bit `i` in octet `i / 8` at position `i % 8`; unused high
//! bits of the last octet are always zero.

use super::validate_bit_text;
use crate::containers::ExtArray;
use crate::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Bit string with `LB <= length <= UB`
///
/// `EXT` marks an extensible size constraint and `AL` selects the aligned
/// PER variant. `UB = u32::MAX` means "no upper bound".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString<const LB: u32, const UB: u32, const EXT: bool = false, const AL: bool = false> {
    octets: ExtArray<u8, 16>,
    nof_bits: u32,
}

/// `BIT STRING (SIZE (N))`
pub type FixedBitString<const N: u32> = BitString<N, N, false, false>;
/// `BIT STRING (SIZE (LB..UB))`
pub type BoundedBitString<const LB: u32, const UB: u32> = BitString<LB, UB, false, false>;
/// `BIT STRING` without size constraint
pub type DynBitString = BitString<0, { u32::MAX }, false, false>;

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> Default for BitString<LB, UB, EXT, AL> {
    fn default() -> Self {
        Self::with_len(LB)
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> BitString<LB, UB, EXT, AL> {
    pub fn new() -> Self {
        Self::default()
    }

    /// All-zero bit string of `nof_bits` bits
    pub fn with_len(nof_bits: u32) -> Self {
        let mut bits = Self {
            octets: ExtArray::new(),
            nof_bits: 0,
        };
        bits.resize(nof_bits);
        bits
    }

    /// Number of bits
    pub fn len(&self) -> u32 {
        self.nof_bits
    }

    pub fn is_empty(&self) -> bool {
        self.nof_bits == 0
    }

    pub fn nof_octets(&self) -> usize {
        self.octets.len()
    }

    /// Change the length; the content is reset to all zeros
    pub fn resize(&mut self, nof_bits: u32) {
        self.octets.clear();
        self.octets.resize(nof_bits.div_ceil(8) as usize);
        self.nof_bits = nof_bits;
    }

    pub fn get(&self, idx: u32) -> bool {
        if idx >= self.nof_bits {
            log::error!("Bit index {} out of bounds (length {})", idx, self.nof_bits);
            return false;
        }
        (self.octets[(idx / 8) as usize] >> (idx % 8)) & 1 == 1
    }

    pub fn set(&mut self, idx: u32, value: bool) {
        if idx >= self.nof_bits {
            log::error!("Bit index {} out of bounds (length {})", idx, self.nof_bits);
            return;
        }
        let mask = 1u8 << (idx % 8);
        let octet = &mut self.octets[(idx / 8) as usize];
        if value {
            *octet |= mask;
        } else {
            *octet &= !mask;
        }
    }

    /// Raw storage, bit `i` in octet `i / 8` at position `i % 8`
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Raw mutable storage
    ///
    /// Writers must keep the unused high bits of the last octet at zero.
    /// The numeric view ignores them, comparison does not.
    pub fn octets_mut(&mut self) -> &mut [u8] {
        &mut self.octets
    }

    /// Mask of the used bits in the last octet
    fn top_mask(&self) -> u8 {
        match self.nof_bits % 8 {
            0 => 0xFF,
            used => (1u8 << used) - 1,
        }
    }

    /// Text view, most significant bit first
    pub fn to_bit_string(&self) -> String {
        (0..self.nof_bits)
            .rev()
            .map(|idx| if self.get(idx) { '1' } else { '0' })
            .collect()
    }

    /// Parse a text view such as `"1010000010"`
    ///
    /// # Error Handling
    /// Returns `InvalidValue` for characters other than `0`/`1`, or when the
    /// length violates the size constraint (unless the constraint is
    /// extensible).
    pub fn from_bit_string(text: &str) -> PerResult<Self> {
        validate_bit_text(text)?;
        let nof_bits = u32::try_from(text.len())
            .map_err(|_| PerError::InvalidValue(format!("bit string of {} bits is too long", text.len())))?;
        Self::check_len(nof_bits)?;
        let mut bits = Self::with_len(nof_bits);
        for (pos, c) in text.bytes().enumerate() {
            bits.set(nof_bits - 1 - pos as u32, c == b'1');
        }
        Ok(bits)
    }

    /// Numeric view, bit 0 being the least significant bit
    pub fn to_number(&self) -> PerResult<u64> {
        if self.nof_bits > 64 {
            log::error!("Bit string of {} bits does not fit a 64-bit number", self.nof_bits);
            return Err(PerError::InvalidValue(format!(
                "{} bits do not fit a 64-bit number",
                self.nof_bits
            )));
        }
        let last = self.octets.len().saturating_sub(1);
        let top_mask = self.top_mask();
        Ok(self.octets.iter().enumerate().fold(0u64, |acc, (i, &b)| {
            let b = if i == last { b & top_mask } else { b };
            acc | (u64::from(b) << (8 * i))
        }))
    }

    /// Set from a number using the fewest bits that hold it, at least `LB`
    ///
    /// # Error Handling
    /// A value needing more than `UB` bits is rejected with `InvalidValue`
    /// and the bit string is left unchanged.
    pub fn from_number(&mut self, value: u64) -> PerResult<&mut Self> {
        let needed = 64 - value.leading_zeros();
        self.from_number_with_len(value, needed.max(LB))
    }

    /// Set from a number using exactly `nof_bits` bits
    ///
    /// The bit string is left unchanged on error.
    pub fn from_number_with_len(&mut self, value: u64, nof_bits: u32) -> PerResult<&mut Self> {
        if nof_bits > UB || nof_bits > 64 {
            log::error!(
                "The provided bitstring value {} does not fit the bounds [{}, {}]",
                value,
                LB,
                UB
            );
            return Err(PerError::InvalidValue(format!(
                "{} needs {} bits, more than the upper bound {}",
                value, nof_bits, UB
            )));
        }
        if nof_bits < 64 && value >> nof_bits != 0 {
            log::error!("Value {} does not fit in {} bits", value, nof_bits);
            return Err(PerError::InvalidValue(format!("{} does not fit in {} bits", value, nof_bits)));
        }
        self.resize(nof_bits);
        for (i, octet) in self.octets.iter_mut().enumerate() {
            *octet = (value >> (8 * i)) as u8;
        }
        Ok(self)
    }

    /// Whether `nof_bits` satisfies the size constraint
    pub fn is_within_bounds(nof_bits: u32) -> bool {
        (LB..=UB).contains(&nof_bits)
    }

    fn check_len(nof_bits: u32) -> PerResult<()> {
        if EXT || Self::is_within_bounds(nof_bits) {
            return Ok(());
        }
        log::error!("Bit string length {} outside of [{}, {}]", nof_bits, LB, UB);
        Err(PerError::InvalidValue(format!(
            "length {} outside of [{}, {}]",
            nof_bits, LB, UB
        )))
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> fmt::Display for BitString<LB, UB, EXT, AL> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> PartialEq<str> for BitString<LB, UB, EXT, AL> {
    fn eq(&self, other: &str) -> bool {
        self.to_bit_string() == other
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> PartialEq<&str> for BitString<LB, UB, EXT, AL> {
    fn eq(&self, other: &&str) -> bool {
        self.to_bit_string() == *other
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> Serialize for BitString<LB, UB, EXT, AL> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bit_string())
    }
}
