//! X.691 whole-number encodings
//!
//! # Encodings Overview
//!
//! | Encoding                        | Clause  | Used for                                 |
//! |---------------------------------|---------|------------------------------------------|
//! | constrained whole number        | 10.5    | `INTEGER (lb..ub)`, enumerations, counts |
//! | normally small non-negative     | 10.6    | extension indices, ext-group counts      |
//! | semi-constrained whole number   | 10.7    | `INTEGER (lb..MAX)`                      |
//! | unconstrained whole number      | 10.8    | `INTEGER`, out-of-root extension values  |
//!
//! ## Constrained whole number
//!
//! With `range = ub - lb + 1`, the offset `n - lb` is written as:
//! - nothing when `range == 1`
//! - `ceil(log2(range))` bits in the unaligned variant, or when `range < 256`
//! - one or two aligned octets when `range <= 65536` (aligned variant)
//! - a length field of `ceil(log2(max octets))` bits, then the minimal
//!   number of aligned octets, for larger ranges (aligned variant)
//!
//! Decoders are exact inverses. They also reject encodings this module
//! would never produce (offsets past `ub`, non-minimal octet counts).

use crate::bit_ref::{BitReader, BitWriter, range_bits};
use crate::length::{pack_length, unpack_length};
use ranasn_core::error::{PerError, PerResult};

fn offset_octets(offset: u64) -> u32 {
    ((64 - offset.leading_zeros()).div_ceil(8)).max(1)
}

/// Octets needed for `n` in two's complement, at least one
fn twos_complement_octets(n: i64) -> u32 {
    let significant = if n < 0 { 64 - n.leading_ones() } else { 64 - n.leading_zeros() };
    (significant + 1).div_ceil(8).clamp(1, 8)
}

fn low_bits_mask(n_bits: u32) -> u64 {
    if n_bits >= 64 { u64::MAX } else { (1u64 << n_bits) - 1 }
}

fn check_bounds(n: i64, lb: i64, ub: i64) -> PerResult<()> {
    if lb > ub || n < lb || n > ub {
        log::error!("The condition lb <= n <= ub ({} <= {} <= {}) was not met", lb, n, ub);
        return Err(PerError::constraint(n, lb, ub));
    }
    Ok(())
}

/// Encode `n` as a constrained whole number in `[lb, ub]` (X.691 10.5)
///
/// # Arguments
/// * `n` - Value to encode
/// * `lb`, `ub` - Inclusive bounds of the declared type
/// * `aligned` - Use the aligned PER variant
///
/// # Error Handling
/// Returns `ConstraintViolation` if `n` lies outside `[lb, ub]`.
pub fn pack_constrained_whole_number(w: &mut BitWriter<'_>, n: i64, lb: i64, ub: i64, aligned: bool) -> PerResult<()> {
    check_bounds(n, lb, ub)?;
    let range = (i128::from(ub) - i128::from(lb) + 1) as u128;
    if range == 1 {
        return Ok(());
    }
    let n_bits = range_bits(range);
    let offset = (i128::from(n) - i128::from(lb)) as u64;

    if !aligned || range < 256 {
        return w.pack(offset, n_bits);
    }
    if range <= 65536 {
        w.align_bytes_zero()?;
        return w.pack(offset, n_bits.div_ceil(8) * 8);
    }
    // indefinite-length case: octet count first, then the octets
    let max_octets = n_bits.div_ceil(8);
    let n_octets = offset_octets(offset);
    w.pack(u64::from(n_octets - 1), range_bits(u128::from(max_octets)))?;
    w.align_bytes_zero()?;
    w.pack(offset, n_octets * 8)
}

/// Decode a constrained whole number in `[lb, ub]`
///
/// # Error Handling
/// Returns `Decode` if the decoded value exceeds `ub` or uses a non-minimal
/// octet count, `DecodeOverflow` on truncated input.
pub fn unpack_constrained_whole_number(r: &mut BitReader<'_>, lb: i64, ub: i64, aligned: bool) -> PerResult<i64> {
    if lb > ub {
        log::error!("Invalid bounds [{}, {}]", lb, ub);
        return Err(PerError::Decode(format!("invalid bounds [{}, {}]", lb, ub)));
    }
    let range = (i128::from(ub) - i128::from(lb) + 1) as u128;
    if range == 1 {
        return Ok(lb);
    }
    let n_bits = range_bits(range);

    let offset = if !aligned || range < 256 {
        r.unpack(n_bits)?
    } else if range <= 65536 {
        r.align_bytes()?;
        r.unpack(n_bits.div_ceil(8) * 8)?
    } else {
        let max_octets = n_bits.div_ceil(8);
        let n_octets = r.unpack(range_bits(u128::from(max_octets)))? as u32 + 1;
        if n_octets > max_octets {
            log::error!("Octet count {} exceeds the {} octets of the range", n_octets, max_octets);
            return Err(PerError::Decode(format!("octet count {} exceeds {}", n_octets, max_octets)));
        }
        r.align_bytes()?;
        let offset = r.unpack(n_octets * 8)?;
        if offset_octets(offset) != n_octets {
            log::error!("Non-minimal encoding of constrained whole number");
            return Err(PerError::Decode("non-minimal constrained whole number".to_string()));
        }
        offset
    };

    let n = i128::from(lb) + i128::from(offset);
    if n > i128::from(ub) {
        log::error!("Decoded value {} exceeds the upper bound {}", n, ub);
        return Err(PerError::Decode(format!("value {} above upper bound {}", n, ub)));
    }
    Ok(n as i64)
}

/// Encode a normally small non-negative whole number (X.691 10.6)
///
/// Values up to 63 take seven bits; larger values continue as a
/// semi-constrained whole number.
pub fn pack_nsnnwn(w: &mut BitWriter<'_>, n: u64, aligned: bool) -> PerResult<()> {
    if n <= 63 {
        w.pack_bit(false)?;
        w.pack(n, 6)
    } else {
        w.pack_bit(true)?;
        pack_non_negative_binary(w, n, aligned)
    }
}

pub fn unpack_nsnnwn(r: &mut BitReader<'_>, aligned: bool) -> PerResult<u64> {
    if !r.unpack_bool()? {
        return r.unpack(6);
    }
    let n = unpack_non_negative_binary(r, aligned)?;
    if n <= 63 {
        log::error!("Normally small number {} encoded in its long form", n);
        return Err(PerError::Decode(format!("non-canonical normally small number {}", n)));
    }
    Ok(n)
}

fn pack_non_negative_binary(w: &mut BitWriter<'_>, offset: u64, aligned: bool) -> PerResult<()> {
    let n_octets = offset_octets(offset);
    pack_length(w, n_octets, aligned)?;
    if aligned {
        w.align_bytes_zero()?;
    }
    w.pack(offset, n_octets * 8)
}

fn unpack_non_negative_binary(r: &mut BitReader<'_>, aligned: bool) -> PerResult<u64> {
    let n_octets = unpack_length(r, aligned)?;
    if n_octets == 0 || n_octets > 8 {
        log::error!("Unsupported integer length of {} octets", n_octets);
        return Err(PerError::Decode(format!("integer length of {} octets", n_octets)));
    }
    if aligned {
        r.align_bytes()?;
    }
    let offset = r.unpack(n_octets * 8)?;
    if offset_octets(offset) != n_octets {
        log::error!("Non-minimal encoding of {} octets", n_octets);
        return Err(PerError::Decode("non-minimal non-negative binary integer".to_string()));
    }
    Ok(offset)
}

/// Encode `n >= lb` as a semi-constrained whole number (X.691 10.7)
pub fn pack_semi_constrained_whole_number(w: &mut BitWriter<'_>, n: i64, lb: i64, aligned: bool) -> PerResult<()> {
    if n < lb {
        log::error!("The condition lb <= n ({} <= {}) was not met", lb, n);
        return Err(PerError::constraint(n, lb, i64::MAX));
    }
    pack_non_negative_binary(w, (i128::from(n) - i128::from(lb)) as u64, aligned)
}

pub fn unpack_semi_constrained_whole_number(r: &mut BitReader<'_>, lb: i64, aligned: bool) -> PerResult<i64> {
    let offset = unpack_non_negative_binary(r, aligned)?;
    let n = i128::from(lb) + i128::from(offset);
    i64::try_from(n).map_err(|_| {
        log::error!("Semi-constrained value {} does not fit 64 bits", n);
        PerError::Decode(format!("value {} out of 64-bit range", n))
    })
}

/// Encode `n` in minimal two's complement octets with a length prefix (X.691 10.8)
pub fn pack_unconstrained_whole_number(w: &mut BitWriter<'_>, n: i64, aligned: bool) -> PerResult<()> {
    let n_octets = twos_complement_octets(n);
    pack_length(w, n_octets, aligned)?;
    if aligned {
        w.align_bytes_zero()?;
    }
    w.pack(n as u64 & low_bits_mask(n_octets * 8), n_octets * 8)
}

pub fn unpack_unconstrained_whole_number(r: &mut BitReader<'_>, aligned: bool) -> PerResult<i64> {
    let n_octets = unpack_length(r, aligned)?;
    if n_octets == 0 || n_octets > 8 {
        log::error!("Unsupported integer length of {} octets", n_octets);
        return Err(PerError::Decode(format!("integer length of {} octets", n_octets)));
    }
    if aligned {
        r.align_bytes()?;
    }
    let raw = r.unpack(n_octets * 8)?;
    let shift = 64 - n_octets * 8;
    let n = ((raw << shift) as i64) >> shift;
    if twos_complement_octets(n) != n_octets {
        log::error!("Non-minimal encoding of unconstrained whole number {}", n);
        return Err(PerError::Decode(format!("non-minimal encoding of {}", n)));
    }
    Ok(n)
}

/// Encode an `INTEGER` with optional extension marker (X.691 clause 13)
///
/// Bounds of `i64::MIN`/`i64::MAX` stand for "no lower/upper bound". With
/// `has_ext`, a leading bit tells whether the value lies in the root range;
/// values outside it take the unconstrained encoding.
pub fn pack_integer(w: &mut BitWriter<'_>, n: i64, lb: i64, ub: i64, has_ext: bool, aligned: bool) -> PerResult<()> {
    if has_ext {
        let within = (lb..=ub).contains(&n);
        w.pack_bit(!within)?;
        if !within {
            return pack_unconstrained_whole_number(w, n, aligned);
        }
    }
    match (lb != i64::MIN, ub != i64::MAX) {
        (true, true) => pack_constrained_whole_number(w, n, lb, ub, aligned),
        (true, false) => pack_semi_constrained_whole_number(w, n, lb, aligned),
        (false, upper_bounded) => {
            if upper_bounded && n > ub {
                log::error!("The condition n <= ub ({} <= {}) was not met", n, ub);
                return Err(PerError::constraint(n, lb, ub));
            }
            pack_unconstrained_whole_number(w, n, aligned)
        }
    }
}

pub fn unpack_integer(r: &mut BitReader<'_>, lb: i64, ub: i64, has_ext: bool, aligned: bool) -> PerResult<i64> {
    if has_ext && r.unpack_bool()? {
        return unpack_unconstrained_whole_number(r, aligned);
    }
    match (lb != i64::MIN, ub != i64::MAX) {
        (true, true) => unpack_constrained_whole_number(r, lb, ub, aligned),
        (true, false) => unpack_semi_constrained_whole_number(r, lb, aligned),
        (false, upper_bounded) => {
            let n = unpack_unconstrained_whole_number(r, aligned)?;
            if upper_bounded && n > ub {
                log::error!("Decoded value {} exceeds the upper bound {}", n, ub);
                return Err(PerError::Decode(format!("value {} above upper bound {}", n, ub)));
            }
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(f: impl FnOnce(&mut BitWriter<'_>) -> PerResult<()>) -> (Vec<u8>, usize) {
        let mut buf = [0u8; 32];
        let mut w = BitWriter::new(&mut buf);
        f(&mut w).unwrap();
        let bits = w.distance_bits();
        (w.finish().to_vec(), bits)
    }

    #[test]
    fn test_octet_range() {
        let (bytes, bits) = encode(|w| pack_constrained_whole_number(w, 200, 0, 255, false));
        assert_eq!((bytes, bits), (vec![0xC8], 8));
        let mut r = BitReader::new(&[0xC8]);
        assert_eq!(unpack_constrained_whole_number(&mut r, 0, 255, false).unwrap(), 200);
    }

    #[test]
    fn test_out_of_range_fails() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        let err = pack_constrained_whole_number(&mut w, 256, 0, 255, false).unwrap_err();
        assert_eq!(err.code(), ranasn_core::ResultCode::EncodeFail);
        assert!(pack_constrained_whole_number(&mut w, -1, 0, 255, false).is_err());
        assert_eq!(w.distance_bits(), 0);
    }

    #[test]
    fn test_single_value_range_is_empty() {
        let (bytes, bits) = encode(|w| pack_constrained_whole_number(w, 7, 7, 7, true));
        assert_eq!((bytes.len(), bits), (0, 0));
        let mut r = BitReader::new(&[]);
        assert_eq!(unpack_constrained_whole_number(&mut r, 7, 7, true).unwrap(), 7);
    }

    #[test]
    fn test_aligned_two_octet_range() {
        let (bytes, bits) = encode(|w| {
            w.pack_bit(true)?;
            pack_constrained_whole_number(w, 258, 0, 4095, true)
        });
        assert_eq!(bits, 24);
        assert_eq!(bytes, vec![0x80, 0x01, 0x02]);
        let mut r = BitReader::new(&bytes);
        r.advance_bits(1).unwrap();
        assert_eq!(unpack_constrained_whole_number(&mut r, 0, 4095, true).unwrap(), 258);
    }

    #[test]
    fn test_aligned_large_range() {
        // range 2^32: length in 2 bits, then aligned octets
        let (bytes, bits) = encode(|w| pack_constrained_whole_number(w, 256, 0, 4294967295, true));
        assert_eq!(bits, 24);
        assert_eq!(bytes, vec![0x40, 0x01, 0x00]);
        let mut r = BitReader::new(&bytes);
        assert_eq!(unpack_constrained_whole_number(&mut r, 0, 4294967295, true).unwrap(), 256);
    }

    #[test]
    fn test_decoded_value_above_upper_bound() {
        // range 41 uses 6 bits, 63 is above 40
        let mut r = BitReader::new(&[0xFC]);
        assert!(unpack_constrained_whole_number(&mut r, 0, 40, false).unwrap_err().is_decode_failure());
    }

    #[test]
    fn test_nsnnwn() {
        let (bytes, bits) = encode(|w| pack_nsnnwn(w, 2, false));
        assert_eq!((bytes, bits), (vec![0x04], 7));
        let (bytes, bits) = encode(|w| pack_nsnnwn(w, 300, false));
        assert_eq!(bits, 1 + 8 + 16);
        let mut r = BitReader::new(&bytes);
        assert_eq!(unpack_nsnnwn(&mut r, false).unwrap(), 300);
    }

    #[test]
    fn test_unconstrained() {
        for (n, expected) in [(0i64, vec![0x01, 0x00]), (-1, vec![0x01, 0xFF]), (128, vec![0x02, 0x00, 0x80])] {
            let (bytes, _) = encode(|w| pack_unconstrained_whole_number(w, n, false));
            assert_eq!(bytes, expected);
            let mut r = BitReader::new(&bytes);
            assert_eq!(unpack_unconstrained_whole_number(&mut r, false).unwrap(), n);
        }
        let mut r = BitReader::new(&[0x02, 0x00, 0x01]);
        assert!(unpack_unconstrained_whole_number(&mut r, false).is_err());
    }

    #[test]
    fn test_extensible_integer() {
        let (bytes, bits) = encode(|w| pack_integer(w, 5, 0, 7, true, false));
        assert_eq!((bytes.clone(), bits), (vec![0x50], 4));
        let mut r = BitReader::new(&bytes);
        assert_eq!(unpack_integer(&mut r, 0, 7, true, false).unwrap(), 5);

        let (bytes, bits) = encode(|w| pack_integer(w, 8, 0, 7, true, false));
        assert_eq!(bits, 1 + 8 + 8);
        let mut r = BitReader::new(&bytes);
        assert_eq!(unpack_integer(&mut r, 0, 7, true, false).unwrap(), 8);

        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        assert!(pack_integer(&mut w, 8, 0, 7, false, false).is_err());
    }

    #[test]
    fn test_semi_constrained_integer() {
        let (bytes, _) = encode(|w| pack_integer(w, 1000, 1, i64::MAX, false, false));
        let mut r = BitReader::new(&bytes);
        assert_eq!(unpack_integer(&mut r, 1, i64::MAX, false, false).unwrap(), 1000);
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        assert!(pack_integer(&mut w, 0, 1, i64::MAX, false, false).is_err());
    }
}
