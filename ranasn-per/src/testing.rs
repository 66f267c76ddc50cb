//! Round-trip consistency check for message types
//!
//! ```text
//! value --pack--> bytes A --unpack--> copy --pack--> bytes B
//!                   |                   |
//!                   +--- bits read == bits written, A == B
//! ```

use crate::bit_ref::{BitReader, BitWriter};
use crate::config::CodecConfig;
use crate::traits::{Pack, Unpack};
use ranasn_core::error::{PerError, PerResult};

/// Pack `value`, unpack it into a fresh value and pack that again
///
/// # Returns
/// Number of bits of the encoding
///
/// # Error Handling
/// Pack and unpack failures are returned as is. A decode that consumes a
/// different number of bits, or a re-encoding that differs from the first
/// one in length or content, is `RoundTripMismatch`.
pub fn test_pack_unpack_consistency<T: Pack + Unpack + Default>(value: &T) -> PerResult<usize> {
    test_pack_unpack_consistency_with(value, &CodecConfig::default())
}

/// Same as [`test_pack_unpack_consistency`] with explicit buffer sizes
pub fn test_pack_unpack_consistency_with<T: Pack + Unpack + Default>(value: &T, config: &CodecConfig) -> PerResult<usize> {
    let mut first = vec![0u8; config.buffer_size];
    let mut w = BitWriter::new(&mut first);
    value.pack(&mut w)?;
    let nof_bits = w.distance_bits();
    let first = w.finish();
    log::debug!("Packed {} bits: {:02x?}", nof_bits, first);

    let mut copy = T::default();
    let mut r = BitReader::new(first);
    copy.unpack(&mut r)?;
    if r.distance_bits() != nof_bits {
        log::error!("Unpack consumed {} bits, pack produced {}", r.distance_bits(), nof_bits);
        return Err(PerError::RoundTripMismatch(format!(
            "{} bits read, {} bits written",
            r.distance_bits(),
            nof_bits
        )));
    }

    let mut second = vec![0u8; config.buffer_size];
    let mut w = BitWriter::new(&mut second);
    copy.pack(&mut w)?;
    let nof_bits2 = w.distance_bits();
    let second = w.finish();
    if nof_bits2 != nof_bits {
        log::error!("Re-encoding has {} bits, first encoding {}", nof_bits2, nof_bits);
        return Err(PerError::RoundTripMismatch(format!(
            "{} bits re-encoded, {} bits encoded",
            nof_bits2, nof_bits
        )));
    }
    if first != second {
        log::error!("Re-encoding differs: {:02x?} vs {:02x?}", first, second);
        return Err(PerError::RoundTripMismatch("re-encoded octets differ".to_string()));
    }
    Ok(nof_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::Integer;

    /// Writes one bit more than it reads
    #[derive(Default)]
    struct Lopsided;

    impl Pack for Lopsided {
        fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
            w.pack(0b10, 2)
        }
    }

    impl Unpack for Lopsided {
        fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
            r.unpack(1).map(|_| ())
        }
    }

    /// Re-encodes shorter once it has been decoded
    #[derive(Default)]
    struct Shrinks {
        decoded: bool,
    }

    impl Pack for Shrinks {
        fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
            if self.decoded {
                w.pack(1, 1)
            } else {
                w.pack(0b10, 2)
            }
        }
    }

    impl Unpack for Shrinks {
        fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
            r.unpack(2)?;
            self.decoded = true;
            Ok(())
        }
    }

    #[test]
    fn test_consistent_value() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(test_pack_unpack_consistency(&Integer::<0, 4095>::new(147)).unwrap(), 12);
    }

    #[test]
    fn test_mismatch_detected() {
        let err = test_pack_unpack_consistency(&Lopsided).unwrap_err();
        assert!(matches!(err, PerError::RoundTripMismatch(_)));
    }

    #[test]
    fn test_shorter_re_encoding_detected() {
        // [0x80] both times, 2 bits then 1 bit
        let err = test_pack_unpack_consistency(&Shrinks::default()).unwrap_err();
        assert!(matches!(err, PerError::RoundTripMismatch(_)));
    }

    #[test]
    fn test_pack_failure_propagates() {
        let err = test_pack_unpack_consistency(&Integer::<0, 7>::new(9)).unwrap_err();
        assert!(matches!(err, PerError::ConstraintViolation { .. }));
    }
}
