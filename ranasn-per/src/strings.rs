//! PER codecs for OCTET STRING, BIT STRING and restricted character strings
//!
//! The value types live in `ranasn_core::datatypes`; this module gives them
//! their wire form.
//!
//! # Octet Strings (X.691 17)
//!
//! ```text
//! fixed (SIZE (N)):       [ align if AL and N > 2 ] [ N octets ]
//! bounded (SIZE (lb..ub)): [ length in lb..ub ] [ align if AL ] [ octets ]
//! unbounded:              [ length determinant ] [ octets ]
//! ```
//!
//! # Bit Strings (X.691 16)
//!
//! Bits travel most significant first: the partial top octet, then the
//! remaining octets from high to low.

use crate::bit_ref::{BitReader, BitWriter, range_bits};
use crate::length::{pack_constrained_length, pack_length, unpack_constrained_length, unpack_length};
use crate::traits::{Pack, Unpack};
use ranasn_core::datatypes::{AsnString, BitString, BoundedOctString, CharSet, FixedOctString, UnboundedOctString};
use ranasn_core::error::{PerError, PerResult};

/// Largest fixed size encoded without octet alignment
const UNALIGNED_FIXED_OCTETS: usize = 2;
const UNALIGNED_FIXED_BITS: u32 = 16;

impl<const N: usize, const AL: bool> Pack for FixedOctString<N, AL> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        if AL && N > UNALIGNED_FIXED_OCTETS {
            w.align_bytes_zero()?;
        }
        w.pack_bytes(self)
    }
}

impl<const N: usize, const AL: bool> Unpack for FixedOctString<N, AL> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        if AL && N > UNALIGNED_FIXED_OCTETS {
            r.align_bytes()?;
        }
        r.unpack_bytes(self)
    }
}

impl<const LB: u32, const UB: u32, const AL: bool> Pack for BoundedOctString<LB, UB, AL> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let len = u32::try_from(self.size()).map_err(|_| PerError::Encode("octet string too long".to_string()))?;
        pack_constrained_length(w, len, LB, UB, AL)?;
        if AL {
            w.align_bytes_zero()?;
        }
        w.pack_bytes(self)
    }
}

impl<const LB: u32, const UB: u32, const AL: bool> Unpack for BoundedOctString<LB, UB, AL> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let len = unpack_constrained_length(r, LB, UB, AL)? as usize;
        if AL {
            r.align_bytes()?;
        }
        if len * 8 > r.remaining_bits() {
            log::error!("Octet string of {} octets exceeds the remaining buffer", len);
            self.resize(0);
            return Err(PerError::DecodeOverflow {
                needed: len * 8,
                available: r.remaining_bits(),
            });
        }
        self.resize(len);
        if self.size() != len {
            self.resize(0);
            return Err(PerError::Decode(format!("cannot hold an octet string of {} octets", len)));
        }
        r.unpack_bytes(self)
    }
}

impl<const AL: bool> Pack for UnboundedOctString<AL> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let len = u32::try_from(self.size()).map_err(|_| PerError::Encode("octet string too long".to_string()))?;
        pack_length(w, len, AL)?;
        w.pack_bytes(self)
    }
}

impl<const AL: bool> Unpack for UnboundedOctString<AL> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let len = unpack_length(r, AL)? as usize;
        if len * 8 > r.remaining_bits() {
            log::error!("Octet string of {} octets exceeds the remaining buffer", len);
            return Err(PerError::DecodeOverflow {
                needed: len * 8,
                available: r.remaining_bits(),
            });
        }
        self.resize(len);
        r.unpack_bytes(self)
    }
}

fn pack_bit_content(w: &mut BitWriter<'_>, octets: &[u8], nof_bits: u32) -> PerResult<()> {
    let Some((top, rest)) = octets.split_last() else {
        return Ok(());
    };
    let offset = ((nof_bits - 1) % 8) + 1;
    w.pack(u64::from(*top), offset)?;
    rest.iter().rev().try_for_each(|&octet| w.pack(u64::from(octet), 8))
}

fn unpack_bit_content(r: &mut BitReader<'_>, octets: &mut [u8], nof_bits: u32) -> PerResult<()> {
    let Some((top, rest)) = octets.split_last_mut() else {
        return Ok(());
    };
    let offset = ((nof_bits - 1) % 8) + 1;
    *top = r.unpack(offset)? as u8;
    for octet in rest.iter_mut().rev() {
        *octet = r.unpack(8)? as u8;
    }
    Ok(())
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> Pack for BitString<LB, UB, EXT, AL> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let nof_bits = self.len();
        let within = Self::is_within_bounds(nof_bits);
        if EXT {
            w.pack_bit(!within)?;
            if !within {
                pack_length(w, nof_bits, AL)?;
                return pack_bit_content(w, self.octets(), nof_bits);
            }
        } else if !within {
            log::error!("Bit string length {} outside of [{}, {}]", nof_bits, LB, UB);
            return Err(PerError::constraint(nof_bits, LB, UB));
        }
        if LB == UB {
            if AL && LB > UNALIGNED_FIXED_BITS {
                w.align_bytes_zero()?;
            }
        } else if UB == u32::MAX {
            pack_length(w, nof_bits, AL)?;
        } else {
            pack_constrained_length(w, nof_bits, LB, UB, AL)?;
            if AL {
                w.align_bytes_zero()?;
            }
        }
        pack_bit_content(w, self.octets(), nof_bits)
    }
}

impl<const LB: u32, const UB: u32, const EXT: bool, const AL: bool> Unpack for BitString<LB, UB, EXT, AL> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let outside = EXT && r.unpack_bool()?;
        let nof_bits = if outside {
            unpack_length(r, AL)?
        } else if LB == UB {
            if AL && LB > UNALIGNED_FIXED_BITS {
                r.align_bytes()?;
            }
            LB
        } else if UB == u32::MAX {
            unpack_length(r, AL)?
        } else {
            let n = unpack_constrained_length(r, LB, UB, AL)?;
            if AL {
                r.align_bytes()?;
            }
            n
        };
        if nof_bits as usize > r.remaining_bits() {
            log::error!("Bit string of {} bits exceeds the remaining buffer", nof_bits);
            return Err(PerError::DecodeOverflow {
                needed: nof_bits as usize,
                available: r.remaining_bits(),
            });
        }
        self.resize(nof_bits);
        unpack_bit_content(r, self.octets_mut(), nof_bits)
    }
}

/// Per-character layout of a known-multiplier character string (X.691 30)
struct CharLayout {
    bits: u32,
    /// Characters travel as their code rather than as an alphabet offset
    raw: bool,
}

impl CharLayout {
    fn of<A: CharSet>(aligned: bool) -> Self {
        let mut bits = range_bits(u128::from(A::UB - A::LB) + 1);
        if aligned {
            bits = bits.next_power_of_two();
        }
        let raw = u64::from(A::UB) < (1u64 << bits);
        Self { bits, raw }
    }
}

fn string_is_octet_aligned(aligned: bool, alb: u32, aub: u32, bits: u32) -> bool {
    aligned && !(alb == aub && u64::from(aub) * u64::from(bits) <= u64::from(UNALIGNED_FIXED_BITS))
}

impl<A: CharSet, const ALB: u32, const AUB: u32, const EXT: bool, const AL: bool> Pack
    for AsnString<A, ALB, AUB, EXT, AL>
{
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let len = u32::try_from(self.len()).map_err(|_| PerError::Encode("string too long".to_string()))?;
        let within = (ALB..=AUB).contains(&len);
        let layout = CharLayout::of::<A>(AL);
        if EXT {
            w.pack_bit(!within)?;
        } else if !within {
            log::error!("{} length {} outside of [{}, {}]", A::NAME, len, ALB, AUB);
            return Err(PerError::constraint(len, ALB, AUB));
        }
        if !within {
            pack_length(w, len, AL)?;
        } else if ALB != AUB {
            pack_constrained_length(w, len, ALB, AUB, AL)?;
        }
        if string_is_octet_aligned(AL, ALB, AUB, layout.bits) {
            w.align_bytes_zero()?;
        }
        for c in self.as_str().bytes() {
            let code = if layout.raw { c } else { c.wrapping_sub(A::LB) };
            w.pack(u64::from(code), layout.bits)?;
        }
        Ok(())
    }
}

impl<A: CharSet, const ALB: u32, const AUB: u32, const EXT: bool, const AL: bool> Unpack
    for AsnString<A, ALB, AUB, EXT, AL>
{
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let layout = CharLayout::of::<A>(AL);
        let outside = EXT && r.unpack_bool()?;
        let len = if outside {
            unpack_length(r, AL)?
        } else if ALB != AUB {
            unpack_constrained_length(r, ALB, AUB, AL)?
        } else {
            ALB
        };
        if string_is_octet_aligned(AL, ALB, AUB, layout.bits) {
            r.align_bytes()?;
        }
        if len as usize * layout.bits as usize > r.remaining_bits() {
            log::error!("{} of {} characters exceeds the remaining buffer", A::NAME, len);
            return Err(PerError::DecodeOverflow {
                needed: len as usize * layout.bits as usize,
                available: r.remaining_bits(),
            });
        }
        let mut text = String::with_capacity(len as usize);
        for _ in 0..len {
            let code = r.unpack(layout.bits)?;
            let code = if layout.raw { code } else { code + u64::from(A::LB) };
            let c = u8::try_from(code)
                .map(char::from)
                .map_err(|_| PerError::Decode(format!("invalid {} character code {}", A::NAME, code)))?;
            text.push(c);
        }
        *self = Self::from_text(&text).map_err(|e| PerError::Decode(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::unpack_new;
    use ranasn_core::datatypes::{DynBitString, DynOctString, FixedBitString, PrintableString};

    #[test]
    fn test_fixed_octet_string_alignment() {
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        w.pack_bit(true).unwrap();
        FixedOctString::<3, true>::from_octets([1, 2, 3]).pack(&mut w).unwrap();
        assert_eq!(w.finish(), &[0x80, 1, 2, 3]);

        let mut w = BitWriter::new(&mut buf);
        w.pack_bit(true).unwrap();
        FixedOctString::<2, true>::from_octets([0xFF, 0x00]).pack(&mut w).unwrap();
        assert_eq!(w.distance_bits(), 17);
        assert_eq!(&buf[..3], &[0xFF, 0x80, 0x00]);
    }

    #[test]
    fn test_bounded_octet_string() {
        type PlmnId = BoundedOctString<1, 4>;
        let value = PlmnId::from_octets(&[0x02, 0xF8, 0x39]).unwrap();
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        // 2-bit length offset, then three octets unaligned
        assert_eq!(w.distance_bits(), 2 + 24);

        let mut r = BitReader::new(&buf);
        let decoded: PlmnId = unpack_new(&mut r).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.to_hex_string(), "02f839");
    }

    #[test]
    fn test_bounded_octet_string_truncated_input() {
        // length 65535 declared, no content
        let buf = [0xFF, 0xFF];
        let mut r = BitReader::new(&buf);
        let mut value = BoundedOctString::<0, 65535>::from_octets(&[1, 2]).unwrap();
        let err = value.unpack(&mut r).unwrap_err();
        assert!(matches!(err, PerError::DecodeOverflow { needed: 524_280, available: 0 }));
        assert_eq!(value.size(), 0);
    }

    #[test]
    fn test_dyn_octet_string_truncated_input() {
        let value = DynOctString::from_octets(&[0xAA, 0xBB, 0xCC]);
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        assert_eq!(w.finish(), &[0x03, 0xAA, 0xBB, 0xCC]);

        let mut r = BitReader::new(&buf[..3]);
        let err = unpack_new::<DynOctString>(&mut r).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_bit_string_wire_order() {
        let value = FixedBitString::<10>::from_bit_string("1010000011").unwrap();
        let mut buf = [0u8; 2];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        assert_eq!(w.distance_bits(), 10);
        assert_eq!(buf, [0b1010_0000, 0b1100_0000]);

        let mut r = BitReader::new(&buf);
        let decoded: FixedBitString<10> = unpack_new(&mut r).unwrap();
        assert_eq!(decoded.to_bit_string(), "1010000011");
    }

    #[test]
    fn test_extensible_bit_string_outside_root() {
        type Ext = BitString<1, 4, true>;
        let value = Ext::from_bit_string("101100").unwrap();
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        // ext bit, length octet, 6 bits
        assert_eq!(w.distance_bits(), 1 + 8 + 6);

        let mut r = BitReader::new(&buf);
        let decoded: Ext = unpack_new(&mut r).unwrap();
        assert_eq!(decoded.to_bit_string(), "101100");

        let mut w = BitWriter::new(&mut buf);
        assert!(BitString::<1, 4>::with_len(6).pack(&mut w).is_err());
    }

    #[test]
    fn test_dyn_bit_string() {
        let mut value = DynBitString::new();
        value.from_number(0x1F3).unwrap();
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        assert_eq!(w.distance_bits(), 8 + 9);

        let mut r = BitReader::new(&buf);
        let decoded: DynBitString = unpack_new(&mut r).unwrap();
        assert_eq!(decoded.to_number().unwrap(), 0x1F3);
    }

    #[test]
    fn test_printable_string() {
        type Name = PrintableString<1, 150>;
        let value = Name::from_text("gnb-1").unwrap();
        let mut buf = [0u8; 16];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        // 8-bit constrained length, 7 bits per character
        assert_eq!(w.distance_bits(), 8 + 5 * 7);

        let mut r = BitReader::new(&buf);
        let decoded: Name = unpack_new(&mut r).unwrap();
        assert_eq!(decoded.as_str(), "gnb-1");

        let mut w = BitWriter::new(&mut buf);
        assert!(Name::default().pack(&mut w).is_err());
    }

    #[test]
    fn test_aligned_printable_string_uses_octets() {
        type Name = AsnString<ranasn_core::datatypes::Printable, 1, 150, true, true>;
        let value = Name::from_text("ab").unwrap();
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        // ext bit, 8-bit length offset, then octet-aligned characters
        assert_eq!(w.finish(), &[0x00, 0x80, b'a', b'b']);
    }
}
