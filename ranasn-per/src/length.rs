//! Length determinants (X.691 10.9)
//!
//! Unconstrained lengths use the short forms only:
//!
//! ```text
//! 0xxxxxxx                   n < 128
//! 10xxxxxx xxxxxxxx          n < 16384
//! 11xxxxxx                   fragmented, not supported
//! ```
//!
//! Constrained lengths with an upper bound below 64K are plain constrained
//! whole numbers.

use crate::bit_ref::{BitReader, BitWriter};
use crate::whole_number::{pack_constrained_whole_number, unpack_constrained_whole_number};
use ranasn_core::error::{PerError, PerResult};

/// Largest length a single unfragmented determinant can carry
pub const MAX_UNFRAGMENTED_LENGTH: u32 = 16383;

/// Bounds at or above this are encoded like an unconstrained length
const CONSTRAINED_LENGTH_LIMIT: u32 = 65536;

/// Encode an unconstrained length determinant
///
/// In the aligned variant the determinant starts on an octet boundary.
///
/// # Error Handling
/// Lengths above 16383 would need fragmentation and return `Encode`.
pub fn pack_length(w: &mut BitWriter<'_>, n: u32, aligned: bool) -> PerResult<()> {
    if aligned {
        w.align_bytes_zero()?;
    }
    if n < 128 {
        w.pack(u64::from(n), 8)
    } else if n <= MAX_UNFRAGMENTED_LENGTH {
        w.pack(0x8000 | u64::from(n), 16)
    } else {
        log::error!("Not handling sizes longer than {} octets", MAX_UNFRAGMENTED_LENGTH);
        Err(PerError::Encode(format!("length {} requires fragmentation", n)))
    }
}

pub fn unpack_length(r: &mut BitReader<'_>, aligned: bool) -> PerResult<u32> {
    if aligned {
        r.align_bytes()?;
    }
    if !r.unpack_bool()? {
        return Ok(r.unpack(7)? as u32);
    }
    if r.unpack_bool()? {
        log::error!("Not handling fragmented lengths");
        return Err(PerError::Decode("fragmented length determinant".to_string()));
    }
    let n = r.unpack(14)? as u32;
    if n < 128 {
        log::error!("Length {} encoded in its two-octet form", n);
        return Err(PerError::Decode(format!("non-canonical length determinant {}", n)));
    }
    Ok(n)
}

/// Encode a length constrained to `[lb, ub]`
pub fn pack_constrained_length(w: &mut BitWriter<'_>, n: u32, lb: u32, ub: u32, aligned: bool) -> PerResult<()> {
    if ub >= CONSTRAINED_LENGTH_LIMIT {
        if n < lb || n > ub {
            log::error!("The condition lb <= n <= ub ({} <= {} <= {}) was not met", lb, n, ub);
            return Err(PerError::constraint(n, lb, ub));
        }
        return pack_length(w, n, aligned);
    }
    pack_constrained_whole_number(w, i64::from(n), i64::from(lb), i64::from(ub), aligned)
}

pub fn unpack_constrained_length(r: &mut BitReader<'_>, lb: u32, ub: u32, aligned: bool) -> PerResult<u32> {
    if ub >= CONSTRAINED_LENGTH_LIMIT {
        let n = unpack_length(r, aligned)?;
        if n < lb || n > ub {
            log::error!("Decoded length {} outside of [{}, {}]", n, lb, ub);
            return Err(PerError::Decode(format!("length {} outside of [{}, {}]", n, lb, ub)));
        }
        return Ok(n);
    }
    let n = unpack_constrained_whole_number(r, i64::from(lb), i64::from(ub), aligned)?;
    Ok(n as u32)
}
