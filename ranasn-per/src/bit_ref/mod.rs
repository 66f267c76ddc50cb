//! Bit-level cursors over caller-owned buffers
//!
//! PER packs fields back to back without regard for octet boundaries, so
//! every encoder and decoder in this crate works through a cursor that tracks
//! a byte position plus a bit offset inside that byte.
//!
//! ```text
//!  byte 0            byte 1
//! +-+-+-+-+-+-+-+-+ +-+-+-+-+-+-+-+-+
//! |a|a|a|b|b|b|b|b| |b|c|.|.|.|.|.|.|
//! +-+-+-+-+-+-+-+-+ +-+-+-+-+-+-+-+-+
//!  ^ most significant bit is written first
//! ```
//!
//! - [`BitWriter`] packs into a `&mut [u8]` and fails with `EncodeOverflow`
//!   instead of growing the buffer.
//! - [`BitReader`] unpacks from a `&[u8]` and fails with `DecodeOverflow` on
//!   truncated input.
//!
//! Both are created per encode/decode call and never outlive the buffer
//! they borrow.
//!
//! # Invariants
//!
//! - `byte_pos <= buffer.len()`
//! - `bit_offset < 8`, and `bit_offset == 0` whenever `byte_pos == buffer.len()`

pub mod reader;
pub mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;

/// Number of bits needed to encode `range` distinct values, `ceil(log2(range))`
pub fn range_bits(range: u128) -> u32 {
    if range <= 1 { 0 } else { 128 - (range - 1).leading_zeros() }
}
