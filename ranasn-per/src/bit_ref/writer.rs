//! Encoding cursor

use ranasn_core::error::{PerError, PerResult};

/// Write cursor over a fixed-capacity buffer
///
/// Values are written most significant bit first. The writer never
/// allocates: running out of room is reported as `EncodeOverflow` and the
/// cursor is left where it was.
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    byte_pos: usize,
    bit_offset: u8,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the start of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            byte_pos: 0,
            bit_offset: 0,
        }
    }

    /// Bits written so far
    pub fn distance_bits(&self) -> usize {
        self.byte_pos * 8 + self.bit_offset as usize
    }

    /// Octets touched so far, counting a partially written octet
    pub fn distance_bytes(&self) -> usize {
        self.byte_pos + usize::from(self.bit_offset > 0)
    }

    /// Bits left before the end of the buffer
    pub fn remaining_bits(&self) -> usize {
        self.buf.len() * 8 - self.distance_bits()
    }

    pub fn is_aligned(&self) -> bool {
        self.bit_offset == 0
    }

    fn ensure_room(&self, n_bits: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if n_bits > available {
            log::error!("Buffer size limit was achieved ({} bits needed, {} left)", n_bits, available);
            return Err(PerError::EncodeOverflow {
                needed: n_bits,
                available,
            });
        }
        Ok(())
    }

    /// Write the low `n_bits` of `value`
    ///
    /// # Arguments
    /// * `value` - Value whose low bits are written, higher bits are ignored
    /// * `n_bits` - Field width, at most 64
    ///
    /// # Error Handling
    /// Returns `EncodeOverflow` if the field does not fit in the buffer.
    pub fn pack(&mut self, value: u64, n_bits: u32) -> PerResult<()> {
        if n_bits > 64 {
            log::error!("Invalid field width of {} bits", n_bits);
            return Err(PerError::Encode(format!("field width {} exceeds 64 bits", n_bits)));
        }
        self.ensure_room(n_bits as usize)?;

        let mut remaining = n_bits;
        while remaining > 0 {
            let free = 8 - u32::from(self.bit_offset);
            let take = remaining.min(free);
            let chunk = ((value >> (remaining - take)) & ((1u64 << take) - 1)) as u8;
            let kept = self.buf[self.byte_pos] & !(0xFFu8 >> self.bit_offset);
            self.buf[self.byte_pos] = kept | (chunk << (free - take));

            self.bit_offset += take as u8;
            if self.bit_offset == 8 {
                self.bit_offset = 0;
                self.byte_pos += 1;
            }
            remaining -= take;
        }
        Ok(())
    }

    pub fn pack_bit(&mut self, bit: bool) -> PerResult<()> {
        self.pack(u64::from(bit), 1)
    }

    /// Write whole octets, with a straight copy when already aligned
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> PerResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.ensure_room(bytes.len() * 8)?;
        if self.is_aligned() {
            self.buf[self.byte_pos..self.byte_pos + bytes.len()].copy_from_slice(bytes);
            self.byte_pos += bytes.len();
            return Ok(());
        }
        for &byte in bytes {
            self.pack(u64::from(byte), 8)?;
        }
        Ok(())
    }

    /// Zero-fill up to the next octet boundary
    pub fn align_bytes_zero(&mut self) -> PerResult<()> {
        if self.is_aligned() {
            return Ok(());
        }
        let pad = 8 - u32::from(self.bit_offset);
        self.pack(0, pad)
    }

    /// Written part of the buffer, the last octet possibly partial
    pub fn as_written(&self) -> &[u8] {
        &self.buf[..self.distance_bytes()]
    }

    /// Consume the writer, returning the written part of the buffer
    pub fn finish(self) -> &'a [u8] {
        let len = self.distance_bytes();
        let buf: &'a [u8] = self.buf;
        &buf[..len]
    }
}
