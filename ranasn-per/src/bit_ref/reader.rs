//! Decoding cursor

use ranasn_core::error::{PerError, PerResult};

/// Read cursor over a received buffer
///
/// Mirror of [`BitWriter`](super::BitWriter): fields are read most
/// significant bit first, and reading past the end is reported as
/// `DecodeOverflow` without moving the cursor.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    byte_pos: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            byte_pos: 0,
            bit_offset: 0,
        }
    }

    /// Bits consumed so far
    pub fn distance_bits(&self) -> usize {
        self.byte_pos * 8 + self.bit_offset as usize
    }

    /// Octets touched so far, counting a partially consumed octet
    pub fn distance_bytes(&self) -> usize {
        self.byte_pos + usize::from(self.bit_offset > 0)
    }

    pub fn remaining_bits(&self) -> usize {
        self.buf.len() * 8 - self.distance_bits()
    }

    pub fn is_aligned(&self) -> bool {
        self.bit_offset == 0
    }

    fn ensure_available(&self, n_bits: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if n_bits > available {
            log::error!("Buffer size limit was achieved ({} bits needed, {} left)", n_bits, available);
            return Err(PerError::DecodeOverflow {
                needed: n_bits,
                available,
            });
        }
        Ok(())
    }

    /// Read an `n_bits` wide field
    ///
    /// # Error Handling
    /// Returns `DecodeOverflow` if fewer than `n_bits` bits are left.
    pub fn unpack(&mut self, n_bits: u32) -> PerResult<u64> {
        if n_bits > 64 {
            log::error!("Invalid field width of {} bits", n_bits);
            return Err(PerError::Decode(format!("field width {} exceeds 64 bits", n_bits)));
        }
        self.ensure_available(n_bits as usize)?;

        let mut value = 0u64;
        let mut remaining = n_bits;
        while remaining > 0 {
            let free = 8 - u32::from(self.bit_offset);
            let take = remaining.min(free);
            let chunk = (self.buf[self.byte_pos] >> (free - take)) & (0xFFu8 >> (8 - take));
            value = (value << take) | u64::from(chunk);

            self.bit_offset += take as u8;
            if self.bit_offset == 8 {
                self.bit_offset = 0;
                self.byte_pos += 1;
            }
            remaining -= take;
        }
        Ok(value)
    }

    pub fn unpack_bool(&mut self) -> PerResult<bool> {
        Ok(self.unpack(1)? == 1)
    }

    /// Fill `out` with whole octets
    pub fn unpack_bytes(&mut self, out: &mut [u8]) -> PerResult<()> {
        if out.is_empty() {
            return Ok(());
        }
        self.ensure_available(out.len() * 8)?;
        if self.is_aligned() {
            out.copy_from_slice(&self.buf[self.byte_pos..self.byte_pos + out.len()]);
            self.byte_pos += out.len();
            return Ok(());
        }
        for byte in out.iter_mut() {
            *byte = self.unpack(8)? as u8;
        }
        Ok(())
    }

    /// Read `len` octets into a new vector
    pub fn unpack_vec(&mut self, len: usize) -> PerResult<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.unpack_bytes(&mut out)?;
        Ok(out)
    }

    /// Skip to the next octet boundary
    pub fn align_bytes(&mut self) -> PerResult<()> {
        if self.is_aligned() {
            return Ok(());
        }
        self.advance_bits(8 - self.bit_offset as usize)
    }

    /// Skip `n_bits` without reading them
    pub fn advance_bits(&mut self, n_bits: usize) -> PerResult<()> {
        self.ensure_available(n_bits)?;
        let target = self.distance_bits() + n_bits;
        self.byte_pos = target / 8;
        self.bit_offset = (target % 8) as u8;
        Ok(())
    }
}
