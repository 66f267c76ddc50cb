//! Extension addition groups of an extensible SEQUENCE (X.691 19.7)
//!
//! When the extension bit of a SEQUENCE is set, a presence bitmap follows
//! the root components, then one variable-length field per present group:
//!
//! ```text
//! [ nsnnwn(n - 1) ][ b0 b1 ... bn-1 ][ group i ]... (one open type per set bit)
//! ```
//!
//! The decoder reads the whole bitmap up front. Groups must then be
//! consumed in increasing order; groups this build does not know, and known
//! groups the caller did not ask for, are skipped by [`ExtGroupsUnpacker::finish`].

use super::varlength::{pack_varlength_field, skip_varlength_field, unpack_varlength_field};
use crate::bit_ref::{BitReader, BitWriter};
use crate::whole_number::{pack_nsnnwn, unpack_nsnnwn};
use ranasn_core::error::{PerError, PerResult};

/// Collects the presence of extension groups on encode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtGroupsPacker {
    groups: Vec<bool>,
    aligned: bool,
}

impl ExtGroupsPacker {
    pub fn new(aligned: bool) -> Self {
        Self {
            groups: Vec::new(),
            aligned,
        }
    }

    /// Mark group `idx` as present or absent
    pub fn set(&mut self, idx: usize, present: bool) {
        if idx >= self.groups.len() {
            self.groups.resize(idx + 1, false);
        }
        self.groups[idx] = present;
    }

    pub fn is_present(&self, idx: usize) -> bool {
        self.groups.get(idx).copied().unwrap_or(false)
    }

    /// Whether the SEQUENCE's extension bit must be set
    pub fn any_present(&self) -> bool {
        self.groups.iter().any(|&g| g)
    }

    /// Pack the presence bitmap, trimmed after the last present group
    ///
    /// # Error Handling
    /// Packing a bitmap with no present group is an `Encode` error, since the
    /// extension bit should not have been set.
    pub fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let Some(last) = self.groups.iter().rposition(|&g| g) else {
            log::error!("Extension bit set but no extension group is present");
            return Err(PerError::Encode("no extension group present".to_string()));
        };
        let nof_groups = last + 1;
        pack_nsnnwn(w, (nof_groups - 1) as u64, self.aligned)?;
        self.groups[..nof_groups].iter().try_for_each(|&g| w.pack_bit(g))
    }

    /// Pack the content of one present group as a variable-length field
    pub fn pack_group<F>(&self, w: &mut BitWriter<'_>, content: F) -> PerResult<()>
    where
        F: FnOnce(&mut BitWriter<'_>) -> PerResult<()>,
    {
        pack_varlength_field(w, self.aligned, content)
    }
}

/// Reads the extension presence bitmap and guards group access order
///
/// [`ExtGroupsUnpacker::finish`] must run after the last requested group,
/// otherwise unread groups stay in front of the cursor. Dropping an
/// unfinished unpacker logs a warning.
#[must_use = "call `finish` to skip the extension groups that were not read"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtGroupsUnpacker {
    groups: Vec<bool>,
    nof_supported: usize,
    /// Next group index that may be requested
    next: usize,
    aligned: bool,
}

impl ExtGroupsUnpacker {
    /// # Arguments
    /// * `nof_supported` - Number of extension groups this build knows
    /// * `aligned` - Use the aligned PER variant
    pub fn new(nof_supported: usize, aligned: bool) -> Self {
        Self {
            groups: Vec::new(),
            nof_supported,
            next: 0,
            aligned,
        }
    }

    /// Read the presence bitmap
    pub fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let nof_groups = (unpack_nsnnwn(r, self.aligned)? as usize).saturating_add(1);
        if nof_groups > r.remaining_bits() {
            return Err(PerError::DecodeOverflow {
                needed: nof_groups,
                available: r.remaining_bits(),
            });
        }
        self.groups.clear();
        for _ in 0..nof_groups {
            self.groups.push(r.unpack_bool()?);
        }
        if nof_groups > self.nof_supported {
            log::warn!(
                "Received {} extension groups, {} supported; unknown groups will be skipped",
                nof_groups,
                self.nof_supported
            );
        }
        self.next = 0;
        Ok(())
    }

    /// Number of groups announced by the bitmap
    pub fn nof_groups(&self) -> usize {
        self.groups.len()
    }

    /// Whether group `idx` is present
    ///
    /// Groups must be queried in increasing order, each at most once, and the
    /// content of a present group must be read before the next query.
    ///
    /// # Error Handling
    /// Querying out of order, or skipping over a present group that was
    /// never read, is a `Decode` error.
    pub fn is_present(&mut self, idx: usize) -> PerResult<bool> {
        if idx < self.next {
            log::error!("Extension group {} accessed out of order (next is {})", idx, self.next);
            return Err(PerError::Decode(format!("extension group {} accessed out of order", idx)));
        }
        if let Some(skipped) = (self.next..idx).find(|&i| self.present_at(i)) {
            log::error!("Extension group {} is present but was never read", skipped);
            return Err(PerError::Decode(format!("extension group {} skipped", skipped)));
        }
        self.next = idx + 1;
        Ok(self.present_at(idx))
    }

    /// Decode group `idx` with `content` if it is present
    ///
    /// # Returns
    /// `true` if the group was present and decoded
    pub fn unpack_group<F>(&mut self, r: &mut BitReader<'_>, idx: usize, content: F) -> PerResult<bool>
    where
        F: FnOnce(&mut BitReader<'_>) -> PerResult<()>,
    {
        if !self.is_present(idx)? {
            return Ok(false);
        }
        unpack_varlength_field(r, self.aligned, content)?;
        Ok(true)
    }

    /// Skip every present group that was not read
    pub fn finish(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        for idx in self.next..self.groups.len() {
            if !self.groups[idx] {
                continue;
            }
            if idx < self.nof_supported {
                log::warn!("Skipping extension group {} that was not requested", idx);
            }
            skip_varlength_field(r, self.aligned)?;
        }
        self.next = self.groups.len();
        Ok(())
    }

    /// Whether no present group is left in front of the cursor
    pub fn is_finished(&self) -> bool {
        (self.next..self.groups.len()).all(|idx| !self.groups[idx])
    }

    fn present_at(&self, idx: usize) -> bool {
        self.groups.get(idx).copied().unwrap_or(false)
    }
}

impl Drop for ExtGroupsUnpacker {
    fn drop(&mut self) {
        if !self.is_finished() && !std::thread::panicking() {
            log::warn!(
                "Extension groups unpacker dropped with unread groups after index {}",
                self.next
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed_groups(buf: &mut [u8]) -> usize {
        let mut packer = ExtGroupsPacker::new(false);
        packer.set(0, true);
        packer.set(2, true);
        let mut w = BitWriter::new(buf);
        packer.pack(&mut w).unwrap();
        packer.pack_group(&mut w, |inner| inner.pack(0x11, 8)).unwrap();
        packer.pack_group(&mut w, |inner| inner.pack(0x22, 8)).unwrap();
        w.pack(0x7E, 8).unwrap();
        w.distance_bits()
    }

    #[test]
    fn test_bitmap_layout() {
        let mut buf = [0u8; 16];
        // nsnnwn(2) is 7 bits, then 3 bitmap bits, then two 2-octet fields
        assert_eq!(packed_groups(&mut buf), 7 + 3 + 16 + 16 + 8);
    }

    #[test]
    fn test_older_decoder_skips_unknown_groups() {
        let mut buf = [0u8; 16];
        packed_groups(&mut buf);

        let mut r = BitReader::new(&buf);
        let mut guard = ExtGroupsUnpacker::new(1, false);
        guard.unpack(&mut r).unwrap();
        assert_eq!(guard.nof_groups(), 3);

        let mut first = 0;
        let present = guard
            .unpack_group(&mut r, 0, |inner| {
                first = inner.unpack(8)?;
                Ok(())
            })
            .unwrap();
        assert!(present);
        assert_eq!(first, 0x11);
        assert!(!guard.is_finished());
        guard.finish(&mut r).unwrap();
        assert!(guard.is_finished());
        assert_eq!(r.unpack(8).unwrap(), 0x7E);
    }

    #[test]
    fn test_out_of_order_access_fails() {
        let mut buf = [0u8; 16];
        packed_groups(&mut buf);
        let mut r = BitReader::new(&buf);
        let mut guard = ExtGroupsUnpacker::new(3, false);
        guard.unpack(&mut r).unwrap();

        assert!(guard.is_present(1).unwrap_err().is_decode_failure());
        let mut guard = ExtGroupsUnpacker::new(3, false);
        let mut r = BitReader::new(&buf);
        guard.unpack(&mut r).unwrap();
        assert!(guard.is_present(0).unwrap());
        skip_varlength_field(&mut r, false).unwrap();
        assert!(!guard.is_present(1).unwrap());
        assert!(guard.is_present(0).unwrap_err().is_decode_failure());
    }

    #[test]
    fn test_empty_bitmap_rejected() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        assert!(ExtGroupsPacker::new(false).pack(&mut w).is_err());
    }
}
