//! Variable-length fields (open types, X.691 11.2)
//!
//! A variable-length field is an unconstrained length determinant followed
//! by that many octets of content. It wraps extension groups, extension
//! choice alternatives and the value of protocol IEs, and is what lets an
//! older decoder skip content it does not understand.
//!
//! ```text
//! encode:  content -> scratch buffer -> pad to octet -> [ length ][ octets ]
//! decode:  [ length ][ octets ] -> sub-reader -> content, tail skipped
//! ```

use crate::bit_ref::{BitReader, BitWriter};
use crate::length::{pack_length, unpack_length, MAX_UNFRAGMENTED_LENGTH};
use ranasn_core::error::{PerError, PerResult};

/// Encode `content` as a variable-length field
///
/// The content is produced into a scratch buffer no larger than the space
/// left in `w` and no larger than a single unfragmented length determinant.
/// Empty content is carried as a single zero octet.
///
/// # Arguments
/// * `w` - Destination cursor
/// * `aligned` - Use the aligned PER variant for the length determinant
/// * `content` - Packs the field's content into the scratch cursor
///
/// # Example
/// ```rust
/// use ranasn_per::bit_ref::BitWriter;
/// use ranasn_per::ext::pack_varlength_field;
///
/// let mut buf = [0u8; 8];
/// let mut w = BitWriter::new(&mut buf);
/// pack_varlength_field(&mut w, false, |inner| inner.pack(0b101, 3)).unwrap();
/// assert_eq!(w.finish(), &[0x01, 0xA0]);
/// ```
pub fn pack_varlength_field<F>(w: &mut BitWriter<'_>, aligned: bool, content: F) -> PerResult<()>
where
    F: FnOnce(&mut BitWriter<'_>) -> PerResult<()>,
{
    pack_varlength_field_limited(w, aligned, MAX_UNFRAGMENTED_LENGTH as usize, content)
}

/// Same as [`pack_varlength_field`] with an explicit content size limit
///
/// # Error Handling
/// Content that does not fit `max_size` octets fails with
/// `EncodeOverflow`.
pub fn pack_varlength_field_limited<F>(w: &mut BitWriter<'_>, aligned: bool, max_size: usize, content: F) -> PerResult<()>
where
    F: FnOnce(&mut BitWriter<'_>) -> PerResult<()>,
{
    let room = (w.remaining_bits() / 8).min(max_size).min(MAX_UNFRAGMENTED_LENGTH as usize);
    let mut scratch = vec![0u8; room];
    let mut inner = BitWriter::new(&mut scratch);
    content(&mut inner).inspect_err(|e| log::error!("Failed to pack variable-length field: {}", e))?;
    inner.align_bytes_zero()?;
    let octets = inner.finish();
    if octets.is_empty() {
        pack_length(w, 1, aligned)?;
        return w.pack_bytes(&[0]);
    }
    pack_length(w, octets.len() as u32, aligned)?;
    w.pack_bytes(octets)
}

/// Decode a variable-length field with `content`
///
/// The outer cursor always advances by exactly the declared length. Content
/// left unread by `content` belongs to a newer version of the field and is
/// skipped.
///
/// # Error Handling
/// `content` reading past the declared length fails with `DecodeOverflow`.
pub fn unpack_varlength_field<T, F>(r: &mut BitReader<'_>, aligned: bool, content: F) -> PerResult<T>
where
    F: FnOnce(&mut BitReader<'_>) -> PerResult<T>,
{
    let len = unpack_length(r, aligned)? as usize;
    let octets = r.unpack_vec(len).inspect_err(|_| {
        log::error!("Variable-length field of {} octets exceeds the remaining buffer", len);
    })?;
    let mut inner = BitReader::new(&octets);
    let value = content(&mut inner).inspect_err(|e| log::error!("Failed to unpack variable-length field: {}", e))?;
    let unread = len.saturating_sub(inner.distance_bytes());
    if unread > 0 {
        log::debug!("Skipping {} unread octets of a variable-length field", unread);
    }
    Ok(value)
}

/// Skip a variable-length field without decoding it
///
/// # Returns
/// Number of content octets skipped
pub fn skip_varlength_field(r: &mut BitReader<'_>, aligned: bool) -> PerResult<usize> {
    let len = unpack_length(r, aligned)? as usize;
    r.advance_bits(len * 8)?;
    Ok(len)
}

/// Read the raw content octets of a variable-length field
pub fn unpack_open_type_bytes(r: &mut BitReader<'_>, aligned: bool) -> PerResult<Vec<u8>> {
    let len = unpack_length(r, aligned)? as usize;
    r.unpack_vec(len)
}

/// Write raw content octets as a variable-length field
pub fn pack_open_type_bytes(w: &mut BitWriter<'_>, octets: &[u8], aligned: bool) -> PerResult<()> {
    if octets.is_empty() {
        pack_length(w, 1, aligned)?;
        return w.pack_bytes(&[0]);
    }
    let len = u32::try_from(octets.len()).map_err(|_| PerError::Encode("open type too long".to_string()))?;
    pack_length(w, len, aligned)?;
    w.pack_bytes(octets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_one_octet() {
        let mut buf = [0u8; 4];
        let mut w = BitWriter::new(&mut buf);
        pack_varlength_field(&mut w, false, |_| Ok(())).unwrap();
        assert_eq!(w.finish(), &[0x01, 0x00]);
    }

    #[test]
    fn test_unread_tail_is_skipped() {
        // declared length 3, the decoder only understands the first octet
        let buf = [0x03, 0x2A, 0xFF, 0xFF, 0x55];
        let mut r = BitReader::new(&buf);
        let first = unpack_varlength_field(&mut r, false, |inner| inner.unpack(8)).unwrap();
        assert_eq!(first, 0x2A);
        assert_eq!(r.distance_bytes(), 4);
        assert_eq!(r.unpack(8).unwrap(), 0x55);
    }

    #[test]
    fn test_content_past_declared_length_fails() {
        let buf = [0x01, 0x2A, 0xFF];
        let mut r = BitReader::new(&buf);
        let err = unpack_varlength_field(&mut r, false, |inner| inner.unpack(16)).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_scratch_respects_limit() {
        let mut buf = [0u8; 16];
        let mut w = BitWriter::new(&mut buf);
        let err = pack_varlength_field_limited(&mut w, false, 2, |inner| inner.pack_bytes(&[1, 2, 3])).unwrap_err();
        assert!(err.is_encode_failure());
    }

    #[test]
    fn test_skip_and_capture() {
        let mut buf = [0u8; 16];
        let mut w = BitWriter::new(&mut buf);
        pack_open_type_bytes(&mut w, &[0xDE, 0xAD], false).unwrap();
        pack_open_type_bytes(&mut w, &[0xBE, 0xEF], false).unwrap();

        let mut r = BitReader::new(&buf);
        assert_eq!(skip_varlength_field(&mut r, false).unwrap(), 2);
        assert_eq!(unpack_open_type_bytes(&mut r, false).unwrap(), vec![0xBE, 0xEF]);
    }
}
