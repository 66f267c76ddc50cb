//! Extension framework
//!
//! - [`groups`]: presence bitmap of extension addition groups
//! - [`varlength`]: length-wrapped fields that older decoders can skip
//! - unsupported extension flags, for types whose extensions this build
//!   does not implement

pub mod groups;
pub mod varlength;

pub use groups::{ExtGroupsPacker, ExtGroupsUnpacker};
pub use varlength::{
    pack_open_type_bytes, pack_varlength_field, pack_varlength_field_limited, skip_varlength_field,
    unpack_open_type_bytes, unpack_varlength_field,
};

use crate::bit_ref::{BitReader, BitWriter};
use ranasn_core::error::{PerError, PerResult};

/// Pack the extension bit of a type whose extensions are not supported
///
/// # Error Handling
/// A set extension bit is written, then reported as `Encode`.
pub fn pack_unsupported_ext_flag(w: &mut BitWriter<'_>, ext: bool) -> PerResult<()> {
    w.pack_bit(ext)?;
    if ext {
        log::error!("ASN.1 extensions not currently supported");
        return Err(PerError::Encode("extension not supported".to_string()));
    }
    Ok(())
}

/// Unpack the extension bit of a type whose extensions are not supported
pub fn unpack_unsupported_ext_flag(r: &mut BitReader<'_>) -> PerResult<bool> {
    let ext = r.unpack_bool()?;
    if ext {
        log::error!("ASN.1 extensions not currently supported");
        return Err(PerError::Decode("extension not supported".to_string()));
    }
    Ok(ext)
}
