//! ENUMERATED codec (X.691 14)
//!
//! ```text
//! no extension marker:  [ index : range_bits(nof_types) ]
//! extension marker:     [ 0 | index : range_bits(nof_root) ]
//!                       [ 1 | nsnnwn(index - nof_root) ]
//! ```
//!
//! `nof_types` counts every value known locally, root and extensions;
//! `nof_root = nof_types - nof_exts`. An extension index beyond what this
//! build knows is still decoded and reported as
//! [`EnumIndex::UnknownExtension`] so a newer peer does not make decoding
//! fail.

use crate::bit_ref::{BitReader, BitWriter, range_bits};
use crate::traits::{ItemPacker, Pack, Unpack};
use crate::whole_number::{pack_nsnnwn, unpack_nsnnwn};
use ranasn_core::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// Result of decoding an enumeration index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumIndex {
    /// Index of a value known to this build
    Known(u32),
    /// Extension value beyond `nof_types`, not among the known options
    UnknownExtension(u32),
}

impl EnumIndex {
    pub fn index(&self) -> u32 {
        match self {
            EnumIndex::Known(idx) | EnumIndex::UnknownExtension(idx) => *idx,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, EnumIndex::Known(_))
    }
}

fn nof_root(nof_types: u32, nof_exts: u32) -> PerResult<u32> {
    nof_types
        .checked_sub(nof_exts)
        .filter(|&root| root > 0)
        .ok_or_else(|| PerError::Encode(format!("invalid enumeration shape {}/{}", nof_types, nof_exts)))
}

/// Encode an enumeration index
///
/// # Arguments
/// * `idx` - Index of the value, root values first
/// * `nof_types` - Number of known values, root and extensions
/// * `nof_exts` - Number of known extension values
/// * `has_ext` - Whether the type carries an extension marker
///
/// # Error Handling
/// Returns `ConstraintViolation` if `idx >= nof_types`.
pub fn pack_enum(w: &mut BitWriter<'_>, idx: u32, nof_types: u32, nof_exts: u32, has_ext: bool) -> PerResult<()> {
    if idx >= nof_types {
        log::error!(
            "The provided enum is not within the range of possible values ({}>={})",
            idx,
            nof_types
        );
        return Err(PerError::constraint(idx, 0u32, nof_types.saturating_sub(1)));
    }
    pack_enum_index(w, idx, nof_types, nof_exts, has_ext)
}

/// Encode an index without checking it against `nof_types`
///
/// Used to re-encode an extension value that was decoded as unknown.
fn pack_enum_index(w: &mut BitWriter<'_>, idx: u32, nof_types: u32, nof_exts: u32, has_ext: bool) -> PerResult<()> {
    if !has_ext {
        return w.pack(u64::from(idx), range_bits(u128::from(nof_types)));
    }
    let root = nof_root(nof_types, nof_exts)?;
    let is_ext = idx >= root;
    w.pack_bit(is_ext)?;
    if is_ext {
        pack_nsnnwn(w, u64::from(idx - root), false)
    } else {
        w.pack(u64::from(idx), range_bits(u128::from(root)))
    }
}

/// Decode an enumeration index
///
/// # Returns
/// * `Ok(EnumIndex::Known(idx))` for values this build knows
/// * `Ok(EnumIndex::UnknownExtension(idx))` for extension values beyond `nof_types`
///
/// # Error Handling
/// A root value outside the root range is `Decode`, because no valid
/// encoder can produce it.
pub fn unpack_enum(r: &mut BitReader<'_>, nof_types: u32, nof_exts: u32, has_ext: bool) -> PerResult<EnumIndex> {
    let (idx, extended) = if has_ext {
        let root = nof_root(nof_types, nof_exts).map_err(|e| PerError::Decode(e.to_string()))?;
        if r.unpack_bool()? {
            let offset = unpack_nsnnwn(r, false)?;
            let idx = u32::try_from(offset)
                .ok()
                .and_then(|o| o.checked_add(root))
                .ok_or_else(|| PerError::Decode(format!("enumeration extension index {} too large", offset)))?;
            (idx, true)
        } else {
            let idx = r.unpack(range_bits(u128::from(root)))? as u32;
            if idx >= root {
                log::error!("The provided enum is not within the range of possible values ({}>={})", idx, root);
                return Err(PerError::Decode(format!("enumeration root index {} >= {}", idx, root)));
            }
            (idx, false)
        }
    } else {
        (r.unpack(range_bits(u128::from(nof_types)))? as u32, false)
    };
    if idx < nof_types {
        return Ok(EnumIndex::Known(idx));
    }
    if extended {
        log::warn!("Unknown enumeration extension value {} (known values: {})", idx, nof_types);
        return Ok(EnumIndex::UnknownExtension(idx));
    }
    log::error!("The provided enum is not within the range of possible values ({}>={})", idx, nof_types);
    Err(PerError::Decode(format!("enumeration index {} >= {}", idx, nof_types)))
}

/// Compile-time description of an ENUMERATED type
///
/// # Example
/// ```rust
/// use ranasn_per::enumerated::EnumOptions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// enum TriggerType {
///     #[default]
///     Periodic,
///     Event,
/// }
///
/// impl EnumOptions for TriggerType {
///     const NAME: &'static str = "TriggerType";
///     const NOF_TYPES: u32 = 2;
///     const HAS_EXT: bool = true;
///
///     fn to_index(&self) -> u32 {
///         *self as u32
///     }
///
///     fn from_index(idx: u32) -> Option<Self> {
///         [Self::Periodic, Self::Event].get(idx as usize).copied()
///     }
///
///     fn to_str(&self) -> &'static str {
///         ["periodic", "event"][*self as usize]
///     }
/// }
///
/// assert_eq!(TriggerType::NOF_ROOT, 2);
/// ```
pub trait EnumOptions: Copy + Sized {
    const NAME: &'static str;
    /// Known values, root and extensions
    const NOF_TYPES: u32;
    const NOF_EXTS: u32 = 0;
    const HAS_EXT: bool = false;
    const NOF_ROOT: u32 = Self::NOF_TYPES - Self::NOF_EXTS;

    fn to_index(&self) -> u32;
    fn from_index(idx: u32) -> Option<Self>;
    fn to_str(&self) -> &'static str;

    /// Numeric meaning of the value (`ms40` -> 40), if it has one
    fn to_number(&self) -> Option<f64> {
        None
    }
}

/// Look a value up by its string name
pub fn enum_from_str<E: EnumOptions>(s: &str) -> Option<E> {
    (0..E::NOF_TYPES)
        .filter_map(E::from_index)
        .find(|e| e.to_str() == s)
}

/// Look a value up by its numeric meaning
pub fn enum_from_number<E: EnumOptions>(n: f64) -> Option<E> {
    (0..E::NOF_TYPES)
        .filter_map(E::from_index)
        .find(|e| e.to_number() == Some(n))
}

pub fn pack_enumerated<E: EnumOptions>(w: &mut BitWriter<'_>, e: &E) -> PerResult<()> {
    pack_enum(w, e.to_index(), E::NOF_TYPES, E::NOF_EXTS, E::HAS_EXT)
}

/// Decode a value that must be known to this build
///
/// An unknown extension value is `Decode` here; use [`Enumerated`] to
/// tolerate it.
pub fn unpack_known_enum<E: EnumOptions>(r: &mut BitReader<'_>) -> PerResult<E> {
    match unpack_enum(r, E::NOF_TYPES, E::NOF_EXTS, E::HAS_EXT)? {
        EnumIndex::Known(idx) => E::from_index(idx)
            .ok_or_else(|| PerError::Decode(format!("{} has no value with index {}", E::NAME, idx))),
        EnumIndex::UnknownExtension(idx) => {
            log::error!("{} extension value {} is not supported", E::NAME, idx);
            Err(PerError::Decode(format!("unknown {} extension value {}", E::NAME, idx)))
        }
    }
}

/// Enumeration value that also represents unknown extension values
///
/// An unknown value re-encodes with the index it was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumerated<E> {
    Known(E),
    UnknownExtension(u32),
}

impl<E: EnumOptions> Enumerated<E> {
    pub fn known(&self) -> Option<E> {
        match self {
            Enumerated::Known(e) => Some(*e),
            Enumerated::UnknownExtension(_) => None,
        }
    }

    pub fn is_unknown_extension(&self) -> bool {
        matches!(self, Enumerated::UnknownExtension(_))
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Enumerated::Known(e) => e.to_str(),
            Enumerated::UnknownExtension(_) => "unknown-extension",
        }
    }
}

impl<E: EnumOptions + Default> Default for Enumerated<E> {
    fn default() -> Self {
        Enumerated::Known(E::default())
    }
}

impl<E> From<E> for Enumerated<E> {
    fn from(e: E) -> Self {
        Enumerated::Known(e)
    }
}

impl<E: EnumOptions> Pack for Enumerated<E> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        match self {
            Enumerated::Known(e) => pack_enumerated(w, e),
            Enumerated::UnknownExtension(idx) => {
                if !E::HAS_EXT || *idx < E::NOF_TYPES {
                    log::error!("{} cannot carry the unknown extension value {}", E::NAME, idx);
                    return Err(PerError::Encode(format!("invalid {} extension value {}", E::NAME, idx)));
                }
                pack_enum_index(w, *idx, E::NOF_TYPES, E::NOF_EXTS, true)
            }
        }
    }
}

impl<E: EnumOptions> Unpack for Enumerated<E> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        *self = match unpack_enum(r, E::NOF_TYPES, E::NOF_EXTS, E::HAS_EXT)? {
            EnumIndex::Known(idx) => Enumerated::Known(
                E::from_index(idx)
                    .ok_or_else(|| PerError::Decode(format!("{} has no value with index {}", E::NAME, idx)))?,
            ),
            EnumIndex::UnknownExtension(idx) => Enumerated::UnknownExtension(idx),
        };
        Ok(())
    }
}

impl<E: EnumOptions> fmt::Display for Enumerated<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enumerated::Known(e) => f.write_str(e.to_str()),
            Enumerated::UnknownExtension(idx) => write!(f, "unknown-extension({})", idx),
        }
    }
}

impl<E: EnumOptions> Serialize for Enumerated<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Item packer for lists of enumerations
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumPacker;

impl<E: EnumOptions> ItemPacker<E> for EnumPacker {
    fn pack_item(&self, w: &mut BitWriter<'_>, item: &E) -> PerResult<()> {
        pack_enumerated(w, item)
    }

    fn unpack_item(&self, r: &mut BitReader<'_>, item: &mut E) -> PerResult<()> {
        *item = unpack_known_enum(r)?;
        Ok(())
    }
}

/// Implement [`Pack`], [`Unpack`] and `Serialize` for a type implementing
/// [`EnumOptions`], for enumerations whose extensions are all known
#[macro_export]
macro_rules! impl_enum_codec {
    ($ty:ty) => {
        impl $crate::traits::Pack for $ty {
            fn pack(&self, w: &mut $crate::bit_ref::BitWriter<'_>) -> $crate::ranasn_core::error::PerResult<()> {
                $crate::enumerated::pack_enumerated(w, self)
            }
        }

        impl $crate::traits::Unpack for $ty {
            fn unpack(&mut self, r: &mut $crate::bit_ref::BitReader<'_>) -> $crate::ranasn_core::error::PerResult<()> {
                *self = $crate::enumerated::unpack_known_enum(r)?;
                Ok(())
            }
        }

        impl $crate::serde::Serialize for $ty {
            fn serialize<S: $crate::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::enumerated::EnumOptions::to_str(self))
            }
        }
    };
}
