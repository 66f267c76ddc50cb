//! CHOICE (X.691 23)
//!
//! A choice is a Rust enum with one variant per alternative. The
//! [`Choice`] trait gives the generic engine what it needs: the alternative
//! count, the active index, and a way to default-construct an alternative
//! by index. Switching alternative replaces the whole value, so the previous
//! alternative is dropped exactly once.
//!
//! ```text
//! root alternative:       [ 0 ][ index : range_bits(nof_root) ][ value ]
//! extension alternative:  [ 1 ][ nsnnwn(index - nof_root) ][ length ][ value ]
//! ```
//!
//! Without an extension marker the leading bit is absent.

use crate::bit_ref::{BitReader, BitWriter};
use crate::enumerated::{EnumIndex, pack_enum, unpack_enum};
use crate::ext::{pack_varlength_field, skip_varlength_field, unpack_varlength_field};
use crate::traits::{Pack, Unpack};
use ranasn_core::error::{PerError, PerResult};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Compile-time description of a CHOICE type
pub trait Choice: Sized {
    const NAME: &'static str;
    /// Alternatives known to this build, root and extensions
    const NOF_TYPES: u32;
    const NOF_EXTS: u32 = 0;
    const HAS_EXT: bool = false;
    const NOF_ROOT: u32 = Self::NOF_TYPES - Self::NOF_EXTS;

    /// Index of the active alternative
    fn index(&self) -> u32;

    /// Default-constructed alternative `idx`, `None` if out of range
    fn with_alternative(idx: u32) -> Option<Self>;

    fn alternative_name(&self) -> &'static str;

    /// Pack the active alternative's value
    fn pack_value(&self, w: &mut BitWriter<'_>) -> PerResult<()>;

    /// Unpack into the active alternative's value
    fn unpack_value(&mut self, r: &mut BitReader<'_>) -> PerResult<()>;
}

/// Make alternative `idx` active
///
/// Selecting the alternative that is already active keeps its value.
/// Selecting another one drops the current value and default-constructs
/// the new alternative.
///
/// # Error Handling
/// An index with no alternative is an `InvalidValue` error and leaves the
/// choice unchanged.
pub fn set_choice<C: Choice>(c: &mut C, idx: u32) -> PerResult<()> {
    if c.index() == idx {
        return Ok(());
    }
    *c = C::with_alternative(idx).ok_or_else(|| {
        log::error!("{} has no alternative with index {}", C::NAME, idx);
        PerError::InvalidValue(format!("{} has no alternative {}", C::NAME, idx))
    })?;
    Ok(())
}

/// Encode a choice: discriminant, then the active alternative
pub fn pack_choice<C: Choice>(w: &mut BitWriter<'_>, c: &C, aligned: bool) -> PerResult<()> {
    let idx = c.index();
    pack_enum(w, idx, C::NOF_TYPES, C::NOF_EXTS, C::HAS_EXT)?;
    if C::HAS_EXT && idx >= C::NOF_ROOT {
        return pack_varlength_field(w, aligned, |inner| c.pack_value(inner));
    }
    c.pack_value(w)
}

/// Decode a choice in place
///
/// # Error Handling
/// An extension alternative unknown to this build is skipped and reported
/// as `Decode`, since the value cannot be represented.
pub fn unpack_choice<C: Choice>(r: &mut BitReader<'_>, c: &mut C, aligned: bool) -> PerResult<()> {
    match unpack_enum(r, C::NOF_TYPES, C::NOF_EXTS, C::HAS_EXT)? {
        EnumIndex::Known(idx) => {
            set_choice(c, idx).map_err(|e| PerError::Decode(e.to_string()))?;
            if C::HAS_EXT && idx >= C::NOF_ROOT {
                unpack_varlength_field(r, aligned, |inner| c.unpack_value(inner))
            } else {
                c.unpack_value(r)
            }
        }
        EnumIndex::UnknownExtension(idx) => {
            skip_varlength_field(r, aligned)?;
            log::error!("{} extension alternative {} is not supported", C::NAME, idx);
            Err(PerError::Decode(format!("unknown {} alternative {}", C::NAME, idx)))
        }
    }
}

/// Report access to an alternative that is not active
pub fn log_invalid_access(choice: &str, requested: &str, active: &str) {
    log::error!(
        "Invalid field access in {}: requested {}, active alternative is {}",
        choice,
        requested,
        active
    );
}

/// `SetupRelease { ElementTypeParam } ::= CHOICE { release NULL, setup ElementTypeParam }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SetupRelease<T> {
    #[default]
    Release,
    Setup(T),
}

impl<T: Default> SetupRelease<T> {
    pub fn is_setup(&self) -> bool {
        matches!(self, SetupRelease::Setup(_))
    }

    /// Setup value, logged and `None` when `release` is active
    pub fn setup(&self) -> Option<&T> {
        match self {
            SetupRelease::Setup(v) => Some(v),
            SetupRelease::Release => {
                log_invalid_access("SetupRelease", "setup", "release");
                None
            }
        }
    }

    pub fn setup_mut(&mut self) -> Option<&mut T> {
        match self {
            SetupRelease::Setup(v) => Some(v),
            SetupRelease::Release => {
                log_invalid_access("SetupRelease", "setup", "release");
                None
            }
        }
    }

    /// Activate `setup`, keeping its value if already active
    pub fn set_setup(&mut self) -> &mut T {
        if let SetupRelease::Release = self {
            *self = SetupRelease::Setup(T::default());
        }
        match self {
            SetupRelease::Setup(v) => v,
            SetupRelease::Release => unreachable!("setup was just activated"),
        }
    }

    pub fn set_release(&mut self) {
        *self = SetupRelease::Release;
    }
}

impl<T: Pack + Unpack + Default> Choice for SetupRelease<T> {
    const NAME: &'static str = "SetupRelease";
    const NOF_TYPES: u32 = 2;

    fn index(&self) -> u32 {
        match self {
            SetupRelease::Release => 0,
            SetupRelease::Setup(_) => 1,
        }
    }

    fn with_alternative(idx: u32) -> Option<Self> {
        match idx {
            0 => Some(SetupRelease::Release),
            1 => Some(SetupRelease::Setup(T::default())),
            _ => None,
        }
    }

    fn alternative_name(&self) -> &'static str {
        match self {
            SetupRelease::Release => "release",
            SetupRelease::Setup(_) => "setup",
        }
    }

    fn pack_value(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        match self {
            SetupRelease::Release => Ok(()),
            SetupRelease::Setup(v) => v.pack(w),
        }
    }

    fn unpack_value(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        match self {
            SetupRelease::Release => Ok(()),
            SetupRelease::Setup(v) => v.unpack(r),
        }
    }
}

impl<T: Pack + Unpack + Default> Pack for SetupRelease<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_choice(w, self, false)
    }
}

impl<T: Pack + Unpack + Default> Unpack for SetupRelease<T> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        unpack_choice(r, self, false)
    }
}

impl<T: Serialize> Serialize for SetupRelease<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            SetupRelease::Release => map.serialize_entry("release", &())?,
            SetupRelease::Setup(v) => map.serialize_entry("setup", v)?,
        }
        map.end()
    }
}

/// Value of an object set without members
///
/// Occupies no bits and has no alternatives to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EmptyChoice;

impl Pack for EmptyChoice {
    fn pack(&self, _w: &mut BitWriter<'_>) -> PerResult<()> {
        Ok(())
    }
}

impl Unpack for EmptyChoice {
    fn unpack(&mut self, _r: &mut BitReader<'_>) -> PerResult<()> {
        Ok(())
    }
}

impl Serialize for EmptyChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::Integer;
    use crate::traits::unpack_new;
    use std::cell::Cell;

    thread_local! {
        static CREATED: Cell<usize> = const { Cell::new(0) };
        static DROPPED: Cell<usize> = const { Cell::new(0) };
    }

    /// Payload counting its constructions and drops
    #[derive(Debug, PartialEq)]
    struct Tracked(u8);

    impl Default for Tracked {
        fn default() -> Self {
            CREATED.with(|c| c.set(c.get() + 1));
            Tracked(0)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            DROPPED.with(|c| c.set(c.get() + 1));
        }
    }

    #[derive(Debug, PartialEq)]
    enum CellConfig {
        Tracked(Tracked),
        Pci(Integer<0, 1007>),
        Name(Integer<0, 7>),
    }

    impl Choice for CellConfig {
        const NAME: &'static str = "CellConfig";
        const NOF_TYPES: u32 = 3;
        const NOF_EXTS: u32 = 1;
        const HAS_EXT: bool = true;

        fn index(&self) -> u32 {
            match self {
                CellConfig::Tracked(_) => 0,
                CellConfig::Pci(_) => 1,
                CellConfig::Name(_) => 2,
            }
        }

        fn with_alternative(idx: u32) -> Option<Self> {
            match idx {
                0 => Some(CellConfig::Tracked(Tracked::default())),
                1 => Some(CellConfig::Pci(Integer::default())),
                2 => Some(CellConfig::Name(Integer::default())),
                _ => None,
            }
        }

        fn alternative_name(&self) -> &'static str {
            ["tracked", "pci", "name"][self.index() as usize]
        }

        fn pack_value(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
            match self {
                CellConfig::Tracked(t) => w.pack(u64::from(t.0), 8),
                CellConfig::Pci(v) => v.pack(w),
                CellConfig::Name(v) => v.pack(w),
            }
        }

        fn unpack_value(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
            match self {
                CellConfig::Tracked(t) => {
                    t.0 = r.unpack(8)? as u8;
                    Ok(())
                }
                CellConfig::Pci(v) => v.unpack(r),
                CellConfig::Name(v) => v.unpack(r),
            }
        }
    }

    #[test]
    fn test_switching_alternatives_drops_once() {
        CREATED.with(|c| c.set(0));
        DROPPED.with(|c| c.set(0));
        {
            let mut c = CellConfig::Pci(Integer::new(1));
            set_choice(&mut c, 0).unwrap();
            set_choice(&mut c, 0).unwrap();
            set_choice(&mut c, 1).unwrap();
            set_choice(&mut c, 0).unwrap();
            assert!(matches!(c, CellConfig::Tracked(Tracked(0))));
            assert!(set_choice(&mut c, 7).is_err());
            assert_eq!(c.index(), 0);
        }
        assert_eq!(CREATED.with(Cell::get), 2);
        assert_eq!(DROPPED.with(Cell::get), 2);
    }

    #[test]
    fn test_every_alternative_defaults() {
        for idx in 0..CellConfig::NOF_TYPES {
            let mut c = CellConfig::Pci(Integer::new(3));
            set_choice(&mut c, idx).unwrap();
            assert_eq!(c.index(), idx);
        }
    }

    #[test]
    fn test_root_and_extension_alternatives() {
        let mut buf = [0u8; 8];
        let mut w = BitWriter::new(&mut buf);
        pack_choice(&mut w, &CellConfig::Pci(Integer::new(1007)), false).unwrap();
        // ext bit, 1-bit index, 10-bit value
        assert_eq!(w.distance_bits(), 1 + 1 + 10);
        let mut r = BitReader::new(&buf);
        let mut c = CellConfig::Name(Integer::new(0));
        unpack_choice(&mut r, &mut c, false).unwrap();
        assert_eq!(c, CellConfig::Pci(Integer::new(1007)));

        let mut w = BitWriter::new(&mut buf);
        pack_choice(&mut w, &CellConfig::Name(Integer::new(5)), false).unwrap();
        // ext bit, nsnnwn(0), length octet, one padded content octet
        assert_eq!(w.finish(), &[0x80, 0x01, 0xA0]);
        let mut r = BitReader::new(&buf);
        unpack_choice(&mut r, &mut c, false).unwrap();
        assert_eq!(c, CellConfig::Name(Integer::new(5)));
    }

    #[test]
    fn test_unknown_extension_alternative() {
        // ext bit, nsnnwn(3) -> index 5, then a one-octet open type
        let buf = [0b1000_0011, 0x01, 0xFF];
        let mut r = BitReader::new(&buf);
        let mut c = CellConfig::Pci(Integer::new(0));
        assert!(unpack_choice(&mut r, &mut c, false).unwrap_err().is_decode_failure());
        assert_eq!(r.distance_bytes(), 3);
    }

    #[test]
    fn test_setup_release() {
        type Timer = SetupRelease<Integer<0, 15>>;
        let mut value = Timer::default();
        assert_eq!(value.setup(), None);
        value.set_setup().set(9);

        let mut buf = [0u8; 2];
        let mut w = BitWriter::new(&mut buf);
        value.pack(&mut w).unwrap();
        assert_eq!(w.distance_bits(), 5);
        let mut r = BitReader::new(&buf);
        let decoded: Timer = unpack_new(&mut r).unwrap();
        assert_eq!(decoded.setup().map(|v| v.value()), Some(9));

        assert_eq!(serde_json::to_string(&decoded).unwrap(), r#"{"setup":9}"#);
        value.set_release();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"release":null}"#);
    }
}
