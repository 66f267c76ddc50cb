//! Typed `INTEGER` values and integer item packers

use crate::bit_ref::{BitReader, BitWriter};
use crate::traits::{ItemPacker, Pack, Unpack};
use crate::whole_number::{pack_integer, unpack_integer};
use ranasn_core::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;

/// `INTEGER (LB..UB)` with optional extension marker
///
/// `LB = i64::MIN` / `UB = i64::MAX` leave the corresponding side
/// unconstrained. Without `EXT` the value must stay inside the bounds for
/// encoding to succeed; with `EXT`, values outside take the extension path.
///
/// ```rust
/// use ranasn_per::integer::Integer;
///
/// // RANfunctionID ::= INTEGER (0..4095)
/// type RanFunctionId = Integer<0, 4095>;
/// let id = RanFunctionId::new(147);
/// assert_eq!(id.value(), 147);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Integer<const LB: i64, const UB: i64, const EXT: bool = false, const AL: bool = false>(i64);

/// Unconstrained `INTEGER`
pub type UnconstrainedInteger = Integer<{ i64::MIN }, { i64::MAX }, false, false>;

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> Integer<LB, UB, EXT, AL> {
    pub const LOWER_BOUND: i64 = LB;
    pub const UPPER_BOUND: i64 = UB;

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Build a value, rejecting it if it is outside the root range of a
    /// non-extensible type
    pub fn try_new(value: i64) -> PerResult<Self> {
        if !EXT && !(LB..=UB).contains(&value) {
            log::error!("Integer {} outside of [{}, {}]", value, LB, UB);
            return Err(PerError::constraint(value, LB, UB));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn set(&mut self, value: i64) {
        self.0 = value;
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> Default for Integer<LB, UB, EXT, AL> {
    fn default() -> Self {
        Self(if LB == i64::MIN { 0 } else { LB })
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> From<i64> for Integer<LB, UB, EXT, AL> {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> Pack for Integer<LB, UB, EXT, AL> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_integer(w, self.0, LB, UB, EXT, AL)
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> Unpack for Integer<LB, UB, EXT, AL> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.0 = unpack_integer(r, LB, UB, EXT, AL)?;
        Ok(())
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> fmt::Display for Integer<LB, UB, EXT, AL> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const LB: i64, const UB: i64, const EXT: bool, const AL: bool> Serialize for Integer<LB, UB, EXT, AL> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

/// Item packer for lists of plain integers with list-level bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerPacker {
    pub lb: i64,
    pub ub: i64,
    pub has_ext: bool,
    pub aligned: bool,
}

impl IntegerPacker {
    pub fn new(lb: i64, ub: i64, has_ext: bool) -> Self {
        Self {
            lb,
            ub,
            has_ext,
            aligned: false,
        }
    }

    pub fn aligned(mut self) -> Self {
        self.aligned = true;
        self
    }
}

impl<T> ItemPacker<T> for IntegerPacker
where
    T: Copy + Into<i64> + TryFrom<i64>,
{
    fn pack_item(&self, w: &mut BitWriter<'_>, item: &T) -> PerResult<()> {
        pack_integer(w, (*item).into(), self.lb, self.ub, self.has_ext, self.aligned)
    }

    fn unpack_item(&self, r: &mut BitReader<'_>, item: &mut T) -> PerResult<()> {
        let n = unpack_integer(r, self.lb, self.ub, self.has_ext, self.aligned)?;
        *item = T::try_from(n).map_err(|_| {
            log::error!("Decoded integer {} does not fit the element type", n);
            PerError::Decode(format!("integer {} does not fit the element type", n))
        })?;
        Ok(())
    }
}

/// Item packer writing each element as a fixed-width bit field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPacker {
    pub nof_bits: u32,
}

impl BitPacker {
    pub fn new(nof_bits: u32) -> Self {
        Self { nof_bits }
    }
}

impl<T> ItemPacker<T> for BitPacker
where
    T: Copy + Into<u64> + TryFrom<u64>,
{
    fn pack_item(&self, w: &mut BitWriter<'_>, item: &T) -> PerResult<()> {
        w.pack((*item).into(), self.nof_bits)
    }

    fn unpack_item(&self, r: &mut BitReader<'_>, item: &mut T) -> PerResult<()> {
        let n = r.unpack(self.nof_bits)?;
        *item = T::try_from(n).map_err(|_| PerError::Decode(format!("{} does not fit the element type", n)))?;
        Ok(())
    }
}
