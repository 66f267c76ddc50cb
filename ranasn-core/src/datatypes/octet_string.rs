//! Octet string types
//!
//! Three flavours, matching the three ways an `OCTET STRING` can be
//! constrained in a protocol module:
//!
//! - [`FixedOctString`] - `SIZE (N)`, stored inline, no length on the wire
//! - [`BoundedOctString`] - `SIZE (LB..UB)`, small-buffer storage
//! - [`UnboundedOctString`] - no size constraint, heap storage
//!
//! All of them offer a hex text view (`"014477aaff"`) and a big-endian
//! numeric view for strings of up to eight octets.

use super::{hex_to_octets, number_to_octets, octets_to_hex, octets_to_number};
use crate::containers::{DynArray, ExtArray};
use crate::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Octet string of exactly `N` octets
///
/// `AL` selects the aligned PER variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedOctString<const N: usize, const AL: bool = false> {
    octets: [u8; N],
}

impl<const N: usize, const AL: bool> Default for FixedOctString<N, AL> {
    fn default() -> Self {
        Self { octets: [0; N] }
    }
}

impl<const N: usize, const AL: bool> FixedOctString<N, AL> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_octets(octets: [u8; N]) -> Self {
        Self { octets }
    }

    /// Number of octets, always `N`
    pub fn size(&self) -> usize {
        N
    }

    pub fn to_hex_string(&self) -> String {
        octets_to_hex(&self.octets)
    }

    /// Parse exactly `2 * N` hex digits
    pub fn from_hex_string(text: &str) -> PerResult<Self> {
        let octets = hex_to_octets(text)?;
        let octets: [u8; N] = octets.try_into().map_err(|v: Vec<u8>| {
            log::error!("Fixed octet string of {} octets cannot hold {} octets", N, v.len());
            PerError::InvalidValue(format!("expected {} octets, got {}", N, v.len()))
        })?;
        Ok(Self { octets })
    }

    pub fn to_number(&self) -> PerResult<u64> {
        octets_to_number(&self.octets)
    }

    /// Big-endian number padded with leading zero octets to `N` octets
    pub fn from_number(value: u64) -> PerResult<Self> {
        let minimal = number_to_octets(value);
        if minimal.len() > N {
            log::error!("Number {} does not fit in {} octets", value, N);
            return Err(PerError::InvalidValue(format!("{} does not fit in {} octets", value, N)));
        }
        let mut octets = [0u8; N];
        octets[N - minimal.len()..].copy_from_slice(&minimal);
        Ok(Self { octets })
    }
}

impl<const N: usize, const AL: bool> Deref for FixedOctString<N, AL> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.octets
    }
}

impl<const N: usize, const AL: bool> DerefMut for FixedOctString<N, AL> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.octets
    }
}

/// Octet string with `LB <= length <= UB`
///
/// New strings hold `LB` zero octets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedOctString<const LB: u32, const UB: u32, const AL: bool = false> {
    octets: ExtArray<u8, 32>,
}

impl<const LB: u32, const UB: u32, const AL: bool> Default for BoundedOctString<LB, UB, AL> {
    fn default() -> Self {
        Self {
            octets: ExtArray::with_len(LB as usize),
        }
    }
}

impl<const LB: u32, const UB: u32, const AL: bool> BoundedOctString<LB, UB, AL> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `octets`, checking the size constraint
    pub fn from_octets(octets: &[u8]) -> PerResult<Self> {
        check_size(octets.len(), LB, UB)?;
        Ok(Self {
            octets: ExtArray::from_slice(octets),
        })
    }

    pub fn size(&self) -> usize {
        self.octets.len()
    }

    /// Resize, zero-filling new octets
    pub fn resize(&mut self, len: usize) {
        self.octets.resize(len);
    }

    pub fn to_hex_string(&self) -> String {
        octets_to_hex(&self.octets)
    }

    pub fn from_hex_string(text: &str) -> PerResult<Self> {
        Self::from_octets(&hex_to_octets(text)?)
    }

    pub fn to_number(&self) -> PerResult<u64> {
        octets_to_number(&self.octets)
    }

    /// Minimal big-endian encoding of `value`, padded up to `LB` octets
    pub fn from_number(value: u64) -> PerResult<Self> {
        let mut octets = number_to_octets(value);
        if octets.len() < LB as usize {
            let mut padded = vec![0u8; LB as usize - octets.len()];
            padded.append(&mut octets);
            octets = padded;
        }
        Self::from_octets(&octets)
    }
}

impl<const LB: u32, const UB: u32, const AL: bool> Deref for BoundedOctString<LB, UB, AL> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.octets
    }
}

impl<const LB: u32, const UB: u32, const AL: bool> DerefMut for BoundedOctString<LB, UB, AL> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.octets
    }
}

/// Octet string without size constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnboundedOctString<const AL: bool = false> {
    octets: DynArray<u8>,
}

/// Unaligned unbounded octet string, the usual RRC `OCTET STRING`
pub type DynOctString = UnboundedOctString<false>;

impl<const AL: bool> UnboundedOctString<AL> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_octets(octets: &[u8]) -> Self {
        Self {
            octets: DynArray::from_slice(octets),
        }
    }

    pub fn size(&self) -> usize {
        self.octets.len()
    }

    /// Resize, zero-filling new octets
    pub fn resize(&mut self, len: usize) {
        self.octets.resize(len);
    }

    pub fn to_hex_string(&self) -> String {
        octets_to_hex(&self.octets)
    }

    pub fn from_hex_string(text: &str) -> PerResult<Self> {
        Ok(Self::from_octets(&hex_to_octets(text)?))
    }

    pub fn to_number(&self) -> PerResult<u64> {
        octets_to_number(&self.octets)
    }

    pub fn from_number(value: u64) -> Self {
        Self::from_octets(&number_to_octets(value))
    }
}

impl<const AL: bool> Deref for UnboundedOctString<AL> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.octets
    }
}

impl<const AL: bool> DerefMut for UnboundedOctString<AL> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.octets
    }
}

fn check_size(len: usize, lb: u32, ub: u32) -> PerResult<()> {
    if len < lb as usize || len > ub as usize {
        log::error!("Octet string length {} outside of [{}, {}]", len, lb, ub);
        return Err(PerError::constraint(len as u64, lb, ub));
    }
    Ok(())
}

macro_rules! impl_hex_display {
    ($name:ident < $($param:ident : $ty:ty),* >) => {
        impl<$(const $param: $ty),*> fmt::Display for $name<$($param),*> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex_string())
            }
        }

        impl<$(const $param: $ty),*> Serialize for $name<$($param),*> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex_string())
            }
        }
    };
}

impl_hex_display!(FixedOctString<N: usize, AL: bool>);
impl_hex_display!(BoundedOctString<LB: u32, UB: u32, AL: bool>);
impl_hex_display!(UnboundedOctString<AL: bool>);
