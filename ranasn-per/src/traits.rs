//! Value contract shared by every PER type
//!
//! A protocol message is a tree of values that all implement [`Pack`] and
//! [`Unpack`]. Composite types implement them by calling their children in
//! declaration order and returning the first failure with `?`.
//!
//! Decoding is in place: `unpack` overwrites a value that already exists,
//! usually one obtained from `Default`. This lets a caller pre-select the
//! object set or extension state of a value before decoding into it.

use crate::bit_ref::{BitReader, BitWriter};
use ranasn_core::error::PerResult;

/// Encode a value into a bit cursor
pub trait Pack {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()>;
}

/// Decode a value in place from a bit cursor
pub trait Unpack {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()>;
}

/// Encoding strategy for the elements of a sequence-of
///
/// Lets a list of plain integers or enumerations be coded with bounds that
/// belong to the list declaration rather than to the element type.
pub trait ItemPacker<T> {
    fn pack_item(&self, w: &mut BitWriter<'_>, item: &T) -> PerResult<()>;
    fn unpack_item(&self, r: &mut BitReader<'_>, item: &mut T) -> PerResult<()>;
}

/// Item packer delegating to the element's own [`Pack`]/[`Unpack`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Packer;

impl<T: Pack + Unpack> ItemPacker<T> for Packer {
    fn pack_item(&self, w: &mut BitWriter<'_>, item: &T) -> PerResult<()> {
        item.pack(w)
    }

    fn unpack_item(&self, r: &mut BitReader<'_>, item: &mut T) -> PerResult<()> {
        item.unpack(r)
    }
}

/// Decode a fresh value of type `T`
pub fn unpack_new<T: Unpack + Default>(r: &mut BitReader<'_>) -> PerResult<T> {
    let mut value = T::default();
    value.unpack(r)?;
    Ok(value)
}

/// ASN.1 `NULL`, which occupies no bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Null;

impl Pack for Null {
    fn pack(&self, _w: &mut BitWriter<'_>) -> PerResult<()> {
        Ok(())
    }
}

impl Unpack for Null {
    fn unpack(&mut self, _r: &mut BitReader<'_>) -> PerResult<()> {
        Ok(())
    }
}

impl serde::Serialize for Null {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl Pack for bool {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        w.pack_bit(*self)
    }
}

impl Unpack for bool {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        *self = r.unpack_bool()?;
        Ok(())
    }
}

impl<T: Pack + ?Sized> Pack for Box<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        (**self).pack(w)
    }
}

impl<T: Unpack + ?Sized> Unpack for Box<T> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        (**self).unpack(r)
    }
}

/// `SEQUENCE (SIZE (N)) OF T`, no length on the wire
impl<T: Pack, const N: usize> Pack for [T; N] {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        self.iter().try_for_each(|item| item.pack(w))
    }
}

impl<T: Unpack, const N: usize> Unpack for [T; N] {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.iter_mut().try_for_each(|item| item.unpack(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_array() {
        let flags = [true, false, true];
        let mut buf = [0u8; 1];
        let mut w = BitWriter::new(&mut buf);
        flags.pack(&mut w).unwrap();
        Null.pack(&mut w).unwrap();
        assert_eq!(w.distance_bits(), 3);
        assert_eq!(buf, [0xA0]);

        let mut r = BitReader::new(&buf);
        let decoded: [bool; 3] = unpack_new(&mut r).unwrap();
        assert_eq!(decoded, flags);
    }

    #[test]
    fn test_boxed_value() {
        let boxed: Option<Box<bool>> = Some(Box::new(true));
        let mut buf = [0u8; 1];
        let mut w = BitWriter::new(&mut buf);
        if let Some(v) = &boxed {
            v.pack(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let decoded: Box<bool> = unpack_new(&mut r).unwrap();
        assert_eq!(Some(decoded), boxed);
    }
}
