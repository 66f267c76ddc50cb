//! SEQUENCE OF (X.691 20)
//!
//! Fixed-count lists carry no length on the wire. Other lists carry a
//! length determinant constrained to the declared `[lb, ub]`, followed by
//! the elements in order. Elements are coded either by their own
//! [`Pack`]/[`Unpack`] or by an injected [`ItemPacker`], for lists whose
//! element bounds belong to the list declaration.

use crate::bit_ref::{BitReader, BitWriter};
use crate::length::{pack_constrained_length, pack_length, unpack_constrained_length, unpack_length};
use crate::traits::{ItemPacker, Pack, Packer, Unpack};
use ranasn_core::containers::{Array, Fixed, Heap, SmallBuf, Storage};
use ranasn_core::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Pack the elements of a fixed-count list, no length determinant
pub fn pack_fixed_seq_of<T, P: ItemPacker<T>>(w: &mut BitWriter<'_>, items: &[T], packer: &P) -> PerResult<()> {
    items.iter().try_for_each(|item| packer.pack_item(w, item))
}

pub fn unpack_fixed_seq_of<T, P: ItemPacker<T>>(r: &mut BitReader<'_>, items: &mut [T], packer: &P) -> PerResult<()> {
    items.iter_mut().try_for_each(|item| packer.unpack_item(r, item))
}

fn pack_list_length(w: &mut BitWriter<'_>, len: usize, lb: u32, ub: u32, has_ext: bool, aligned: bool) -> PerResult<()> {
    let len = u32::try_from(len).map_err(|_| PerError::Encode(format!("list of {} elements", len)))?;
    let within = (lb..=ub).contains(&len);
    if has_ext {
        w.pack_bit(!within)?;
        if !within {
            return pack_length(w, len, aligned);
        }
    }
    pack_constrained_length(w, len, lb, ub, aligned)
}

fn unpack_list_length(r: &mut BitReader<'_>, lb: u32, ub: u32, has_ext: bool, aligned: bool) -> PerResult<usize> {
    let outside = has_ext && r.unpack_bool()?;
    let len = if outside {
        unpack_length(r, aligned)?
    } else {
        unpack_constrained_length(r, lb, ub, aligned)?
    };
    Ok(len as usize)
}

/// Pack a length-prefixed list
///
/// # Arguments
/// * `items` - Elements to encode
/// * `lb`, `ub` - Declared size bounds, `ub = u32::MAX` for no upper bound
/// * `has_ext` - Whether the size constraint is extensible
/// * `aligned` - Use the aligned PER variant for the length determinant
/// * `packer` - Element coding strategy
///
/// # Error Handling
/// A length outside `[lb, ub]` is a `ConstraintViolation` unless the size
/// constraint is extensible.
pub fn pack_dyn_seq_of<T, P: ItemPacker<T>>(
    w: &mut BitWriter<'_>,
    items: &[T],
    lb: u32,
    ub: u32,
    has_ext: bool,
    aligned: bool,
    packer: &P,
) -> PerResult<()> {
    pack_list_length(w, items.len(), lb, ub, has_ext, aligned)?;
    pack_fixed_seq_of(w, items, packer)
}

/// Unpack a length-prefixed list into `array`
///
/// # Error Handling
/// If the capacity policy of `array` cannot hold the decoded length the
/// list is rejected with `Decode`. On any error `array` is left empty.
pub fn unpack_dyn_seq_of<S, P>(
    r: &mut BitReader<'_>,
    array: &mut Array<S>,
    lb: u32,
    ub: u32,
    has_ext: bool,
    aligned: bool,
    packer: &P,
) -> PerResult<()>
where
    S: Storage,
    S::Item: Default,
    P: ItemPacker<S::Item>,
{
    array.clear();
    let len = unpack_list_length(r, lb, ub, has_ext, aligned)?;
    if array.max_len().is_some_and(|max| len > max) {
        log::error!("List of {} elements does not fit its container", len);
        return Err(PerError::Decode(format!("list of {} elements exceeds container capacity", len)));
    }
    // Grow with the decoded elements, not with the declared length
    for _ in 0..len {
        let mut item = S::Item::default();
        if let Err(e) = packer.unpack_item(r, &mut item) {
            log::error!("List element {} of {} failed to decode", array.len(), len);
            array.clear();
            return Err(e);
        }
        if array.try_push(item).is_err() {
            array.clear();
            return Err(PerError::Decode(format!("list of {} elements exceeds container capacity", len)));
        }
    }
    Ok(())
}

/// Size bound on the wire, `usize::MAX` meaning "no upper bound"
fn size_bound(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `SEQUENCE (SIZE (LB..UB, ...)) OF T` stored under capacity policy `S`
///
/// ```rust
/// use ranasn_per::seq_of::BoundedSeqOf;
/// use ranasn_per::integer::Integer;
///
/// // SEQUENCE (SIZE (1..maxDRB)) OF DRB-Identity
/// type DrbList = BoundedSeqOf<Integer<1, 32>, 1, 29>;
/// let mut drbs = DrbList::default();
/// drbs.push(Integer::new(5));
/// assert_eq!(drbs.len(), 1);
/// ```
pub struct SeqOf<S: Storage, const LB: usize, const UB: usize, const EXT: bool = false, const AL: bool = false> {
    items: Array<S>,
}

/// Sequence-of on the heap
pub type DynSeqOf<T, const LB: usize, const UB: usize> = SeqOf<Heap<T>, LB, UB, false, false>;
/// Sequence-of with an inline maximum of `UB` elements
pub type BoundedSeqOf<T, const LB: usize, const UB: usize> = SeqOf<Fixed<T, UB>, LB, UB, false, false>;
/// Sequence-of with 8 inline slots, moving to the heap beyond that
pub type ExtSeqOf<T, const LB: usize, const UB: usize> = SeqOf<SmallBuf<T, 8>, LB, UB, false, false>;

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> SeqOf<S, LB, UB, EXT, AL> {
    pub fn new() -> Self {
        Self { items: Array::new() }
    }

    pub fn from_array(items: Array<S>) -> Self {
        Self { items }
    }

    pub fn into_array(self) -> Array<S> {
        self.items
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Default for SeqOf<S, LB, UB, EXT, AL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Clone for SeqOf<S, LB, UB, EXT, AL> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> PartialEq for SeqOf<S, LB, UB, EXT, AL>
where
    S::Item: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> fmt::Debug for SeqOf<S, LB, UB, EXT, AL>
where
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.items, f)
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Deref for SeqOf<S, LB, UB, EXT, AL> {
    type Target = Array<S>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> DerefMut for SeqOf<S, LB, UB, EXT, AL> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> FromIterator<S::Item>
    for SeqOf<S, LB, UB, EXT, AL>
{
    fn from_iter<I: IntoIterator<Item = S::Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<S, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Pack for SeqOf<S, LB, UB, EXT, AL>
where
    S: Storage,
    S::Item: Pack + Unpack,
{
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_dyn_seq_of(w, self.items.as_slice(), size_bound(LB), size_bound(UB), EXT, AL, &Packer)
    }
}

impl<S, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Unpack for SeqOf<S, LB, UB, EXT, AL>
where
    S: Storage,
    S::Item: Pack + Unpack + Default,
{
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        unpack_dyn_seq_of(r, &mut self.items, size_bound(LB), size_bound(UB), EXT, AL, &Packer)
    }
}

impl<S: Storage, const LB: usize, const UB: usize, const EXT: bool, const AL: bool> Serialize for SeqOf<S, LB, UB, EXT, AL>
where
    S::Item: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.items.serialize(serializer)
    }
}
