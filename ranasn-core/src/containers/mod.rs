//! Backing containers for string and list types
//!
//! Every variable-length value of the codec (octet strings, bit strings,
//! sequence-of lists, extension bitmaps) stores its elements in an [`Array`].
//! The array itself only knows about length and element access; how memory is
//! obtained is decided by its capacity policy, the [`Storage`] parameter.
//!
//! # Capacity Policies
//!
//! | Policy            | Storage          | Growth                                        |
//! |-------------------|------------------|-----------------------------------------------|
//! | [`Heap`]          | `Vec<T>`         | new capacity = max(requested, 2 x length)     |
//! | [`Fixed`]         | inline, N slots  | never grows; overflow is logged and ignored   |
//! | [`SmallBuf`]      | inline, then heap | moves to the heap once, never moves back     |
//!
//! Lists whose protocol upper bound is small (maxDRB, maxSCell ...) use
//! [`Fixed`]. Lists with a large declared bound but a small typical length use
//! [`SmallBuf`], which keeps the common case free of heap traffic.
//!
//! # Usage Example
//!
//! ```rust
//! use ranasn_core::containers::{BoundedArray, DynArray};
//!
//! let mut cells: BoundedArray<u16, 4> = BoundedArray::new();
//! cells.push(10);
//! cells.push(20);
//! assert_eq!(cells.len(), 2);
//!
//! let mut bytes: DynArray<u8> = DynArray::with_len(3);
//! bytes[1] = 0xAA;
//! assert_eq!(bytes.as_slice(), &[0, 0xAA, 0]);
//! ```

pub mod fixed;
pub mod heap;
pub mod small;

pub use fixed::Fixed;
pub use heap::Heap;
pub use small::SmallBuf;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Capacity policy of an [`Array`]
///
/// Implementations own the elements and decide when and how memory is
/// obtained. Operations that would break the policy's maximum return `false`
/// and leave the storage untouched.
pub trait Storage: Default + Clone {
    type Item;

    /// Largest length the policy can ever hold, `None` when unbounded
    fn max_len(&self) -> Option<usize>;

    fn as_slice(&self) -> &[Self::Item];

    fn as_mut_slice(&mut self) -> &mut [Self::Item];

    fn capacity(&self) -> usize;

    /// Change the length, filling new slots with `fill()`
    fn resize_with<F>(&mut self, new_len: usize, fill: F) -> bool
    where
        F: FnMut() -> Self::Item;

    /// Append one element, handing it back if the policy rejects it
    fn push(&mut self, item: Self::Item) -> Result<(), Self::Item>;

    fn truncate(&mut self, len: usize);

    fn remove(&mut self, index: usize) -> Self::Item;
}

/// Variable-length sequence of elements with a pluggable capacity policy
#[derive(Clone, Default)]
pub struct Array<S: Storage> {
    storage: S,
}

/// Heap-growable array, used by unbounded strings and lists
pub type DynArray<T> = Array<Heap<T>>;
/// Array with a compile-time maximum of `N` elements and no heap storage
pub type BoundedArray<T, const N: usize> = Array<Fixed<T, N>>;
/// Array that keeps up to `N` elements inline before moving to the heap
pub type ExtArray<T, const N: usize> = Array<SmallBuf<T, N>>;

impl<S: Storage> Array<S> {
    pub fn new() -> Self {
        Self { storage: S::default() }
    }

    /// Create an array holding `len` default elements
    pub fn with_len(len: usize) -> Self
    where
        S::Item: Default,
    {
        let mut array = Self::new();
        array.resize(len);
        array
    }

    pub fn len(&self) -> usize {
        self.storage.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Maximum length allowed by the capacity policy
    pub fn max_len(&self) -> Option<usize> {
        self.storage.max_len()
    }

    /// Resize the array, default-filling new slots
    ///
    /// Shrinking never releases memory. Growing past the policy's maximum
    /// logs an error and leaves the array unchanged, so callers that depend on
    /// the new length must check [`Array::len`] afterwards.
    ///
    /// # Returns
    /// `true` if the array now has `new_len` elements.
    pub fn resize(&mut self, new_len: usize) -> bool
    where
        S::Item: Default,
    {
        self.storage.resize_with(new_len, Default::default)
    }

    /// Append an element
    ///
    /// A full fixed-capacity array logs an error and drops `item`.
    pub fn push(&mut self, item: S::Item) {
        let _ = self.storage.push(item);
    }

    /// Append an element, returning it back if the array is full
    pub fn try_push(&mut self, item: S::Item) -> Result<(), S::Item> {
        self.storage.push(item)
    }

    pub fn pop(&mut self) -> Option<S::Item> {
        if self.is_empty() {
            None
        } else {
            Some(self.storage.remove(self.len() - 1))
        }
    }

    /// Remove the element at `index`, shifting later elements down
    pub fn erase(&mut self, index: usize) -> S::Item {
        self.storage.remove(index)
    }

    pub fn clear(&mut self) {
        self.storage.truncate(0);
    }

    pub fn as_slice(&self) -> &[S::Item] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [S::Item] {
        self.storage.as_mut_slice()
    }

    /// Replace the content with a copy of `items`
    ///
    /// # Returns
    /// `false` if `items` does not fit the capacity policy, in which case the
    /// array is left unchanged.
    pub fn assign_from_slice(&mut self, items: &[S::Item]) -> bool
    where
        S::Item: Clone,
    {
        if let Some(max) = self.storage.max_len() {
            if items.len() > max {
                log::error!("Maximum size {} achieved for bounded array", max);
                return false;
            }
        }
        self.storage.truncate(0);
        for item in items {
            let _ = self.storage.push(item.clone());
        }
        true
    }

    pub fn from_slice(items: &[S::Item]) -> Self
    where
        S::Item: Clone,
    {
        let mut array = Self::new();
        array.assign_from_slice(items);
        array
    }
}

impl<S: Storage> Deref for Array<S> {
    type Target = [S::Item];

    fn deref(&self) -> &Self::Target {
        self.storage.as_slice()
    }
}

impl<S: Storage> DerefMut for Array<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.storage.as_mut_slice()
    }
}

impl<S: Storage> PartialEq for Array<S>
where
    S::Item: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<S: Storage> Eq for Array<S> where S::Item: Eq {}

impl<S: Storage> fmt::Debug for Array<S>
where
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<'a, S: Storage> IntoIterator for &'a Array<S> {
    type Item = &'a S::Item;
    type IntoIter = std::slice::Iter<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, S: Storage> IntoIterator for &'a mut Array<S> {
    type Item = &'a mut S::Item;
    type IntoIter = std::slice::IterMut<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<S: Storage> FromIterator<S::Item> for Array<S> {
    fn from_iter<I: IntoIterator<Item = S::Item>>(iter: I) -> Self {
        let mut array = Self::new();
        for item in iter {
            array.push(item);
        }
        array
    }
}

impl<S: Storage> Extend<S::Item> for Array<S> {
    fn extend<I: IntoIterator<Item = S::Item>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<S: Storage> Serialize for Array<S>
where
    S::Item: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.as_slice() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}
