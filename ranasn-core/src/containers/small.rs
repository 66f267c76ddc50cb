//! Small-buffer-optimized policy

use super::{Array, Storage};

/// Extra slots reserved when storage first moves to the heap
const HEAP_SLACK: usize = 5;

#[derive(Debug, Clone)]
enum Repr<T, const N: usize> {
    Inline(heapless::Vec<T, N>),
    Heap(Vec<T>),
}

/// Inline storage for up to `N` elements that moves to the heap on demand
///
/// The first growth past `N` switches to a heap vector sized
/// `requested + 5`. Once on the heap the storage stays there, even if it is
/// later shrunk to zero.
#[derive(Debug, Clone)]
pub struct SmallBuf<T, const N: usize> {
    repr: Repr<T, N>,
}

impl<T, const N: usize> Default for SmallBuf<T, N> {
    fn default() -> Self {
        Self {
            repr: Repr::Inline(heapless::Vec::new()),
        }
    }
}

impl<T, const N: usize> SmallBuf<T, N> {
    /// Whether the elements still live in the inline buffer
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// Make room for `new_len` elements, moving to the heap if needed
    fn reserve_for(&mut self, new_len: usize) {
        match &mut self.repr {
            Repr::Inline(inline) if new_len > N => {
                let mut heap = Vec::with_capacity(new_len + HEAP_SLACK);
                heap.extend(std::mem::take(inline));
                self.repr = Repr::Heap(heap);
            }
            Repr::Heap(heap) if new_len > heap.capacity() => {
                heap.reserve_exact(new_len + HEAP_SLACK - heap.len());
            }
            _ => {}
        }
    }
}

impl<T: Clone, const N: usize> Storage for SmallBuf<T, N> {
    type Item = T;

    fn max_len(&self) -> Option<usize> {
        None
    }

    fn as_slice(&self) -> &[T] {
        match &self.repr {
            Repr::Inline(inline) => inline.as_slice(),
            Repr::Heap(heap) => heap.as_slice(),
        }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.repr {
            Repr::Inline(inline) => inline.as_mut_slice(),
            Repr::Heap(heap) => heap.as_mut_slice(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline(_) => N,
            Repr::Heap(heap) => heap.capacity(),
        }
    }

    fn resize_with<F>(&mut self, new_len: usize, mut fill: F) -> bool
    where
        F: FnMut() -> T,
    {
        self.reserve_for(new_len);
        match &mut self.repr {
            Repr::Inline(inline) => {
                inline.truncate(new_len);
                while inline.len() < new_len {
                    if inline.push(fill()).is_err() {
                        return false;
                    }
                }
            }
            Repr::Heap(heap) => heap.resize_with(new_len, fill),
        }
        true
    }

    fn push(&mut self, item: T) -> Result<(), T> {
        let new_len = self.as_slice().len() + 1;
        self.reserve_for(new_len);
        match &mut self.repr {
            Repr::Inline(inline) => inline.push(item),
            Repr::Heap(heap) => {
                heap.push(item);
                Ok(())
            }
        }
    }

    fn truncate(&mut self, len: usize) {
        match &mut self.repr {
            Repr::Inline(inline) => inline.truncate(len),
            Repr::Heap(heap) => heap.truncate(len),
        }
    }

    fn remove(&mut self, index: usize) -> T {
        match &mut self.repr {
            Repr::Inline(inline) => inline.remove(index),
            Repr::Heap(heap) => heap.remove(index),
        }
    }
}

impl<T: Clone, const N: usize> Array<SmallBuf<T, N>> {
    /// Whether the elements still live in the inline buffer
    pub fn is_inline(&self) -> bool {
        self.storage.is_inline()
    }
}
