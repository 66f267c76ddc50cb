//! Heap-growable capacity policy

use super::Storage;

/// Unbounded heap storage
///
/// Growth is geometric: when a resize needs more room the new capacity is
/// `max(requested, 2 x current length)`, which keeps repeated appends
/// amortised O(1). Shrinking keeps the allocation.
#[derive(Debug, Clone)]
pub struct Heap<T> {
    items: Vec<T>,
}

impl<T> Default for Heap<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Heap<T> {
    fn grow_for(&mut self, new_len: usize) {
        if new_len > self.items.capacity() {
            let new_cap = new_len.max(2 * self.items.len());
            self.items.reserve_exact(new_cap - self.items.len());
        }
    }
}

impl<T: Clone> Storage for Heap<T> {
    type Item = T;

    fn max_len(&self) -> Option<usize> {
        None
    }

    fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    fn capacity(&self) -> usize {
        self.items.capacity()
    }

    fn resize_with<F>(&mut self, new_len: usize, fill: F) -> bool
    where
        F: FnMut() -> T,
    {
        self.grow_for(new_len);
        self.items.resize_with(new_len, fill);
        true
    }

    fn push(&mut self, item: T) -> Result<(), T> {
        self.grow_for(self.items.len() + 1);
        self.items.push(item);
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }
}
