//! Fixed-capacity inline policy

use super::Storage;

/// Inline storage for at most `N` elements
///
/// Never allocates. Growing past `N` is logged and ignored, the storage is
/// left exactly as it was.
#[derive(Debug, Clone)]
pub struct Fixed<T, const N: usize> {
    items: heapless::Vec<T, N>,
}

impl<T, const N: usize> Default for Fixed<T, N> {
    fn default() -> Self {
        Self {
            items: heapless::Vec::new(),
        }
    }
}

fn log_overflow(max: usize) {
    log::error!("Maximum size {} achieved for bounded array", max);
}

impl<T: Clone, const N: usize> Storage for Fixed<T, N> {
    type Item = T;

    fn max_len(&self) -> Option<usize> {
        Some(N)
    }

    fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    fn capacity(&self) -> usize {
        N
    }

    fn resize_with<F>(&mut self, new_len: usize, mut fill: F) -> bool
    where
        F: FnMut() -> T,
    {
        if new_len > N {
            log_overflow(N);
            return false;
        }
        self.items.truncate(new_len);
        while self.items.len() < new_len {
            if self.items.push(fill()).is_err() {
                return false;
            }
        }
        true
    }

    fn push(&mut self, item: T) -> Result<(), T> {
        self.items.push(item).inspect_err(|_| log_overflow(N))
    }

    fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }
}
