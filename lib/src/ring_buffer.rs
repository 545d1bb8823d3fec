use std::collections::vec_deque;
use std::collections::VecDeque;
use std::iter::Rev;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fixed-capacity FIFO store. Adding to a full buffer evicts the oldest
/// element.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts `item` as the youngest element and returns the element evicted
    /// to make room for it, if any. With a capacity of zero the item itself
    /// is handed back.
    pub fn add(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity. Shrinking keeps the `capacity` most recently
    /// added elements; growing keeps everything.
    pub fn set_capacity(&mut self, capacity: usize) {
        if self.items.len() > capacity {
            let excess = self.items.len() - capacity;
            self.items.drain(..excess);
        }
        self.capacity = capacity;
    }

    /// Most recently added element.
    pub fn youngest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter_oldest_to_newest(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_newest_to_oldest(&self) -> Rev<vec_deque::Iter<'_, T>> {
        self.items.iter().rev()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

/// Thread-safe handle to a [`RingBuffer`].
///
/// Clones share the same buffer. Iterating shared contents goes through
/// [`SharedRingBuffer::with_lock`] or one of the snapshot methods, which hold
/// the lock for the whole traversal.
#[derive(Debug)]
pub struct SharedRingBuffer<T> {
    inner: Arc<Mutex<RingBuffer<T>>>,
}

impl<T> Clone for SharedRingBuffer<T> {
    fn clone(&self) -> Self {
        SharedRingBuffer {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> From<RingBuffer<T>> for SharedRingBuffer<T> {
    fn from(buffer: RingBuffer<T>) -> Self {
        SharedRingBuffer {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }
}

impl<T> SharedRingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        RingBuffer::new(capacity).into()
    }

    // A panic while holding the lock cannot leave the buffer half-updated, so
    // a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, RingBuffer<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the buffer.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut RingBuffer<T>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn add(&self, item: T) -> Option<T> {
        self.lock().add(item)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.lock().set_capacity(capacity)
    }
}

impl<T: Clone> SharedRingBuffer<T> {
    pub fn youngest(&self) -> Option<T> {
        self.lock().youngest().cloned()
    }

    pub fn snapshot_oldest_to_newest(&self) -> Vec<T> {
        self.lock().iter_oldest_to_newest().cloned().collect()
    }

    pub fn snapshot_newest_to_oldest(&self) -> Vec<T> {
        self.lock().iter_newest_to_oldest().cloned().collect()
    }
}
