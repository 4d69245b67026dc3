//! # Ring — Growable Slot Storage
//!
//! Owns the slot array and the [`Window`] over it. Every write checks for a
//! full window *before* touching a slot and doubles the storage first, so
//! `tail` never lands on `head` and no live element is ever overwritten.
//!
//! ```text
//!   capacity = 6, head = 4, tail = 2
//!
//!   slot:   0    1    2    3    4    5
//!         [ c ][ d ][ - ][ - ][ a ][ b ]
//!                     ^tail     ^head
//!
//!   grow → capacity = 12, head = 0, tail = 4
//!         [ a ][ b ][ c ][ d ][ - ] ... [ - ]
//! ```

use std::fmt;

use tracing::debug;

use crate::config::{RingConfig, RingOptions, DEFAULT_CAPACITY};
use crate::cursor::{Cursor, Direction, Iter};
use crate::error::{RingError, RingResult};
use crate::window::Window;

/// Resizable circular buffer with FIFO access at the front and LIFO access
/// at the back.
///
/// Not synchronized: callers sharing one buffer across tasks go through
/// `whirl-sync`.
#[derive(Clone)]
pub struct RingBuffer<T> {
    /// Backing storage; `None` marks a free slot.
    slots: Vec<Option<T>>,

    /// Head/tail bookkeeping over `slots`.
    window: Window,

    /// Capacity restored by [`RingBuffer::reset`].
    initial_capacity: usize,

    options: RingOptions,
}

fn empty_slots<T>(capacity: usize) -> Vec<Option<T>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer with `initial_capacity` slots and default
    /// options.
    ///
    /// # Errors
    /// [`RingError::InvalidCapacity`] if `initial_capacity == 0`.
    pub fn new(initial_capacity: usize) -> RingResult<Self> {
        Self::with_options(initial_capacity, RingOptions::default())
    }

    /// Create an empty buffer with explicit options.
    ///
    /// # Errors
    /// [`RingError::InvalidCapacity`] if `initial_capacity == 0`.
    pub fn with_options(initial_capacity: usize, options: RingOptions) -> RingResult<Self> {
        if initial_capacity == 0 {
            return Err(RingError::InvalidCapacity {
                requested: 0,
                minimum: 1,
            });
        }
        Ok(Self::fresh(initial_capacity, options))
    }

    /// Create an empty buffer from a loaded [`RingConfig`].
    pub fn from_config(config: &RingConfig) -> RingResult<Self> {
        Self::with_options(config.initial_capacity, config.options())
    }

    fn fresh(initial_capacity: usize, options: RingOptions) -> Self {
        Self {
            slots: empty_slots(initial_capacity),
            window: Window::new(initial_capacity),
            initial_capacity,
            options,
        }
    }

    // =========================================================================
    // Front (FIFO) and back (LIFO) access
    // =========================================================================

    /// Append `item` at the back, doubling the capacity first if the buffer
    /// is full.
    pub fn enqueue(&mut self, item: T) {
        if self.window.is_full() {
            self.grow();
        }
        let Some(slot) = self.window.advance_tail() else {
            unreachable!("ring still full after growth");
        };
        self.slots[slot] = Some(item);
    }

    /// Remove and return the oldest element, or `None` if empty.
    pub fn dequeue(&mut self) -> Option<T> {
        let slot = self.window.advance_head()?;
        self.slots[slot].take()
    }

    /// Append `item` at the back. Same growth discipline as
    /// [`RingBuffer::enqueue`].
    pub fn push(&mut self, item: T) {
        self.enqueue(item);
    }

    /// Remove and return the newest element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        let slot = self.window.retreat_tail()?;
        self.slots[slot].take()
    }

    // =========================================================================
    // Capacity management
    // =========================================================================

    /// Move the live elements, in order, into a fresh array of
    /// `new_capacity` slots starting at slot 0.
    ///
    /// # Errors
    /// [`RingError::InvalidCapacity`] unless `new_capacity > len()`; one slot
    /// always stays free so that `head == tail` keeps meaning empty.
    pub fn resize(&mut self, new_capacity: usize) -> RingResult<()> {
        let minimum = self.len() + 1;
        if new_capacity < minimum {
            return Err(RingError::InvalidCapacity {
                requested: new_capacity,
                minimum,
            });
        }
        let from = self.capacity();
        self.relocate(new_capacity);
        debug!(from, to = new_capacity, len = self.len(), "ring resized");
        Ok(())
    }

    fn grow(&mut self) {
        let from = self.capacity();
        let to = from.saturating_mul(2);
        self.relocate(to);
        debug!(from, to, "ring grown");
    }

    fn relocate(&mut self, new_capacity: usize) {
        let old = self.window;
        let len = old.len();
        let mut slots = empty_slots(new_capacity);
        for (offset, dst) in slots.iter_mut().take(len).enumerate() {
            let src = (old.head() + offset) % old.capacity();
            *dst = self.slots[src].take();
        }
        self.slots = slots;
        self.window = Window::relocated(len, new_capacity);
    }

    // =========================================================================
    // Drains
    // =========================================================================

    /// Remove up to `count` elements from the front ([`Direction::Forward`])
    /// or the back ([`Direction::Reverse`]) and return them in removal order.
    ///
    /// `count == 0` removes nothing. Stops early once the buffer is empty.
    /// With `reset_to_initial_capacity`, a flush that empties the buffer
    /// also shrinks storage back to the initial capacity.
    pub fn flush(&mut self, count: usize, direction: Direction) -> Vec<T> {
        if count == 0 {
            return Vec::new();
        }
        let mut drained = Vec::with_capacity(count.min(self.len()));
        while drained.len() < count {
            let item = match direction {
                Direction::Forward => self.dequeue(),
                Direction::Reverse => self.pop(),
            };
            match item {
                Some(item) => drained.push(item),
                None => break,
            }
        }
        if self.options.reset_to_initial_capacity
            && self.is_empty()
            && self.capacity() != self.initial_capacity
        {
            debug!(
                from = self.capacity(),
                to = self.initial_capacity,
                "ring shrunk after full flush"
            );
            self.slots = empty_slots(self.initial_capacity);
            self.window = Window::new(self.initial_capacity);
        }
        drained
    }

    /// Remove every element, front to back.
    pub fn flush_all(&mut self) -> Vec<T> {
        self.flush(self.len(), Direction::Forward)
    }

    /// Discard every element and return to the state of a freshly built
    /// buffer of the initial capacity.
    pub fn reset(&mut self) {
        debug!(
            from = self.capacity(),
            to = self.initial_capacity,
            dropped = self.len(),
            "ring reset"
        );
        *self = Self::fresh(self.initial_capacity, self.options);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    #[inline]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    #[inline]
    pub fn options(&self) -> RingOptions {
        self.options
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Returns `true` when the next insert will grow the buffer
    /// (`len() == capacity() - 1`).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    /// Raw head/tail window, for diagnostics and proofs.
    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Element `offset` places after the front.
    pub fn get(&self, offset: usize) -> Option<&T> {
        self.window
            .slot_at(offset)
            .and_then(|slot| self.slots[slot].as_ref())
    }

    /// Oldest element.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Newest element.
    pub fn back(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// Element stored in physical slot `index`.
    pub(crate) fn slot(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Live cursor starting at the front.
    pub fn forward_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self, Direction::Forward)
    }

    /// Live cursor starting at the back.
    pub fn reverse_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self, Direction::Reverse)
    }

    /// Front-to-back iterator. Each call starts over.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy the live elements into a `Vec`, front to back, leaving the buffer
    /// untouched.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::fresh(DEFAULT_CAPACITY, RingOptions::default())
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.enqueue(item);
        }
    }
}

impl<T> FromIterator<T> for RingBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ring = Self::default();
        ring.extend(iter);
        ring
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Buffers are equal when their live sequences are, regardless of capacity
/// or where the window sits.
impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> RingBuffer<u32> {
        RingBuffer::new(capacity).unwrap()
    }

    #[test]
    fn test_fifo_basic() {
        let mut rb = ring(3);
        rb.enqueue(1);
        rb.enqueue(2);
        assert_eq!(rb.dequeue(), Some(1));
        assert_eq!(rb.dequeue(), Some(2));
        assert_eq!(rb.dequeue(), None);
    }

    #[test]
    fn test_lifo_basic() {
        let mut rb = ring(3);
        rb.push(1);
        rb.push(2);
        rb.push(3);
        assert_eq!(rb.pop(), Some(3));
        assert_eq!(rb.pop(), Some(2));
        assert_eq!(rb.pop(), Some(1));
        assert_eq!(rb.pop(), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RingBuffer::<u32>::new(0).unwrap_err();
        assert!(matches!(
            err,
            RingError::InvalidCapacity {
                requested: 0,
                minimum: 1
            }
        ));
    }

    #[test]
    fn test_grows_before_tail_meets_head() {
        let mut rb = ring(4);
        for i in 0..3 {
            rb.enqueue(i);
        }
        assert!(rb.is_full());
        assert_eq!(rb.capacity(), 4);

        rb.enqueue(3);
        assert_eq!(rb.capacity(), 8);
        assert!(!rb.is_full());
        assert_eq!(rb.flush_all(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_growth_from_wrapped_window() {
        let mut rb = ring(4);
        rb.enqueue(0);
        rb.enqueue(1);
        rb.enqueue(2);
        assert_eq!(rb.dequeue(), Some(0));
        assert_eq!(rb.dequeue(), Some(1));
        // head=2, tail=3; next two writes wrap
        rb.enqueue(3);
        rb.enqueue(4);
        assert_eq!(rb.window().tail(), 1);
        assert!(rb.is_full());

        rb.push(5);
        assert_eq!(rb.capacity(), 8);
        assert_eq!(rb.window().head(), 0);
        assert_eq!(rb.to_vec(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_no_growth_below_full() {
        let mut rb = ring(4);
        for round in 0..10 {
            rb.enqueue(round);
            rb.enqueue(round + 100);
            assert_eq!(rb.dequeue(), Some(round));
            assert_eq!(rb.dequeue(), Some(round + 100));
        }
        assert_eq!(rb.capacity(), 4);
    }

    #[test]
    fn test_capacity_one_grows_on_first_insert() {
        let mut rb = ring(1);
        assert!(rb.is_full());
        rb.enqueue(7);
        assert_eq!(rb.capacity(), 2);
        assert_eq!(rb.dequeue(), Some(7));
    }

    #[test]
    fn test_growth_then_reset() {
        let mut rb = ring(3);
        for i in 1..=4 {
            rb.enqueue(i);
        }
        assert_eq!(rb.capacity(), 6);
        assert_eq!(rb.flush_all(), vec![1, 2, 3, 4]);
        assert_eq!(rb.capacity(), 6);

        rb.reset();
        assert_eq!(rb.capacity(), 3);
        assert_eq!(rb.flush_all(), Vec::<u32>::new());
    }

    #[test]
    fn test_reset_matches_fresh_buffer() {
        let mut rb = ring(3);
        rb.extend([1, 2, 3, 4, 5]);
        rb.dequeue();
        rb.reset();

        let fresh = ring(3);
        assert_eq!(rb.window(), fresh.window());
        assert_eq!(rb.capacity(), fresh.capacity());
        assert!(rb.slots.iter().all(Option::is_none));
        assert_eq!(rb.slots.len(), fresh.slots.len());
    }

    #[test]
    fn test_resize_preserves_order() {
        let mut rb = ring(4);
        rb.extend([1, 2, 3]);
        rb.dequeue();
        rb.extend([4, 5]);
        let before = rb.clone().flush_all();

        rb.resize(16).unwrap();
        assert_eq!(rb.capacity(), 16);
        assert_eq!(rb.window().head(), 0);
        assert_eq!(rb.flush_all(), before);
    }

    #[test]
    fn test_resize_can_shrink_to_len_plus_one() {
        let mut rb = ring(16);
        rb.extend([1, 2, 3]);
        rb.resize(4).unwrap();
        assert!(rb.is_full());
        assert_eq!(rb.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_resize_below_len_rejected() {
        let mut rb = ring(8);
        rb.extend([1, 2, 3]);
        let err = rb.resize(3).unwrap_err();
        assert!(matches!(
            err,
            RingError::InvalidCapacity {
                requested: 3,
                minimum: 4
            }
        ));
        assert_eq!(rb.capacity(), 8);
        assert_eq!(rb.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_flush_partial_forward_and_reverse() {
        let mut rb = ring(8);
        rb.extend(1..=6);
        assert_eq!(rb.flush(2, Direction::Forward), vec![1, 2]);
        assert_eq!(rb.flush(2, Direction::Reverse), vec![6, 5]);
        assert_eq!(rb.to_vec(), vec![3, 4]);
    }

    #[test]
    fn test_flush_zero_is_noop() {
        let mut rb = ring(4);
        rb.extend([1, 2]);
        assert!(rb.flush(0, Direction::Forward).is_empty());
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_flush_stops_when_empty() {
        let mut rb = ring(4);
        rb.extend([1, 2]);
        assert_eq!(rb.flush(10, Direction::Reverse), vec![2, 1]);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_flush_never_grows() {
        let mut rb = ring(4);
        rb.extend([1, 2, 3]);
        rb.flush(1, Direction::Forward);
        assert_eq!(rb.capacity(), 4);
    }

    #[test]
    fn test_full_flush_shrinks_when_configured() {
        let options = RingOptions {
            reset_to_initial_capacity: true,
        };
        let mut rb = RingBuffer::with_options(2, options).unwrap();
        rb.extend([1, 2, 3, 4, 5]);
        assert_eq!(rb.capacity(), 8);

        assert_eq!(rb.flush(2, Direction::Forward), vec![1, 2]);
        assert_eq!(rb.capacity(), 8);

        assert_eq!(rb.flush_all(), vec![3, 4, 5]);
        assert_eq!(rb.capacity(), 2);
        assert_eq!(rb.window(), Window::new(2));
    }

    #[test]
    fn test_full_flush_keeps_capacity_by_default() {
        let mut rb = ring(2);
        rb.extend([1, 2, 3, 4, 5]);
        rb.flush_all();
        assert_eq!(rb.capacity(), 8);
    }

    #[test]
    fn test_front_back_get() {
        let mut rb = ring(3);
        assert_eq!(rb.front(), None);
        assert_eq!(rb.back(), None);
        rb.extend([10, 20, 30]);
        assert_eq!(rb.front(), Some(&10));
        assert_eq!(rb.back(), Some(&30));
        assert_eq!(rb.get(1), Some(&20));
        assert_eq!(rb.get(3), None);
    }

    #[test]
    fn test_from_iterator_and_eq_ignore_layout() {
        let collected: RingBuffer<u32> = (1..=4).collect();
        let mut shifted = ring(5);
        shifted.extend([0, 0, 1, 2]);
        shifted.dequeue();
        shifted.dequeue();
        shifted.extend([3, 4]);
        assert_eq!(collected, shifted);
        assert_eq!(format!("{collected:?}"), "[1, 2, 3, 4]");
    }

    #[test]
    fn test_transforms_leave_buffer_untouched() {
        let rb: RingBuffer<u32> = (1..=6).collect();
        let evens: Vec<u32> = rb.iter().filter(|v| *v % 2 == 0).copied().collect();
        let doubled: Vec<u32> = rb.iter().map(|v| v * 2).collect();
        let sum: u32 = rb.iter().sum();
        assert_eq!(evens, vec![2, 4, 6]);
        assert_eq!(doubled, vec![2, 4, 6, 8, 10, 12]);
        assert_eq!(sum, 21);
        assert_eq!(rb.len(), 6);
    }

    #[test]
    fn test_default_capacity() {
        let rb: RingBuffer<u8> = RingBuffer::default();
        assert_eq!(rb.capacity(), DEFAULT_CAPACITY);
        assert_eq!(rb.initial_capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_from_config() {
        let config = RingConfig::from_toml_str("initial_capacity = 5").unwrap();
        let rb: RingBuffer<u8> = RingBuffer::from_config(&config).unwrap();
        assert_eq!(rb.capacity(), 5);
        assert!(!rb.options().reset_to_initial_capacity);
    }
}
