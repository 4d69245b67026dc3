//! # Window — Ring Index Arithmetic
//!
//! Tracks the `head` (oldest live slot) and `tail` (next free slot) of a
//! ring with `capacity` slots. Enforces the invariant everything else rests
//! on: `tail` can never advance onto `head`. `head == tail` means empty and
//! nothing else, so a ring of `capacity` slots holds at most `capacity - 1`
//! elements.
//!
//! This invariant is model-checked with Kani here and in `whirl-verify`.

/// Head/tail window over a ring of `capacity` slots.
///
/// Positions wrap around using modular arithmetic.
///
/// # Invariant
///
/// `tail` can never advance to equal `head` (that would make a full ring
/// indistinguishable from an empty one). Callers that want to write into a
/// full window must relocate into a larger one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Oldest live slot (next slot to read from the front).
    head: usize,

    /// Next free slot (one past the newest live slot).
    tail: usize,

    /// Total number of slots in the ring.
    capacity: usize,
}

impl Window {
    /// Create an empty window over `capacity` slots.
    ///
    /// # Panics
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "Ring must have at least 1 slot");
        Self {
            head: 0,
            tail: 0,
            capacity,
        }
    }

    /// Window after copying `len` live slots to the start of a fresh ring of
    /// `capacity` slots.
    ///
    /// # Panics
    /// Panics if `len >= capacity`.
    pub fn relocated(len: usize, capacity: usize) -> Self {
        assert!(len < capacity, "Relocated ring must keep one slot free");
        Self {
            head: 0,
            tail: len % capacity,
            capacity,
        }
    }

    /// Returns `true` if no slot is free for writing.
    /// A full window means advancing `tail` would make it equal `head`.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.next_pos(self.tail) == self.head
    }

    /// Returns `true` if the window holds no live slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.offset_of(self.tail)
    }

    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claim the slot at `tail` for writing and advance `tail`.
    ///
    /// Returns `None` if the window is full.
    #[inline]
    pub fn advance_tail(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let slot = self.tail;
        self.tail = self.next_pos(self.tail);
        Some(slot)
    }

    /// Release the oldest live slot and advance `head`.
    ///
    /// Returns `None` if the window is empty.
    #[inline]
    pub fn advance_head(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let slot = self.head;
        self.head = self.next_pos(self.head);
        Some(slot)
    }

    /// Release the newest live slot and pull `tail` back onto it.
    ///
    /// Returns `None` if the window is empty.
    #[inline]
    pub fn retreat_tail(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.tail = self.prev_pos(self.tail);
        Some(self.tail)
    }

    /// Distance from `head` to `index`, walking toward `tail`.
    #[inline]
    pub fn offset_of(&self, index: usize) -> usize {
        (index + self.capacity - self.head) % self.capacity
    }

    /// Physical slot of the element `offset` places after `head`, if live.
    #[inline]
    pub fn slot_at(&self, offset: usize) -> Option<usize> {
        if offset < self.len() {
            Some((self.head + offset) % self.capacity)
        } else {
            None
        }
    }

    /// Returns `true` if `index` is a live slot.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity && self.offset_of(index) < self.len()
    }

    /// Next position with wrap-around.
    #[inline]
    pub fn next_pos(&self, pos: usize) -> usize {
        (pos + 1) % self.capacity
    }

    /// Previous position with wrap-around.
    #[inline]
    pub fn prev_pos(&self, pos: usize) -> usize {
        (pos + self.capacity - 1) % self.capacity
    }
}

// =============================================================================
// Kani Proofs: Window Invariants
// =============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    /// **Proof: Tail cannot wrap around and touch head**
    ///
    /// After any number of `advance_tail` calls, a non-empty window keeps
    /// head and tail apart.
    #[kani::proof]
    #[kani::unwind(6)]
    fn verify_tail_cannot_overtake_head() {
        let mut window = Window::new(4);

        let advances: usize = kani::any();
        kani::assume(advances <= 5);

        for _ in 0..advances {
            let _ = window.advance_tail();
        }

        if !window.is_empty() {
            assert!(
                window.head != window.tail,
                "INVARIANT VIOLATED: tail wrapped around to touch head"
            );
        }
        assert!(window.len() < window.capacity());
    }

    /// **Proof: Relocation keeps length and frees a slot**
    #[kani::proof]
    fn verify_relocation_len() {
        let len: usize = kani::any();
        let capacity: usize = kani::any();
        kani::assume(capacity >= 1 && capacity <= 64);
        kani::assume(len < capacity);

        let window = Window::relocated(len, capacity);
        assert_eq!(window.len(), len);
        assert_eq!(window.is_full(), len == capacity - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window_is_empty() {
        let w = Window::new(10);
        assert!(w.is_empty());
        assert!(!w.is_full());
        assert_eq!(w.len(), 0);
    }

    #[test]
    fn test_single_slot_window_is_full_and_empty() {
        let mut w = Window::new(1);
        assert!(w.is_empty());
        assert!(w.is_full());
        assert_eq!(w.advance_tail(), None);
    }

    #[test]
    fn test_advance_tail_returns_slot() {
        let mut w = Window::new(4);
        assert_eq!(w.advance_tail(), Some(0));
        assert_eq!(w.advance_tail(), Some(1));
        assert_eq!(w.advance_tail(), Some(2));
        // 3 usable slots out of 4
        assert_eq!(w.advance_tail(), None);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_advance_head_frees_slot() {
        let mut w = Window::new(4);
        w.advance_tail();
        w.advance_tail();
        w.advance_tail();
        assert!(w.is_full());

        assert_eq!(w.advance_head(), Some(0));
        assert!(!w.is_full());
        assert_eq!(w.advance_tail(), Some(3));
    }

    #[test]
    fn test_wrap_around() {
        let mut w = Window::new(3);
        w.advance_tail(); // tail=1
        w.advance_tail(); // tail=2, full
        w.advance_head(); // head=1

        assert_eq!(w.advance_tail(), Some(2)); // tail=0 (wrapped)
        assert_eq!(w.tail(), 0);
        assert_eq!(w.len(), 2);
        assert_eq!(w.slot_at(0), Some(1));
        assert_eq!(w.slot_at(1), Some(2));
        assert_eq!(w.slot_at(2), None);
    }

    #[test]
    fn test_retreat_tail_wraps() {
        let mut w = Window::new(3);
        w.advance_tail();
        w.advance_tail();
        w.advance_head();
        w.advance_tail(); // head=1, tail=0

        assert_eq!(w.retreat_tail(), Some(2));
        assert_eq!(w.retreat_tail(), Some(1));
        assert_eq!(w.retreat_tail(), None);
        assert!(w.is_empty());
    }

    #[test]
    fn test_contains_tracks_live_slots() {
        let mut w = Window::new(4);
        w.advance_tail();
        w.advance_tail();
        w.advance_head(); // live: slot 1
        assert!(!w.contains(0));
        assert!(w.contains(1));
        assert!(!w.contains(2));
        assert!(!w.contains(9));
    }

    #[test]
    fn test_relocated_window() {
        let w = Window::relocated(3, 8);
        assert_eq!(w.head(), 0);
        assert_eq!(w.tail(), 3);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_empty_head_returns_none() {
        let mut w = Window::new(4);
        assert_eq!(w.advance_head(), None);
        assert_eq!(w.retreat_tail(), None);
    }
}
