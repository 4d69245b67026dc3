//! # Cursors — Live Two-Way Traversal
//!
//! A [`Position`] is a slot index plus a [`Direction`]. Every step re-reads
//! the ring's current head/tail, so a position detached from any borrow can
//! be carried across mutations (this is what the async cursors in
//! `whirl-sync` do).
//!
//! Stepping rules, for both directions:
//!
//! - toward `tail`: read the slot at the position, then advance;
//!   done when the position is not a live slot.
//! - toward `head`: retreat, then read; done when the position is `head`.
//!
//! A forward cursor starts at `head` and its `next()` walks toward `tail`.
//! A reverse cursor starts at `tail` and its `next()` walks toward `head`,
//! so its first element is the one at `tail - 1`.
//!
//! # No snapshot isolation
//!
//! A position that falls outside the live window after a mutation reports
//! `done`. Elements enqueued, dequeued or relocated between two steps may be
//! skipped or seen twice. This is expected, not a bug.

use std::iter::FusedIterator;

use crate::ring::RingBuffer;

/// Which end a traversal or drain starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Front to back (`head` toward `tail`).
    #[default]
    Forward,
    /// Back to front (`tail` toward `head`).
    Reverse,
}

/// Outcome of one cursor step: an optional value plus a completion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<V> {
    pub value: Option<V>,
    pub done: bool,
}

impl<V> Step<V> {
    fn yielded(value: Option<V>) -> Self {
        Self { value, done: false }
    }

    fn finished() -> Self {
        Self {
            value: None,
            done: true,
        }
    }

    /// Map the carried value, keeping the completion flag.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Step<U> {
        Step {
            value: self.value.map(f),
            done: self.done,
        }
    }
}

/// Detached cursor state: a physical slot index and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    index: usize,
    direction: Direction,
}

impl Position {
    /// Starting position of a `direction` cursor over `ring` as it is now.
    pub fn start<T>(ring: &RingBuffer<T>, direction: Direction) -> Self {
        let window = ring.window();
        let index = match direction {
            Direction::Forward => window.head(),
            Direction::Reverse => window.tail(),
        };
        Self { index, direction }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Step in the cursor's own direction.
    pub fn next<'a, T>(&mut self, ring: &'a RingBuffer<T>) -> Step<&'a T> {
        match self.direction {
            Direction::Forward => self.toward_tail(ring),
            Direction::Reverse => self.toward_head(ring),
        }
    }

    /// Step against the cursor's direction.
    pub fn previous<'a, T>(&mut self, ring: &'a RingBuffer<T>) -> Step<&'a T> {
        match self.direction {
            Direction::Forward => self.toward_head(ring),
            Direction::Reverse => self.toward_tail(ring),
        }
    }

    fn toward_tail<'a, T>(&mut self, ring: &'a RingBuffer<T>) -> Step<&'a T> {
        let window = ring.window();
        if !window.contains(self.index) {
            return Step::finished();
        }
        let value = ring.slot(self.index);
        self.index = window.next_pos(self.index);
        Step::yielded(value)
    }

    fn toward_head<'a, T>(&mut self, ring: &'a RingBuffer<T>) -> Step<&'a T> {
        let window = ring.window();
        if self.index >= window.capacity() {
            return Step::finished();
        }
        let offset = window.offset_of(self.index);
        if offset == 0 || offset > window.len() {
            return Step::finished();
        }
        self.index = window.prev_pos(self.index);
        Step::yielded(ring.slot(self.index))
    }
}

/// Borrowing cursor over a [`RingBuffer`].
///
/// The borrow freezes the ring for the cursor's lifetime; use a bare
/// [`Position`] to keep traversal state across mutations.
#[derive(Debug)]
pub struct Cursor<'a, T> {
    ring: &'a RingBuffer<T>,
    position: Position,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(ring: &'a RingBuffer<T>, direction: Direction) -> Self {
        Self {
            ring,
            position: Position::start(ring, direction),
        }
    }

    /// Yield the next element in this cursor's direction.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Step<&'a T> {
        self.position.next(self.ring)
    }

    /// Step back, yielding the element passed over.
    pub fn previous(&mut self) -> Step<&'a T> {
        self.position.previous(self.ring)
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Front-to-back iterator over the live elements.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    ring: &'a RingBuffer<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(ring: &'a RingBuffer<T>) -> Self {
        Self {
            ring,
            front: 0,
            back: ring.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.ring.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.ring.get(self.back)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
