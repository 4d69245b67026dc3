//! # SafeRingBuffer — The Serialized Operation Family
//!
//! Wraps a [`RingBuffer`] with a [`Gate`]. Every `*_safe` method takes its
//! ticket when called, waits its turn, runs the plain operation, releases
//! the gate and hands back the result. Callers that issue `o1..oN` in order
//! see their bodies run in exactly that order, one at a time.
//!
//! The slot storage itself sits behind a `parking_lot::Mutex` that is held
//! only for the synchronous body of a single operation, never across an
//! `.await`. [`SafeRingBuffer::lock`] is the unserialized path: it skips
//! the gate entirely and is not ordered relative to safe operations.

use std::future::Future;

use futures_util::stream::{self, Stream};
use parking_lot::{Mutex, MutexGuard};

use whirl_core::{Direction, Position, RingBuffer, RingConfig, RingOptions, RingResult};

use crate::gate::Gate;

/// A ring buffer shared between async tasks through a FIFO gate.
///
/// Share it with `Arc<SafeRingBuffer<T>>`.
pub struct SafeRingBuffer<T> {
    ring: Mutex<RingBuffer<T>>,
    gate: Gate,
}

impl<T> From<RingBuffer<T>> for SafeRingBuffer<T> {
    fn from(ring: RingBuffer<T>) -> Self {
        Self {
            ring: Mutex::new(ring),
            gate: Gate::new(),
        }
    }
}

impl<T> Default for SafeRingBuffer<T> {
    fn default() -> Self {
        RingBuffer::default().into()
    }
}

impl<T> SafeRingBuffer<T> {
    pub fn new(initial_capacity: usize) -> RingResult<Self> {
        RingBuffer::new(initial_capacity).map(Self::from)
    }

    pub fn with_options(initial_capacity: usize, options: RingOptions) -> RingResult<Self> {
        RingBuffer::with_options(initial_capacity, options).map(Self::from)
    }

    pub fn from_config(config: &RingConfig) -> RingResult<Self> {
        RingBuffer::from_config(config).map(Self::from)
    }

    pub fn into_inner(self) -> RingBuffer<T> {
        self.ring.into_inner()
    }

    /// Direct access to the ring, bypassing the gate.
    pub fn lock(&self) -> MutexGuard<'_, RingBuffer<T>> {
        self.ring.lock()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    /// The gate serializing the safe family.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Run `op` on the ring once every earlier gate ticket has been served.
    ///
    /// The ticket is taken now; `op` runs when the returned future is polled
    /// to completion.
    pub fn serialized<'a, R, F>(&'a self, op: F) -> impl Future<Output = R> + 'a
    where
        F: FnOnce(&mut RingBuffer<T>) -> R + 'a,
        R: 'a,
    {
        let ticket = self.gate.acquire();
        async move {
            let _guard = ticket.await;
            let mut ring = self.ring.lock();
            op(&mut *ring)
        }
    }

    pub fn enqueue_safe(&self, item: T) -> impl Future<Output = ()> + '_ {
        self.serialized(move |ring| ring.enqueue(item))
    }

    pub fn dequeue_safe(&self) -> impl Future<Output = Option<T>> + '_ {
        self.serialized(|ring| ring.dequeue())
    }

    pub fn push_safe(&self, item: T) -> impl Future<Output = ()> + '_ {
        self.serialized(move |ring| ring.push(item))
    }

    pub fn pop_safe(&self) -> impl Future<Output = Option<T>> + '_ {
        self.serialized(|ring| ring.pop())
    }

    pub fn flush_safe(
        &self,
        count: usize,
        direction: Direction,
    ) -> impl Future<Output = Vec<T>> + '_ {
        self.serialized(move |ring| ring.flush(count, direction))
    }

    pub fn flush_all_safe(&self) -> impl Future<Output = Vec<T>> + '_ {
        self.serialized(|ring| ring.flush_all())
    }

    pub fn resize_safe(&self, new_capacity: usize) -> impl Future<Output = RingResult<()>> + '_ {
        self.serialized(move |ring| ring.resize(new_capacity))
    }

    pub fn reset_safe(&self) -> impl Future<Output = ()> + '_ {
        self.serialized(|ring| ring.reset())
    }

    /// Front-to-back traversal taking the gate once per element.
    pub fn iter_safe(&self) -> SafeCursor<'_, T> {
        SafeCursor::new(self, Direction::Forward)
    }

    /// Back-to-front traversal taking the gate once per element.
    pub fn iter_rev_safe(&self) -> SafeCursor<'_, T> {
        SafeCursor::new(self, Direction::Reverse)
    }
}

/// Gate-aware cursor over a [`SafeRingBuffer`].
///
/// Each step is one gate acquisition, so other safe operations interleave
/// between elements and a long traversal never starves them. The traversal
/// as a whole is therefore *not* atomic: the same live-view caveats as
/// [`whirl_core::Position`] apply. The starting position is fixed by the
/// first step, not at construction.
pub struct SafeCursor<'a, T> {
    buffer: &'a SafeRingBuffer<T>,
    direction: Direction,
    position: Option<Position>,
}

impl<'a, T> SafeCursor<'a, T> {
    fn new(buffer: &'a SafeRingBuffer<T>, direction: Direction) -> Self {
        Self {
            buffer,
            direction,
            position: None,
        }
    }

    /// Current position, once the first step has fixed it.
    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

impl<'a, T: Clone> SafeCursor<'a, T> {
    /// Next element in this cursor's direction, or `None` once the cursor
    /// runs off the live window.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Option<T> {
        self.step(true).await
    }

    /// Step back against this cursor's direction.
    pub async fn previous(&mut self) -> Option<T> {
        self.step(false).await
    }

    async fn step(&mut self, forward: bool) -> Option<T> {
        let _guard = self.buffer.gate.acquire().await;
        let locked = self.buffer.ring.lock();
        let ring: &RingBuffer<T> = &locked;
        let direction = self.direction;
        let position = self
            .position
            .get_or_insert_with(|| Position::start(ring, direction));
        let step = if forward {
            position.next(ring)
        } else {
            position.previous(ring)
        };
        step.value.cloned()
    }

    /// Turn the cursor into a stream that ends at the first `None`.
    pub fn into_stream(self) -> impl Stream<Item = T> + 'a
    where
        T: 'a,
    {
        stream::unfold(self, |mut cursor| async move {
            let item = cursor.next().await?;
            Some((item, cursor))
        })
    }
}
