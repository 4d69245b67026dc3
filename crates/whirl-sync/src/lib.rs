//! # whirl-sync — The "Gate" of WHIRL
//!
//! Serialized access to a `whirl-core` ring for many async callers.
//!
//! A [`Gate`] hands out tickets in call order and lets exactly one holder in
//! at a time. [`SafeRingBuffer`] runs every `*_safe` operation under that
//! gate, so operations issued as `o1..oN` execute one after another in that
//! order, even when their futures are polled out of order.
//!
//! ```
//! use whirl_sync::SafeRingBuffer;
//!
//! # async fn demo() {
//! let ring = SafeRingBuffer::new(3).unwrap();
//! let a = ring.enqueue_safe(1);
//! let b = ring.enqueue_safe(2);
//! let (_, _, first) = futures_util::join!(b, a, ring.dequeue_safe());
//! assert_eq!(first, Some(1));
//! # }
//! ```

pub mod gate;
pub mod safe;

pub use gate::{Gate, GateGuard};
pub use safe::{SafeCursor, SafeRingBuffer};
