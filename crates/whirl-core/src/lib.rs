//! # whirl-core — The "Wheel" of WHIRL
//!
//! A growable ring buffer. FIFO at the front, LIFO at the back, live
//! cursors in both directions, and drains that hand back what they remove.
//!
//! The one rule: `head == tail` means empty. A ring of `capacity` slots
//! therefore holds at most `capacity - 1` elements, and every write that
//! would break this doubles the storage *before* touching a slot.
//!
//! ```
//! use whirl_core::RingBuffer;
//!
//! let mut ring = RingBuffer::new(3).unwrap();
//! ring.extend([1, 2, 3, 4]);
//! assert_eq!(ring.capacity(), 6);
//! assert_eq!(ring.flush_all(), vec![1, 2, 3, 4]);
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod ring;
pub mod window;

pub use config::{RingConfig, RingOptions, DEFAULT_CAPACITY};
pub use cursor::{Cursor, Direction, Iter, Position, Step};
pub use error::{RingError, RingResult};
pub use ring::RingBuffer;
pub use window::Window;
