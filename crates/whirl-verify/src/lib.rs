//! # whirl-verify — The "Law" of WHIRL
//!
//! Model checking of the ring invariants. Every trace of operations is
//! replayed against both a [`RingBuffer`] and a `VecDeque` reference model,
//! and after every step we check:
//!
//! 1. **Contents**: the ring's live sequence equals the model's.
//! 2. **Head/tail**: `len < capacity`, and `head == tail` iff empty.
//! 3. **Growth**: capacity doubles exactly on a write into a full ring and
//!    never changes otherwise.
//!
//! Under Kani the trace is symbolic and the check is a proof. Without Kani
//! the same check runs over every trace up to a small length.

use std::collections::VecDeque;
use std::fmt;

use whirl_core::{Direction, RingBuffer};

/// One step of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Enqueue(u8),
    Dequeue,
    Push(u8),
    Pop,
    /// Remove up to `n` elements from the front.
    FlushFront(u8),
    /// Remove up to `n` elements from the back.
    FlushBack(u8),
    /// Resize to `len + 1 + extra` slots.
    Resize(u8),
    Reset,
}

impl Op {
    /// Small alphabet used for exhaustive enumeration.
    pub const ALPHABET: [Op; 8] = [
        Op::Enqueue(1),
        Op::Dequeue,
        Op::Push(2),
        Op::Pop,
        Op::FlushFront(2),
        Op::FlushBack(1),
        Op::Resize(0),
        Op::Reset,
    ];
}

/// First invariant broken by a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Index of the offending op in the trace.
    pub step: usize,
    pub op: Op,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({:?}): {}", self.step, self.op, self.reason)
    }
}

impl std::error::Error for Violation {}

/// Replay `ops` against a fresh ring of `initial_capacity` and the reference
/// model.
///
/// # Panics
/// Panics if `initial_capacity == 0`.
pub fn check_trace(initial_capacity: usize, ops: &[Op]) -> Result<(), Violation> {
    let mut ring: RingBuffer<u8> = match RingBuffer::new(initial_capacity) {
        Ok(ring) => ring,
        Err(e) => panic!("bad initial capacity: {e}"),
    };
    let mut model: VecDeque<u8> = VecDeque::new();

    for (step, &op) in ops.iter().enumerate() {
        let fail = |reason: String| Violation { step, op, reason };
        let before = ring.capacity();
        let was_full = ring.is_full();

        match op {
            Op::Enqueue(v) | Op::Push(v) => {
                if matches!(op, Op::Enqueue(_)) {
                    ring.enqueue(v);
                } else {
                    ring.push(v);
                }
                model.push_back(v);
                let expected = if was_full { before * 2 } else { before };
                if ring.capacity() != expected {
                    return Err(fail(format!(
                        "capacity {} after write, expected {expected}",
                        ring.capacity()
                    )));
                }
            }
            Op::Dequeue => {
                if ring.dequeue() != model.pop_front() {
                    return Err(fail("dequeue disagrees with model".into()));
                }
            }
            Op::Pop => {
                if ring.pop() != model.pop_back() {
                    return Err(fail("pop disagrees with model".into()));
                }
            }
            Op::FlushFront(n) | Op::FlushBack(n) => {
                let (direction, expected): (Direction, Vec<u8>) = match op {
                    Op::FlushFront(_) => {
                        let take = usize::from(n).min(model.len());
                        (Direction::Forward, model.drain(..take).collect())
                    }
                    _ => {
                        let take = usize::from(n).min(model.len());
                        let mut tail: Vec<u8> = model.drain(model.len() - take..).collect();
                        tail.reverse();
                        (Direction::Reverse, tail)
                    }
                };
                if ring.flush(usize::from(n), direction) != expected {
                    return Err(fail("flush disagrees with model".into()));
                }
                if ring.capacity() != before {
                    return Err(fail("flush changed capacity".into()));
                }
            }
            Op::Resize(extra) => {
                let target = ring.len() + 1 + usize::from(extra);
                if let Err(e) = ring.resize(target) {
                    return Err(fail(format!("resize to {target} failed: {e}")));
                }
                if ring.resize(ring.len()).is_ok() {
                    return Err(fail("resize to len accepted".into()));
                }
            }
            Op::Reset => {
                ring.reset();
                model.clear();
                if ring.capacity() != initial_capacity {
                    return Err(fail("reset did not restore capacity".into()));
                }
            }
        }

        check_state(&ring, &model).map_err(fail)?;
    }
    Ok(())
}

fn check_state(ring: &RingBuffer<u8>, model: &VecDeque<u8>) -> Result<(), String> {
    let window = ring.window();
    if ring.len() >= ring.capacity() {
        return Err(format!("len {} >= capacity {}", ring.len(), ring.capacity()));
    }
    if (window.head() == window.tail()) != model.is_empty() {
        return Err("head == tail does not match emptiness".into());
    }
    if ring.is_full() != (ring.len() == ring.capacity() - 1) {
        return Err("is_full disagrees with len".into());
    }
    if !ring.iter().eq(model.iter()) {
        return Err("contents disagree with model".into());
    }
    if !ring.iter().rev().eq(model.iter().rev()) {
        return Err("reverse contents disagree with model".into());
    }
    Ok(())
}

/// Walk a forward and a reverse cursor over `ring`, checking that every
/// `next()` followed by `previous()` lands back where it started with the
/// same value.
pub fn check_cursor_round_trips(ring: &RingBuffer<u8>) -> Result<(), String> {
    for mut cursor in [ring.forward_cursor(), ring.reverse_cursor()] {
        loop {
            let before = cursor.position();
            let step = cursor.next();
            if step.done {
                if cursor.position() != before {
                    return Err("finished step moved the cursor".into());
                }
                break;
            }
            let back = cursor.previous();
            if back.value != step.value || cursor.position() != before {
                return Err(format!(
                    "{:?}: next/previous did not round-trip at {}",
                    before.direction(),
                    before.index()
                ));
            }
            cursor.next();
        }
    }
    Ok(())
}

// =============================================================================
// Kani Proofs
// =============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;

    fn any_op() -> Op {
        match kani::any::<u8>() % 8 {
            0 => Op::Enqueue(kani::any()),
            1 => Op::Dequeue,
            2 => Op::Push(kani::any()),
            3 => Op::Pop,
            4 => Op::FlushFront(kani::any::<u8>() % 4),
            5 => Op::FlushBack(kani::any::<u8>() % 4),
            6 => Op::Resize(kani::any::<u8>() % 3),
            _ => Op::Reset,
        }
    }

    /// **Proof: No trace of 4 operations breaks the ring invariants**
    ///
    /// Starting capacity is symbolic in `1..=3`, so both the degenerate
    /// single-slot ring and wrapped windows are covered.
    #[kani::proof]
    #[kani::unwind(10)]
    fn verify_traces_hold_invariants() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 1 && capacity <= 3);
        let ops = [any_op(), any_op(), any_op(), any_op()];
        assert!(check_trace(capacity, &ops).is_ok());
    }

    /// **Proof: Writing into a full ring never overwrites the oldest element**
    #[kani::proof]
    #[kani::unwind(10)]
    fn verify_growth_before_write() {
        let capacity: usize = kani::any();
        kani::assume(capacity >= 1 && capacity <= 4);
        let mut ring: RingBuffer<u8> = RingBuffer::new(capacity).unwrap();
        for v in 0..(capacity - 1) {
            ring.enqueue(v as u8);
        }
        assert!(ring.is_full());
        ring.enqueue(0xFF);
        assert_eq!(ring.capacity(), capacity * 2);
        if capacity > 1 {
            assert_eq!(ring.front(), Some(&0));
        }
        assert_eq!(ring.back(), Some(&0xFF));
    }
}
