//! # Gate — FIFO Cooperative Mutual Exclusion
//!
//! A chain of deferred release signals. Taking a ticket swaps the most
//! recently installed release signal for a fresh one, synchronously, at
//! call time; that swap is what fixes arrival order. The ticket then waits
//! for the signal it captured, and the guard it turns into fires its own
//! signal on drop, waking exactly the next ticket in line.
//!
//! ```text
//!   acquire() #0        acquire() #1        acquire() #2
//!   wait: -             wait: rx0           wait: rx1
//!   release: tx0 ─────▶ release: tx1 ─────▶ release: tx2 ─────▶ (last)
//! ```
//!
//! No reentrancy, no timeout. A ticket dropped before it is granted hands
//! the signal it was waiting on to its successor, so the chain never stalls
//! and never lets two holders in at once.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{trace, warn};

/// What travels down the chain: `None` when the sender released the gate,
/// `Some(rx)` when the sender gave up waiting and the receiver must wait on
/// `rx` instead.
struct Handoff(Option<oneshot::Receiver<Handoff>>);

struct Chain {
    /// Release signal of the newest ticket; the next ticket waits on it.
    last: Option<oneshot::Receiver<Handoff>>,
    issued: u64,
}

/// Strict FIFO async mutex without protected data.
pub struct Gate {
    chain: Mutex<Chain>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    pub fn new() -> Self {
        Self {
            chain: Mutex::new(Chain {
                last: None,
                issued: 0,
            }),
        }
    }

    /// Take a place in line now and return a future that resolves once every
    /// earlier ticket has released the gate.
    ///
    /// Order is decided when this method is *called*, not when the returned
    /// future is first polled.
    pub fn acquire(&self) -> impl Future<Output = GateGuard> + Send + 'static {
        self.ticket().granted()
    }

    /// Number of tickets handed out so far.
    pub fn issued(&self) -> u64 {
        self.chain.lock().issued
    }

    fn ticket(&self) -> Ticket {
        let (release, next) = oneshot::channel();
        let mut chain = self.chain.lock();
        let wait = chain.last.replace(next);
        let seq = chain.issued;
        chain.issued += 1;
        trace!(seq, "gate ticket issued");
        Ticket {
            seq,
            wait,
            release: Some(release),
        }
    }
}

/// A place in line that has not been granted yet.
struct Ticket {
    seq: u64,
    wait: Option<oneshot::Receiver<Handoff>>,
    release: Option<oneshot::Sender<Handoff>>,
}

impl Ticket {
    async fn granted(mut self) -> GateGuard {
        while let Some(wait) = self.wait.as_mut() {
            match wait.await {
                Ok(Handoff(Some(inherited))) => self.wait = Some(inherited),
                Ok(Handoff(None)) | Err(_) => self.wait = None,
            }
        }
        trace!(seq = self.seq, "gate granted");
        GateGuard {
            seq: self.seq,
            release: self.release.take(),
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            warn!(seq = self.seq, "gate ticket dropped before grant");
            let _ = release.send(Handoff(self.wait.take()));
        }
    }
}

/// Exclusive hold on a [`Gate`]. Dropping it wakes the next ticket.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct GateGuard {
    seq: u64,
    release: Option<oneshot::Sender<Handoff>>,
}

impl GateGuard {
    /// Position of this holder in arrival order, starting at 0.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            trace!(seq = self.seq, "gate released");
            let _ = release.send(Handoff(None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::join_all;
    use futures_util::FutureExt;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let gate = Gate::new();
        let guard = gate.acquire().now_or_never().expect("free gate");
        assert_eq!(guard.seq(), 0);
        assert_eq!(gate.issued(), 1);
    }

    #[tokio::test]
    async fn test_second_acquire_waits_for_release() {
        let gate = Gate::new();
        let first = gate.acquire().await;
        let mut second = Box::pin(gate.acquire());
        assert!((&mut second).now_or_never().is_none());

        drop(first);
        let second = second.await;
        assert_eq!(second.seq(), 1);
    }

    #[tokio::test]
    async fn test_critical_sections_run_in_call_order() {
        let gate = Gate::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let ticket = gate.acquire();
                let log = Arc::clone(&log);
                async move {
                    let _guard = ticket.await;
                    log.lock().push(("enter", i));
                    tokio::task::yield_now().await;
                    log.lock().push(("leave", i));
                }
            })
            .collect();

        // Poll in reverse; order was fixed when the tickets were taken.
        join_all(tasks.into_iter().rev()).await;

        let expected: Vec<_> = (0..8)
            .flat_map(|i| [("enter", i), ("leave", i)])
            .collect();
        assert_eq!(*log.lock(), expected);
    }

    #[tokio::test]
    async fn test_dropped_ticket_keeps_exclusion() {
        let gate = Gate::new();
        let holder = gate.acquire().await;
        let abandoned = gate.acquire();
        let mut third = Box::pin(gate.acquire());

        drop(abandoned);
        // Still blocked behind `holder`, not released by the abandoned ticket.
        assert!((&mut third).now_or_never().is_none());

        drop(holder);
        let third = third.await;
        assert_eq!(third.seq(), 2);
    }

    #[tokio::test]
    async fn test_dropped_polled_ticket_hands_off() {
        let gate = Gate::new();
        let holder = gate.acquire().await;
        let mut waiting = Box::pin(gate.acquire());
        assert!((&mut waiting).now_or_never().is_none());
        let mut last = Box::pin(gate.acquire());

        drop(waiting);
        assert!((&mut last).now_or_never().is_none());

        drop(holder);
        assert_eq!(last.await.seq(), 2);
    }

    #[tokio::test]
    async fn test_gate_reusable_after_idle() {
        let gate = Gate::new();
        for expected in 0..5 {
            let guard = gate.acquire().await;
            assert_eq!(guard.seq(), expected);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_overlap_across_spawned_tasks() {
        let gate = Arc::new(Gate::new());
        let inside = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let ticket = gate.acquire();
                let inside = Arc::clone(&inside);
                tokio::spawn(async move {
                    let _guard = ticket.await;
                    let now = inside.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    assert_eq!(now, 0, "two holders inside the gate");
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
