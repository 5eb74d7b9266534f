//! Shared request budget with bounded concurrency
//!
//! [`BudgetCounter`] combines two independent resources:
//!
//! - a lock-free signed counter of work units left in the run, decremented
//!   once per [`BudgetCounter::acquire`] call, and
//! - a bounded pool of concurrency slots (a tokio [`Semaphore`]).
//!
//! The total check is a single atomic decrement. Only callers that won a work
//! unit go on to wait for a slot. Workers racing past the exhaustion point
//! drive `remaining` below zero, once each, without consuming a slot; the
//! number of successful grants never exceeds the initial total.

use std::ptr;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};

/// Admission gate shared by all workers of one run
#[derive(Debug)]
pub struct BudgetCounter {
    /// Work units left; negative once exhausted
    remaining: AtomicI64,

    /// Concurrency slot pool
    slots: Semaphore,

    /// Slot pool size
    concurrency: usize,

    /// Successful acquisitions over the counter's lifetime
    granted: AtomicU64,

    /// Slots returned to the pool
    released: AtomicU64,

    /// Slots currently held
    in_flight: AtomicUsize,
}

impl BudgetCounter {
    /// Create a counter allowing `total` acquisitions, at most `concurrency`
    /// of them outstanding at once
    pub fn new(total: u64, concurrency: usize) -> Self {
        let concurrency = concurrency.min(Semaphore::MAX_PERMITS);
        Self {
            remaining: AtomicI64::new(i64::try_from(total).unwrap_or(i64::MAX)),
            slots: Semaphore::new(concurrency),
            concurrency,
            granted: AtomicU64::new(0),
            released: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Claim one work unit and a concurrency slot
    ///
    /// Returns `None` without waiting when the budget is exhausted, and also
    /// when the slot pool has been closed. Otherwise waits, with no timeout,
    /// until a slot is free.
    ///
    /// The returned slot must be handed back with [`BudgetCounter::release`]
    /// once the attempt has been recorded. Dropping it releases it as well.
    pub async fn acquire(&self) -> Option<BudgetSlot<'_>> {
        let left = self.remaining.fetch_sub(1, Ordering::AcqRel) - 1;
        if left < 0 {
            return None;
        }

        let permit = match self.slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::debug!(remaining = left, "Slot pool closed, admission refused");
                return None;
            }
        };

        self.granted.fetch_add(1, Ordering::AcqRel);
        let held = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        debug_assert!(
            held <= self.concurrency,
            "{held} slots held with concurrency {}",
            self.concurrency
        );

        Some(BudgetSlot {
            counter: self,
            _permit: permit,
        })
    }

    /// Return a slot obtained from [`BudgetCounter::acquire`] to the pool
    ///
    /// Taking the slot by value makes a second release of the same slot
    /// impossible.
    pub fn release(&self, slot: BudgetSlot<'_>) {
        assert!(
            ptr::eq(self, slot.counter),
            "budget slot released to a counter that did not grant it"
        );
        drop(slot);
    }

    /// Stop admitting work
    ///
    /// Pending and future [`acquire`](Self::acquire) calls return `None`.
    /// Slots already granted stay valid until released.
    pub fn close(&self) {
        self.slots.close();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    /// Work units left, negative once workers have observed exhaustion
    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Successful acquisitions so far
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Acquire)
    }

    /// Slots handed back so far
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Acquire)
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Size of the slot pool
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

/// One granted work unit holding one concurrency slot
///
/// Only [`BudgetCounter::acquire`] creates slots. The slot returns to the
/// pool when released or dropped.
#[must_use = "dropping a slot immediately releases it"]
#[derive(Debug)]
pub struct BudgetSlot<'a> {
    counter: &'a BudgetCounter,
    _permit: SemaphorePermit<'a>,
}

impl Drop for BudgetSlot<'_> {
    fn drop(&mut self) {
        let held = self.counter.in_flight.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(held > 0, "more slots released than acquired");
        self.counter.released.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_total_refuses_immediately() {
        let budget = BudgetCounter::new(0, 4);

        assert!(budget.acquire().await.is_none());
        assert!(budget.acquire().await.is_none());
        assert_eq!(budget.granted(), 0);
        assert_eq!(budget.in_flight(), 0);
        assert_eq!(budget.remaining(), -2);
    }

    #[tokio::test]
    async fn test_grants_exactly_total() {
        let budget = BudgetCounter::new(3, 3);

        let a = budget.acquire().await.expect("first grant");
        let b = budget.acquire().await.expect("second grant");
        let c = budget.acquire().await.expect("third grant");
        assert_eq!(budget.in_flight(), 3);
        assert!(budget.acquire().await.is_none());

        budget.release(a);
        budget.release(b);
        budget.release(c);

        assert_eq!(budget.granted(), 3);
        assert_eq!(budget.released(), 3);
        assert_eq!(budget.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropped_slot_is_released() {
        let budget = BudgetCounter::new(2, 1);
        {
            let _slot = budget.acquire().await.unwrap();
            assert_eq!(budget.in_flight(), 1);
        }
        assert_eq!(budget.in_flight(), 0);
        assert_eq!(budget.released(), 1);

        // The slot came back, so the second unit does not block.
        let slot = tokio::time::timeout(Duration::from_secs(1), budget.acquire())
            .await
            .expect("acquire blocked on a released slot")
            .unwrap();
        budget.release(slot);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_free_slot() {
        let budget = Arc::new(BudgetCounter::new(2, 1));
        let held = budget.acquire().await.unwrap();

        let waiter = {
            let budget = Arc::clone(&budget);
            tokio::spawn(async move {
                let slot = budget.acquire().await;
                let granted = slot.is_some();
                drop(slot);
                granted
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        budget.release(held);
        assert!(waiter.await.unwrap());
        assert_eq!(budget.granted(), 2);
    }

    #[tokio::test]
    async fn test_close_wakes_waiters() {
        let budget = Arc::new(BudgetCounter::new(10, 1));
        let held = budget.acquire().await.unwrap();

        let waiter = {
            let budget = Arc::clone(&budget);
            tokio::spawn(async move { budget.acquire().await.is_some() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        budget.close();

        assert!(!waiter.await.unwrap());
        assert!(budget.is_closed());
        assert!(budget.acquire().await.is_none());

        budget.release(held);
        assert_eq!(budget.granted(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "did not grant it")]
    async fn test_release_to_foreign_counter_panics() {
        let a = BudgetCounter::new(1, 1);
        let b = BudgetCounter::new(1, 1);
        let slot = a.acquire().await.unwrap();
        b.release(slot);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_never_exceeds_slots() {
        let (total, bandwidth) = (20u64, 5usize);
        let budget = Arc::new(BudgetCounter::new(total, bandwidth));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let count = Arc::new(AtomicU64::new(0));

        let workers = 2 * bandwidth;
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let budget = Arc::clone(&budget);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let count = Arc::clone(&count);
            handles.push(tokio::spawn(async move {
                while let Some(slot) = budget.acquire().await {
                    count.fetch_add(1, Ordering::SeqCst);
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    budget.release(slot);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(count.load(Ordering::SeqCst), total);
        assert!(peak.load(Ordering::SeqCst) <= bandwidth);
        assert_eq!(budget.granted(), total);
        assert_eq!(budget.released(), total);
        assert_eq!(budget.in_flight(), 0);
        // Every worker observed exhaustion exactly once.
        assert_eq!(budget.remaining(), -(workers as i64));
    }
}
