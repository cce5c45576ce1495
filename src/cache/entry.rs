//! Per-key entry state and the shared in-flight fetch.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio::time::{Duration, Instant};

use crate::errors::ClientError;

/// Type-erased cached value.
pub(crate) type Value = Arc<dyn Any + Send + Sync>;

/// Result of one fetch, shared by everyone who waited on it.
pub(crate) type Outcome = Result<Value, ClientError>;

/// Lifecycle of a cache entry: `Empty → Fetching → Fresh → Stale → Fetching → …`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Empty,
    Fetching,
    Fresh,
    Stale,
}

/// A fetch joined by every concurrent reader of one key.
///
/// Whichever waiter polls first runs its fetcher; if that waiter is dropped,
/// the next waiter's fetcher takes over.
pub(crate) struct InFlight {
    cell: OnceCell<Outcome>,
    waiters: AtomicUsize,
}

impl InFlight {
    fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    pub(crate) async fn run<F, Fut>(&self, fetch: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        self.cell.get_or_init(fetch).await.clone()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.cell.initialized()
    }

    /// Returns true when the last waiter leaves.
    pub(crate) fn leave(&self) -> bool {
        self.waiters.fetch_sub(1, Ordering::AcqRel) == 1
    }
}

pub(crate) struct EntryState {
    pub(crate) value: Option<Value>,
    pub(crate) fetched_at: Option<Instant>,
    pub(crate) stale_time: Duration,
    pub(crate) invalidated: bool,
    pub(crate) in_flight: Option<Arc<InFlight>>,
    /// Last read or write through the cache.
    pub(crate) last_used: Instant,
    /// Idle time after which the entry may be evicted.
    pub(crate) gc_time: Duration,
}

impl EntryState {
    pub(crate) fn new() -> Self {
        Self {
            value: None,
            fetched_at: None,
            stale_time: Duration::ZERO,
            invalidated: false,
            in_flight: None,
            last_used: Instant::now(),
            gc_time: Duration::MAX,
        }
    }

    pub(crate) fn touch(&mut self, now: Instant, gc_time: Duration) {
        self.last_used = now;
        self.gc_time = gc_time;
    }

    /// No fetch running and unused for its whole idle window.
    pub(crate) fn is_idle(&self, now: Instant) -> bool {
        self.in_flight.is_none() && now.saturating_duration_since(self.last_used) >= self.gc_time
    }

    /// Holds nothing worth keeping.
    pub(crate) fn is_vacant(&self) -> bool {
        self.value.is_none() && self.in_flight.is_none()
    }

    pub(crate) fn is_fresh(&self, now: Instant) -> bool {
        !self.invalidated
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) < self.stale_time)
    }

    pub(crate) fn status(&self, now: Instant) -> EntryStatus {
        if self.in_flight.is_some() {
            EntryStatus::Fetching
        } else if self.value.is_none() {
            EntryStatus::Empty
        } else if self.is_fresh(now) {
            EntryStatus::Fresh
        } else {
            EntryStatus::Stale
        }
    }

    /// Join the running fetch, starting one if there is none.
    pub(crate) fn join(&mut self) -> Arc<InFlight> {
        let flight = self
            .in_flight
            .get_or_insert_with(|| Arc::new(InFlight::new()))
            .clone();
        flight.waiters.fetch_add(1, Ordering::AcqRel);
        flight
    }

    pub(crate) fn is_current(&self, flight: &Arc<InFlight>) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, flight))
    }

    pub(crate) fn store(&mut self, value: Value, stale_time: Duration, now: Instant) {
        self.value = Some(value);
        self.fetched_at = Some(now);
        self.stale_time = stale_time;
        self.invalidated = false;
    }

    /// Mark stale and detach any running fetch so its result is not committed.
    pub(crate) fn invalidate(&mut self) {
        self.invalidated = true;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_status_transitions() {
        let mut state = EntryState::new();
        let now = Instant::now();
        assert_eq!(state.status(now), EntryStatus::Empty);

        let flight = state.join();
        assert_eq!(state.status(now), EntryStatus::Fetching);
        assert!(state.is_current(&flight));

        state.in_flight = None;
        state.store(Arc::new(1u32), Duration::from_secs(60), now);
        assert_eq!(state.status(now), EntryStatus::Fresh);
        assert_eq!(
            state.status(now + Duration::from_secs(60)),
            EntryStatus::Stale
        );

        state.invalidate();
        assert_eq!(state.status(now), EntryStatus::Stale);
        assert!(!state.is_current(&flight));
    }

    #[test]
    fn test_zero_window_is_never_fresh() {
        let mut state = EntryState::new();
        let now = Instant::now();
        state.store(Arc::new("x"), Duration::ZERO, now);
        assert!(!state.is_fresh(now));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_after_gc_window() {
        let mut state = EntryState::new();
        let now = Instant::now();
        assert!(!state.is_idle(now + Duration::from_secs(3600)));

        state.touch(now, Duration::from_secs(60));
        assert!(!state.is_idle(now + Duration::from_secs(59)));
        assert!(state.is_idle(now + Duration::from_secs(60)));

        let _flight = state.join();
        assert!(!state.is_idle(now + Duration::from_secs(60)));
        assert!(!state.is_vacant());
    }

    #[test]
    fn test_join_reuses_flight() {
        let mut state = EntryState::new();
        let a = state.join();
        let b = state.join();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.leave());
        assert!(b.leave());
    }
}
