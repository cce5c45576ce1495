//! Keyed query cache with request de-duplication, staleness windows and
//! prefix invalidation.
//!
//! Reads go through [`QueryCache::query`]. Concurrent reads of one key share a
//! single fetch. Values younger than their stale window are served without a
//! request. Aged values are served immediately while a background refetch
//! runs. Invalidated or missing values wait for the refetch, and fall back to
//! the last good value if that refetch fails.
//!
//! Entries left unused for their idle window are evicted when new keys are
//! inserted, and a read that failed with nothing cached leaves no entry.

mod entry;
mod key;
mod observer;

pub use entry::EntryStatus;
pub use key::{KeyPart, QueryKey};
pub use observer::{QueryObserver, QueryState};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::time::{Duration, Instant};

use crate::errors::{ClientError, ClientResult};
use entry::{EntryState, InFlight, Outcome, Value};

/// Idle window used unless a query's stale window is longer.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

/// Per-query behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a fetched value is served without contacting the backend.
    pub stale_time: Duration,
    /// How long an unused entry is kept before it may be evicted.
    pub gc_time: Duration,
}

impl QueryOptions {
    /// Idle window is the longer of `stale_time` and [`DEFAULT_GC_TIME`].
    pub const fn stale_for(stale_time: Duration) -> Self {
        let gc_time = if stale_time.as_nanos() > DEFAULT_GC_TIME.as_nanos() {
            stale_time
        } else {
            DEFAULT_GC_TIME
        };
        Self {
            stale_time,
            gc_time,
        }
    }

    pub const fn minutes(minutes: u64) -> Self {
        Self::stale_for(Duration::from_secs(minutes * 60))
    }

    pub const fn gc_for(self, gc_time: Duration) -> Self {
        Self { gc_time, ..self }
    }
}

type Slot = Arc<Mutex<EntryState>>;

struct Inner {
    entries: RwLock<HashMap<QueryKey, Slot>>,
    default_stale_time: Duration,
}

/// Shared, cloneable handle to the cache.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("default_stale_time", &self.inner.default_stale_time)
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn downcast<T: Send + Sync + 'static>(value: Value, key: &QueryKey) -> Option<Arc<T>> {
    match value.downcast::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Cached value for {} has an unexpected type", key);
            None
        }
    }
}

fn erase<T: Send + Sync + 'static>(value: T) -> Value {
    Arc::new(value)
}

/// Remove idle entries. A slot held outside the map is in use and stays.
fn sweep(entries: &mut HashMap<QueryKey, Slot>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, slot| Arc::strong_count(slot) > 1 || !lock(slot).is_idle(now));
    before - entries.len()
}

/// Releases one waiter's hold on an in-flight fetch. The last waiter out
/// detaches a fetch that never finished so the next read starts over.
struct FlightGuard {
    slot: Slot,
    flight: Arc<InFlight>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.slot);
        if self.flight.leave() && !self.flight.is_done() && state.is_current(&self.flight) {
            tracing::debug!("Abandoned fetch detached");
            state.in_flight = None;
        }
    }
}

impl QueryCache {
    pub fn new(default_stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(HashMap::new()),
                default_stale_time,
            }),
        }
    }

    /// Options using the cache-wide default stale window.
    pub fn default_options(&self) -> QueryOptions {
        QueryOptions::stale_for(self.inner.default_stale_time)
    }

    fn slot(&self, key: &QueryKey) -> Slot {
        if let Some(slot) = self.existing(key) {
            return slot;
        }
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            let evicted = sweep(&mut entries, Instant::now());
            if evicted > 0 {
                tracing::debug!("Evicted {} idle entries", evicted);
            }
        }
        entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(EntryState::new())))
            .clone()
    }

    fn existing(&self, key: &QueryKey) -> Option<Slot> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn matching(&self, prefix: &QueryKey) -> Vec<Slot> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, slot)| slot.clone())
            .collect()
    }

    /// Read `key`, fetching with `fetch` when the cached value can't be used.
    ///
    /// The fetcher must be `'static` because an aged value triggers a
    /// background refetch that outlives this call.
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> ClientResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let slot = self.slot(&key);
        let (flight, fallback) = {
            let mut state = lock(&slot);
            let now = Instant::now();
            state.touch(now, options.gc_time);
            let cached = state.value.clone().and_then(|v| downcast::<T>(v, &key));
            match cached {
                Some(value) if state.is_fresh(now) => {
                    tracing::trace!("Cache hit for {}", key);
                    return Ok(value);
                }
                Some(value) if !state.invalidated => {
                    if state.in_flight.is_none() {
                        tracing::debug!("Serving stale {} while refetching", key);
                        let flight = state.join();
                        self.revalidate(key, slot.clone(), flight, options, fetch);
                    }
                    return Ok(value);
                }
                cached => (state.join(), cached),
            }
        };
        let guard = FlightGuard {
            slot: slot.clone(),
            flight: flight.clone(),
        };

        let outcome = flight
            .run(move || async move { fetch().await.map(erase) })
            .await;
        self.commit(&key, &slot, &flight, &outcome, options.stale_time);
        drop(guard);
        if outcome.is_err() {
            self.discard_if_vacant(&key, &slot);
        }

        match outcome {
            Ok(value) => downcast::<T>(value, &key).ok_or_else(|| {
                ClientError::Validation(format!(
                    "Cache key {} is shared by queries of different types",
                    key
                ))
            }),
            Err(e) => match fallback {
                Some(value) => {
                    tracing::warn!("Refetch of {} failed, serving last good value: {}", key, e);
                    Ok(value)
                }
                None => Err(e),
            },
        }
    }

    fn revalidate<T, F, Fut>(
        &self,
        key: QueryKey,
        slot: Slot,
        flight: Arc<InFlight>,
        options: QueryOptions,
        fetch: F,
    ) where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            let _guard = FlightGuard {
                slot: slot.clone(),
                flight: flight.clone(),
            };
            let outcome = flight
                .run(move || async move { fetch().await.map(erase) })
                .await;
            if let Err(e) = &outcome {
                tracing::warn!("Background refresh of {} failed: {}", key, e);
            }
            cache.commit(&key, &slot, &flight, &outcome, options.stale_time);
        });
    }

    fn commit(
        &self,
        key: &QueryKey,
        slot: &Slot,
        flight: &Arc<InFlight>,
        outcome: &Outcome,
        stale_time: Duration,
    ) {
        let mut state = lock(slot);
        if !state.is_current(flight) {
            tracing::trace!("Result for {} already committed or superseded", key);
            return;
        }
        state.in_flight = None;
        if let Ok(value) = outcome {
            state.store(value.clone(), stale_time, Instant::now());
            tracing::debug!("Cached {}", key);
        }
    }

    /// Drop the entry for `key` if it is still `slot`, holds neither a value
    /// nor a fetch, and nobody else is using it.
    fn discard_if_vacant(&self, key: &QueryKey, slot: &Slot) {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let vacant = entries
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
            // The map and the caller.
            && Arc::strong_count(slot) == 2
            && lock(slot).is_vacant();
        if vacant {
            entries.remove(key);
            tracing::trace!("Dropped empty entry {}", key);
        }
    }

    /// Run a mutation and invalidate `invalidates` only if it succeeds.
    pub async fn mutate<T, Fut>(&self, invalidates: &[QueryKey], mutation: Fut) -> ClientResult<T>
    where
        Fut: Future<Output = ClientResult<T>>,
    {
        match mutation.await {
            Ok(out) => {
                for prefix in invalidates {
                    self.invalidate(prefix);
                }
                Ok(out)
            }
            Err(e) => {
                tracing::warn!("Mutation failed, cache unchanged: {}", e);
                Err(e)
            }
        }
    }

    /// Mark every key under `prefix` stale. Fetches already running for those
    /// keys will not be committed. Returns the number of entries touched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let slots = self.matching(prefix);
        for slot in &slots {
            lock(slot).invalidate();
        }
        tracing::debug!("Invalidated {} entries under {}", slots.len(), prefix);
        slots.len()
    }

    pub fn invalidate_all(&self) -> usize {
        let slots: Vec<Slot> = self
            .inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for slot in &slots {
            lock(slot).invalidate();
        }
        slots.len()
    }

    /// Drop every key under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        tracing::debug!("Removed {} entries under {}", removed, prefix);
        removed
    }

    /// Seed `key` with a known value, as if it had just been fetched.
    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, value: T, options: QueryOptions) {
        let slot = self.slot(&key);
        let mut state = lock(&slot);
        let now = Instant::now();
        state.in_flight = None;
        state.touch(now, options.gc_time);
        state.store(erase(value), options.stale_time, now);
    }

    /// Current value of `key` without fetching, whatever its freshness.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let slot = self.existing(key)?;
        let value = lock(&slot).value.clone()?;
        downcast(value, key)
    }

    /// Evict every entry idle past its window. Returns the number evicted.
    pub fn evict_idle(&self) -> usize {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let evicted = sweep(&mut entries, Instant::now());
        tracing::debug!("Evicted {} idle entries", evicted);
        evicted
    }

    pub fn status(&self, key: &QueryKey) -> EntryStatus {
        self.existing(key)
            .map_or(EntryStatus::Empty, |slot| lock(&slot).status(Instant::now()))
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything. Running fetches finish into detached entries.
    pub fn clear(&self) {
        self.inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("Cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_key;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    /// Fetcher returning the call number after `delay`.
    fn counting(
        calls: &Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = ClientResult<usize>> + Send>>
           + Send
           + 'static {
        let calls = calls.clone();
        move || {
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(delay).await;
                Ok(n)
            })
        }
    }

    fn failing(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = ClientResult<usize>> + Send>>
           + Send
           + 'static {
        let calls = calls.clone();
        move || {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Api {
                    status: 500,
                    message: None,
                })
            })
        }
    }

    const WINDOW: QueryOptions = QueryOptions::minutes(5);

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["posts", "all", 1u32, 10u32, "newest"];

        let (a, b) = tokio::join!(
            cache.query(key.clone(), WINDOW, counting(&calls, Duration::from_millis(50))),
            cache.query(key.clone(), WINDOW, counting(&calls, Duration::from_millis(50))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a.unwrap(), 1);
        assert_eq!(*b.unwrap(), 1);
        assert_eq!(cache.status(&key), EntryStatus::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_value_served_without_fetch() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["tags"];

        let first = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        let second = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aged_value_served_then_refreshed() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["posts", "popular"];

        cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        let stale = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(*stale, 1);
        assert_eq!(cache.status(&key), EntryStatus::Fetching);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.peek::<usize>(&key).as_deref(), Some(&2));
        assert_eq!(cache.status(&key), EntryStatus::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_forces_refetch() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["posts", "all", 1u32, 10u32, "newest"];

        cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(cache.invalidate(&query_key!["posts"]), 1);
        assert_eq!(cache.invalidate(&query_key!["comments"]), 0);

        let value = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refetch_keeps_last_good_value() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["announcements", "count"];

        cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        cache.invalidate(&key);

        let value = cache
            .query(key.clone(), WINDOW, failing(&calls))
            .await
            .unwrap();
        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.status(&key), EntryStatus::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_without_value_is_returned() {
        let cache = QueryCache::default();
        let calls = counter();

        let err = cache
            .query(query_key!["users", "count"], WINDOW, failing(&calls))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_reader_does_not_wedge_key() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["posts", "single", "p1"];

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            cache.query(key.clone(), WINDOW, counting(&calls, Duration::from_secs(10))),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(cache.status(&key), EntryStatus::Empty);

        let value = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_during_fetch_discards_result() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["comments", "p1", 1u32, 10u32];

        let pending = {
            let cache = cache.clone();
            let key = key.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .query(key, WINDOW, counting(&calls, Duration::from_millis(50)))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(&query_key!["comments"]);

        let value = pending.await.unwrap().unwrap();
        assert_eq!(*value, 1);
        assert!(cache.peek::<usize>(&key).is_none());

        let fresh = cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(*fresh, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mutation_leaves_cache_alone() {
        let cache = QueryCache::default();
        let calls = counter();
        let key = query_key!["tags"];
        cache
            .query(key.clone(), WINDOW, counting(&calls, Duration::ZERO))
            .await
            .unwrap();

        let result: ClientResult<()> = cache
            .mutate(&[query_key!["tags"]], async {
                Err(ClientError::Api {
                    status: 409,
                    message: None,
                })
            })
            .await;
        assert!(result.unwrap_err().is_conflict());
        assert_eq!(cache.status(&key), EntryStatus::Fresh);

        cache
            .mutate(&[query_key!["tags"]], async { Ok(()) })
            .await
            .unwrap();
        assert_eq!(cache.status(&key), EntryStatus::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_remove_and_clear() {
        let cache = QueryCache::default();
        cache.set(query_key!["posts", "single", "a"], 7u32, WINDOW);
        cache.set(query_key!["posts", "vote", "a"], 1u32, WINDOW);
        cache.set(query_key!["tags"], 3u32, WINDOW);

        assert_eq!(cache.peek::<u32>(&query_key!["posts", "single", "a"]).as_deref(), Some(&7));
        assert!(cache.peek::<String>(&query_key!["tags"]).is_none());

        assert_eq!(cache.remove(&query_key!["posts"]), 2);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reads_leave_no_entries() {
        let cache = QueryCache::default();
        let calls = counter();

        for id in 0..500u32 {
            let err = cache
                .query(query_key!["posts", "single", id], WINDOW, failing(&calls))
                .await
                .unwrap_err();
            assert_eq!(err.status(), Some(500));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 500);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_entries_evicted() {
        let cache = QueryCache::default();
        let calls = counter();
        let short = QueryOptions::stale_for(Duration::from_secs(30)).gc_for(Duration::from_secs(60));
        let idle = query_key!["posts", "all", 1u32, 10u32, "newest"];
        let busy = query_key!["tags"];

        cache
            .query(idle.clone(), short, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        cache.set(busy.clone(), 3u32, QueryOptions::minutes(30));
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.evict_idle(), 0);

        // Inserting a new key sweeps the idle one.
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.set(query_key!["announcements", "count"], 1u32, WINDOW);
        assert_eq!(cache.len(), 2);
        assert!(cache.peek::<usize>(&idle).is_none());
        assert_eq!(cache.peek::<u32>(&busy).as_deref(), Some(&3));

        // A thirty-minute stale window keeps `tags` at least that long.
        tokio::time::advance(Duration::from_secs(28 * 60)).await;
        assert_eq!(cache.evict_idle(), 1);
        assert_eq!(cache.peek::<u32>(&busy).as_deref(), Some(&3));
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.evict_idle(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_gc_window_covers_stale_window() {
        assert_eq!(QueryOptions::minutes(2).gc_time, DEFAULT_GC_TIME);
        assert_eq!(
            QueryOptions::minutes(30).gc_time,
            Duration::from_secs(30 * 60)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_window_serves_and_revalidates() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = counter();
        let key = query_key!["posts", "total"];
        let options = cache.default_options();

        cache
            .query(key.clone(), options, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        let again = cache
            .query(key.clone(), options, counting(&calls, Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(*again, 1);

        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
