//! Memo Cache Module
//!
//! Wraps sync or async functions so their results are cached per argument
//! value, with an entry limit (LRU eviction), optional TTL, and single-flight
//! de-duplication of async calls that are still running.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures::future::{self, Either, FutureExt, Ready};
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, CanonicalJson, EntryState, InFlight, KeyStrategy, LruTracker,
};
use crate::error::{CacheError, Result};

/// Future returned by [`AsyncMemoized::call`]: either a settled cached value
/// or a handle to the single in-flight call for the key.
pub type MemoFuture<V, E> = Either<Ready<std::result::Result<V, E>>, InFlight<V, E>>;

// == Memo Options ==
/// Construction options for a [`MemoCache`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoOptions {
    /// Maximum number of resident entries, must be positive
    pub limit: usize,
    /// Default entry lifetime, zero = never expire
    pub ttl: Duration,
    /// Whether a hit resets the entry's age and LRU position
    pub refresh_on_access: bool,
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            ttl: Duration::ZERO,
            refresh_on_access: true,
        }
    }
}

// == Lookup Outcome ==
enum Lookup<V, E> {
    Hit(V),
    Joined(InFlight<V, E>),
    Miss,
}

// == Memo State ==
struct MemoState<V, E> {
    entries: HashMap<String, CacheEntry<V, E>>,
    lru: LruTracker,
    stats: CacheStats,
    next_generation: u64,
}

impl<V: Clone, E> MemoState<V, E> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            next_generation: 0,
        }
    }

    /// Looks up `key`. Callers that cannot join an in-flight call pass
    /// `joinable = false` and see a pending entry as a miss.
    fn lookup(&mut self, key: &str, refresh: bool, joinable: bool) -> Lookup<V, E> {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Lookup::Miss;
        };

        if entry.is_expired() {
            self.entries.remove(key);
            self.lru.forget(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            debug!("Memo entry expired: {}", key);
            return Lookup::Miss;
        }

        if !joinable && entry.is_pending() {
            self.stats.record_miss();
            return Lookup::Miss;
        }

        if refresh {
            entry.refresh();
            self.lru.promote(key);
        }

        match &entry.state {
            EntryState::Resolved(value) => {
                self.stats.record_hit();
                Lookup::Hit(value.clone())
            }
            EntryState::Pending { handle, .. } => {
                self.stats.record_join();
                Lookup::Joined(handle.clone())
            }
        }
    }

    /// Inserts or replaces the entry for `key`, evicting while a new key would
    /// exceed `limit`. The least recently used settled entry goes first; a
    /// pending entry is only evicted when nothing else is resident.
    fn store(&mut self, key: String, entry: CacheEntry<V, E>, limit: usize) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= limit {
                let Some(evicted) = self.eviction_candidate() else {
                    break;
                };
                self.entries.remove(&evicted);
                self.lru.forget(&evicted);
                self.stats.record_eviction();
                debug!("Memo entry evicted: {}", evicted);
            }
        }

        self.lru.promote(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    fn eviction_candidate(&self) -> Option<String> {
        let settled = self.lru.least_recent().find(|key| {
            self.entries
                .get(*key)
                .is_some_and(|entry| !entry.is_pending())
        });
        settled
            .or_else(|| self.lru.least_recent().next())
            .map(str::to_string)
    }

    /// Applies the outcome of call `generation` to its pending entry. A
    /// success replaces it with the value; a failure removes it so the next
    /// call retries. Entries that were evicted, cleared or replaced since the
    /// call started are left alone.
    fn settle(
        &mut self,
        key: &str,
        generation: u64,
        outcome: &std::result::Result<V, E>,
        ttl: Duration,
    ) {
        let still_pending = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_pending_generation(generation));
        if !still_pending {
            return;
        }

        match outcome {
            Ok(value) => {
                self.entries
                    .insert(key.to_string(), CacheEntry::resolved(value.clone(), ttl));
                self.lru.promote(key);
            }
            Err(_) => {
                self.abandon(key, generation);
                debug!("Memo call failed, entry dropped: {}", key);
            }
        }
    }

    /// Drops the pending entry of call `generation`, if it is still resident.
    fn abandon(&mut self, key: &str, generation: u64) {
        let still_pending = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_pending_generation(generation));
        if still_pending {
            self.entries.remove(key);
            self.lru.forget(key);
            self.stats.set_total_entries(self.entries.len());
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    fn generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

fn lock<V, E>(state: &Mutex<MemoState<V, E>>) -> MutexGuard<'_, MemoState<V, E>> {
    // The state is consistent after every mutation, so a poisoned lock is safe to reuse
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Memo Cache ==
/// Bounded, TTL-aware result cache shared by the functions it wraps.
///
/// Cloning yields another handle to the same entries.
///
/// Eviction prefers settled entries. Only when every resident entry is
/// pending is the least recently used pending one dropped; a later call for
/// that key then starts a second underlying call.
///
/// # Example
/// ```
/// use pokeview_cache::cache::{MemoCache, MemoOptions};
///
/// let cache: MemoCache<u64> = MemoCache::new(MemoOptions { limit: 2, ..Default::default() }).unwrap();
/// let double = cache.wrap(|x: u64| x * 2, None);
/// assert_eq!(double.call(21), 42);
/// assert_eq!(cache.len(), 1);
/// ```
pub struct MemoCache<V, E = Infallible> {
    state: Arc<Mutex<MemoState<V, E>>>,
    options: MemoOptions,
}

impl<V, E> Clone for MemoCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            options: self.options,
        }
    }
}

impl<V: Clone, E> MemoCache<V, E> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Errors
    /// `InvalidArgument` if `options.limit` is zero.
    pub fn new(options: MemoOptions) -> Result<Self> {
        if options.limit == 0 {
            return Err(CacheError::InvalidArgument(
                "Memo cache limit must be positive".to_string(),
            ));
        }

        Ok(Self {
            state: Arc::new(Mutex::new(MemoState::new())),
            options,
        })
    }


    // == Wrap ==
    /// Memoizes a synchronous function keyed by [`CanonicalJson`].
    ///
    /// `ttl_override` replaces the cache's default TTL for this function's
    /// entries.
    pub fn wrap<A, F>(&self, func: F, ttl_override: Option<Duration>) -> Memoized<A, V, E, F>
    where
        F: Fn(A) -> V,
        CanonicalJson: KeyStrategy<A>,
    {
        self.wrap_with_key(func, CanonicalJson, ttl_override)
    }

    /// Memoizes a synchronous function with a custom key strategy.
    pub fn wrap_with_key<A, F, K>(
        &self,
        func: F,
        keys: K,
        ttl_override: Option<Duration>,
    ) -> Memoized<A, V, E, F, K>
    where
        F: Fn(A) -> V,
        K: KeyStrategy<A>,
    {
        Memoized {
            cache: self.clone(),
            func,
            keys,
            ttl: ttl_override.unwrap_or(self.options.ttl),
            _args: PhantomData,
        }
    }

    // == Wrap Async ==
    /// Memoizes an asynchronous fallible function keyed by [`CanonicalJson`].
    ///
    /// Concurrent calls with equal arguments share one underlying call.
    /// Failures reach every caller that joined the call and are never cached.
    pub fn wrap_async<A, F, Fut>(
        &self,
        func: F,
        ttl_override: Option<Duration>,
    ) -> AsyncMemoized<A, V, E, F>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        CanonicalJson: KeyStrategy<A>,
    {
        self.wrap_async_with_key(func, CanonicalJson, ttl_override)
    }

    /// Memoizes an asynchronous function with a custom key strategy.
    pub fn wrap_async_with_key<A, F, Fut, K>(
        &self,
        func: F,
        keys: K,
        ttl_override: Option<Duration>,
    ) -> AsyncMemoized<A, V, E, F, K>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        K: KeyStrategy<A>,
    {
        AsyncMemoized {
            cache: self.clone(),
            func: Arc::new(func),
            keys,
            ttl: ttl_override.unwrap_or(self.options.ttl),
            _args: PhantomData,
        }
    }

    // == Clear ==
    /// Drops every entry. Calls still in flight complete for their callers
    /// but are no longer stored.
    pub fn clear(&self) {
        lock(&self.state).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if an unexpired entry (settled or pending) exists for `key`.
    /// Does not count as an access.
    pub fn contains_key(&self, key: &str) -> bool {
        lock(&self.state)
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }
}

// == Memoized ==
/// A synchronous function wrapped by a [`MemoCache`].
pub struct Memoized<A, V, E, F, K = CanonicalJson> {
    cache: MemoCache<V, E>,
    func: F,
    keys: K,
    ttl: Duration,
    _args: PhantomData<fn(A)>,
}

impl<A, V, E, F, K> Memoized<A, V, E, F, K>
where
    V: Clone,
    F: Fn(A) -> V,
    K: KeyStrategy<A>,
{
    /// Returns the cached result for `args`, computing and storing it on a miss.
    ///
    /// The lock is released while `func` runs, so two threads missing the same
    /// key may both compute it. An entry that an async wrapper left pending
    /// under the same key is replaced by the computed value.
    pub fn call(&self, args: A) -> V {
        let key = self.keys.derive(&args);
        let refresh = self.cache.options.refresh_on_access;

        if let Lookup::Hit(value) = lock(&self.cache.state).lookup(&key, refresh, false) {
            return value;
        }

        let value = (self.func)(args);
        lock(&self.cache.state).store(
            key,
            CacheEntry::resolved(value.clone(), self.ttl),
            self.cache.options.limit,
        );
        value
    }

    pub fn cache(&self) -> &MemoCache<V, E> {
        &self.cache
    }
}

// == Async Memoized ==
/// An asynchronous function wrapped by a [`MemoCache`].
pub struct AsyncMemoized<A, V, E, F, K = CanonicalJson> {
    cache: MemoCache<V, E>,
    func: Arc<F>,
    keys: K,
    ttl: Duration,
    _args: PhantomData<fn(A)>,
}

impl<A, V, E, F, Fut, K> AsyncMemoized<A, V, E, F, K>
where
    A: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
    K: KeyStrategy<A>,
{
    /// Returns the cached result for `args`.
    ///
    /// On a miss the pending call is registered before this method returns,
    /// so any later call with equal arguments joins it instead of starting
    /// another one. The wrapped function itself first runs when the returned
    /// future (or a joined clone) is polled, never while the cache is locked.
    pub fn call(&self, args: A) -> MemoFuture<V, E> {
        let key = self.keys.derive(&args);
        let mut state = lock(&self.cache.state);

        match state.lookup(&key, self.cache.options.refresh_on_access, true) {
            Lookup::Hit(value) => return Either::Left(future::ready(Ok(value))),
            Lookup::Joined(handle) => return Either::Right(handle),
            Lookup::Miss => {}
        }

        let generation = state.generation();
        let handle = self.in_flight(args, key.clone(), generation);
        state.store(
            key,
            CacheEntry::pending(generation, handle.clone(), self.ttl),
            self.cache.options.limit,
        );
        Either::Right(handle)
    }

    fn in_flight(&self, args: A, key: String, generation: u64) -> InFlight<V, E> {
        let func = Arc::clone(&self.func);
        let state: Weak<Mutex<MemoState<V, E>>> = Arc::downgrade(&self.cache.state);
        let ttl = self.ttl;

        async move {
            let call = async move { (*func)(args).await };
            let outcome = AssertUnwindSafe(call).catch_unwind().await;
            if let Some(shared) = state.upgrade() {
                let mut state = lock(&shared);
                match &outcome {
                    Ok(result) => state.settle(&key, generation, result, ttl),
                    Err(_) => {
                        state.abandon(&key, generation);
                        warn!("Memo call panicked, entry dropped: {}", key);
                    }
                }
            }
            outcome.unwrap_or_else(|payload| panic::resume_unwind(payload))
        }
        .boxed()
        .shared()
    }

    pub fn cache(&self) -> &MemoCache<V, E> {
        &self.cache
    }
}
