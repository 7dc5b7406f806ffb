//! Cache Entry Module
//!
//! A memo entry is either a settled value or the shared handle of a call that
//! is still in flight.

use std::fmt;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

/// Shared handle to an in-flight underlying call. Every clone resolves to the
/// same outcome.
pub type InFlight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

// == Entry State ==
/// What a memo entry currently holds.
pub enum EntryState<V, E> {
    /// The underlying call has not settled yet. `generation` identifies this
    /// particular call so a late settlement never clobbers a newer entry.
    Pending {
        generation: u64,
        handle: InFlight<V, E>,
    },
    /// The call settled successfully.
    Resolved(V),
}

impl<V: fmt::Debug, E> fmt::Debug for EntryState<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryState::Pending { generation, .. } => f
                .debug_struct("Pending")
                .field("generation", generation)
                .finish_non_exhaustive(),
            EntryState::Resolved(value) => f.debug_tuple("Resolved").field(value).finish(),
        }
    }
}

// == Cache Entry ==
/// A single memo entry with its age bookkeeping.
#[derive(Debug)]
pub struct CacheEntry<V, E> {
    pub state: EntryState<V, E>,
    /// Insertion time, or last access time when refresh-on-access is enabled
    pub stamped_at: Instant,
    /// Effective TTL, None = never expires
    pub ttl: Option<Duration>,
}

impl<V, E> CacheEntry<V, E> {
    // == Constructors ==
    /// Creates a settled entry. A zero `ttl` means the entry never expires.
    pub fn resolved(value: V, ttl: Duration) -> Self {
        Self {
            state: EntryState::Resolved(value),
            stamped_at: Instant::now(),
            ttl: effective_ttl(ttl),
        }
    }

    /// Creates an entry for a call that is still in flight.
    pub fn pending(generation: u64, handle: InFlight<V, E>, ttl: Duration) -> Self {
        Self {
            state: EntryState::Pending { generation, handle },
            stamped_at: Instant::now(),
            ttl: effective_ttl(ttl),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, EntryState::Pending { .. })
    }

    /// Returns true if this is the in-flight entry of call `generation`.
    pub fn is_pending_generation(&self, generation: u64) -> bool {
        matches!(self.state, EntryState::Pending { generation: g, .. } if g == generation)
    }

    // == Is Expired ==
    /// Checks if the entry's age has reached its TTL.
    ///
    /// Pending entries never expire: the call they track is still running and
    /// dropping it would let a second call for the same key start.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        if self.is_pending() {
            return false;
        }
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.stamped_at) >= ttl,
            None => false,
        }
    }

    /// Resets the entry's age.
    pub fn refresh(&mut self) {
        self.stamped_at = Instant::now();
    }
}

fn effective_ttl(ttl: Duration) -> Option<Duration> {
    (!ttl.is_zero()).then_some(ttl)
}
