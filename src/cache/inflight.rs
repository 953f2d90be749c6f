//! In-flight request de-duplication.
//!
//! The first caller for a key registers a shared future; later callers for the
//! same key await that future instead of issuing their own request. The map
//! only holds weak handles: once every caller has gone away the request is
//! dropped with them, and a later caller starts a new one. The entry is
//! removed when the underlying future settles or is dropped.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, WeakShared};
use metrics::counter;
use tracing::debug;

use super::keys::CacheKey;

pub(crate) const METRIC_INFLIGHT_JOIN: &str = "presswire_inflight_join_total";

pub type SharedFetch<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

struct Pending<T, E> {
    id: u64,
    fetch: Option<WeakShared<BoxFuture<'static, Result<T, E>>>>,
}

type PendingMap<T, E> = DashMap<CacheKey, Pending<T, E>>;

pub struct InFlight<T, E> {
    requests: Arc<PendingMap<T, E>>,
    next_id: AtomicU64,
}

impl<T, E> Default for InFlight<T, E> {
    fn default() -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T, E> InFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the pending future for `key`, starting one with `start` when
    /// nothing live is in flight. The future is registered before it is polled.
    pub fn join_or_start<F, Fut>(&self, key: &CacheKey, start: F) -> SharedFetch<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        match self.requests.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let live = occupied.get().fetch.as_ref().and_then(WeakShared::upgrade);
                match live {
                    Some(shared) => {
                        counter!(METRIC_INFLIGHT_JOIN).increment(1);
                        debug!(key = %key, "Joining in-flight request");
                        shared
                    }
                    None => {
                        let (pending, shared) = self.register(key, start);
                        occupied.insert(pending);
                        shared
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (pending, shared) = self.register(key, start);
                vacant.insert(pending);
                shared
            }
        }
    }

    fn register<F, Fut>(&self, key: &CacheKey, start: F) -> (Pending<T, E>, SharedFetch<T, E>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let settle = Settle {
            id,
            key: key.clone(),
            requests: Arc::clone(&self.requests),
        };
        let request = start();
        let shared = async move {
            let _settle = settle;
            request.await
        }
        .boxed()
        .shared();
        let fetch = shared.downgrade();
        (Pending { id, fetch }, shared)
    }

    pub fn is_pending(&self, key: &CacheKey) -> bool {
        self.requests.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Drops its own in-flight entry once the request future finishes or is
/// dropped. A newer entry under the same key is left alone.
struct Settle<T, E> {
    id: u64,
    key: CacheKey,
    requests: Arc<PendingMap<T, E>>,
}

impl<T, E> Drop for Settle<T, E> {
    fn drop(&mut self) {
        self.requests.remove_if(&self.key, |_, pending| pending.id == self.id);
    }
}
