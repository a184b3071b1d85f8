//! Keyed cache of fetched collections.
//!
//! Every fetch takes a [`Ticket`] before the request goes out and hands it
//! back with the response. A response is stored only when its ticket is
//! newer than the stored entry and newer than the last invalidation of its
//! scope, so a slow response can never overwrite fresher data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dispatch_core::{Category, CategoryWithItems, Item, JobPage, Metrics, Truck};
use tracing::debug;

/// Family of cache keys; invalidating a scope drops every key in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    Jobs,
    Trucks,
    Items,
    Categories,
    CategoriesWithItems,
    Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Jobs(Option<NaiveDate>),
    Trucks,
    Items,
    Categories,
    CategoriesWithItems,
    Metrics(Option<NaiveDate>, Option<NaiveDate>),
}

impl QueryKey {
    pub fn scope(&self) -> QueryScope {
        match self {
            Self::Jobs(_) => QueryScope::Jobs,
            Self::Trucks => QueryScope::Trucks,
            Self::Items => QueryScope::Items,
            Self::Categories => QueryScope::Categories,
            Self::CategoriesWithItems => QueryScope::CategoriesWithItems,
            Self::Metrics(..) => QueryScope::Metrics,
        }
    }
}

/// A cached response.
#[derive(Debug, Clone, PartialEq)]
pub enum Cached {
    Jobs(JobPage),
    Trucks(Vec<Truck>),
    Items(Vec<Item>),
    Categories(Vec<Category>),
    CategoriesWithItems(Vec<CategoryWithItems>),
    Metrics(Metrics),
}

/// Issued by [`QueryCache::begin`]; later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Entry {
    ticket: Ticket,
    stored_at: Instant,
    value: Cached,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    /// Counter value at the last invalidation of each scope.
    floors: HashMap<QueryScope, u64>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    counter: AtomicU64,
    inner: Mutex<Inner>,
    stale_after: Option<Duration>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries older than `window` are treated as missing.
    pub fn with_staleness(window: Duration) -> Self {
        Self {
            stale_after: Some(window),
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a fetch for `key`.
    pub fn begin(&self, key: QueryKey) -> Ticket {
        let ticket = Ticket(self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(?key, ticket = ticket.0, "Query started");
        ticket
    }

    /// Store a response. Returns `false` when the response was superseded.
    pub fn complete(&self, key: QueryKey, ticket: Ticket, value: Cached) -> bool {
        let mut inner = self.lock();

        let floor = inner.floors.get(&key.scope()).copied().unwrap_or(0);
        if ticket.0 <= floor {
            debug!(?key, ticket = ticket.0, "Dropping response issued before invalidation");
            return false;
        }
        if let Some(existing) = inner.entries.get(&key) {
            if existing.ticket >= ticket {
                debug!(?key, ticket = ticket.0, "Dropping superseded response");
                return false;
            }
        }

        inner.entries.insert(
            key,
            Entry {
                ticket,
                stored_at: Instant::now(),
                value,
            },
        );
        true
    }

    /// Fresh cached value for `key`, if any.
    pub fn get(&self, key: &QueryKey) -> Option<Cached> {
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        if let Some(window) = self.stale_after {
            if entry.stored_at.elapsed() > window {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.get(key).is_some()
    }

    /// Drop every entry in `scope`. In-flight fetches of the scope that
    /// began before this call will not be stored. Returns the number of
    /// entries removed.
    pub fn invalidate(&self, scope: QueryScope) -> usize {
        let mark = self.counter.load(Ordering::SeqCst);
        let mut inner = self.lock();
        inner.floors.insert(scope, mark);
        let before = inner.entries.len();
        inner.entries.retain(|key, _| key.scope() != scope);
        let removed = before - inner.entries.len();
        debug!(?scope, removed, "Invalidated queries");
        removed
    }

    pub fn invalidate_all(&self) {
        let mark = self.counter.load(Ordering::SeqCst);
        let mut inner = self.lock();
        inner.entries.clear();
        for scope in [
            QueryScope::Jobs,
            QueryScope::Trucks,
            QueryScope::Items,
            QueryScope::Categories,
            QueryScope::CategoriesWithItems,
            QueryScope::Metrics,
        ] {
            inner.floors.insert(scope, mark);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
