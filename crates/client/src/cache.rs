//! Request-coalescing, revalidating cache keyed by request path.
//!
//! Every key owns a [`watch`] channel carrying its [`Snapshot`]. Fetches run
//! as detached tasks and settle the entry themselves, so a caller that gives
//! up waiting never leaves an entry stuck in the loading state. Each entry
//! carries a generation counter: any write bumps it, and a response whose
//! request started under an older generation is dropped on arrival.
//!
//! A key never has more than one request in flight. A superseded request
//! stays registered until it settles, and whoever wants a fresh one waits
//! for it first.

use crate::error::{ClientError, Result};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared, join_all},
};
use parking_lot::Mutex;
use serde_json::Value;
use std::{
    collections::HashMap,
    future::Future,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::watch;

pub type FetchFuture = BoxFuture<'static, Result<Value>>;

/// Produces a fresh request for a key every time it is called
pub type Fetcher = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

type SharedFetch = Shared<FetchFuture>;

/// Boxes a closure into a [`Fetcher`]
pub fn fetcher<F, Fut>(f: F) -> Fetcher
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Observable state of one key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub data: Option<Value>,
    pub error: Option<ClientError>,
    /// A request is in flight and there is no data yet
    pub is_loading: bool,
    /// A request is in flight
    pub is_validating: bool,
}

/// The request running for a key and the generation it started under
struct InFlight {
    generation: u64,
    fetch: SharedFetch,
}

struct Entry {
    state: watch::Sender<Snapshot>,
    fetcher: Option<Fetcher>,
    in_flight: Option<InFlight>,
    generation: u64,
    fetched_at: Option<Instant>,
}

impl Entry {
    fn new() -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            state,
            fetcher: None,
            in_flight: None,
            generation: 0,
            fetched_at: None,
        }
    }

    fn is_fresh(&self, dedupe_interval: Duration) -> bool {
        self.fetched_at
            .is_some_and(|at| at.elapsed() < dedupe_interval)
    }

    /// Makes whatever request is in flight stale
    fn supersede(&mut self) {
        self.generation += 1;
    }
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Process-wide resource cache. Clones share the same entries.
#[derive(Clone)]
pub struct ResourceCache {
    entries: Entries,
    dedupe_interval: Duration,
}

impl ResourceCache {
    pub fn new(dedupe_interval: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            dedupe_interval,
        }
    }

    pub fn dedupe_interval(&self) -> Duration {
        self.dedupe_interval
    }

    /// Reads a key, fetching it when needed
    ///
    /// # Arguments
    /// * `key` - The cache key, or `None` for an inactive read
    /// * `fetcher` - Registered as the key's fetcher for later revalidation
    ///
    /// # Returns
    /// The key's state once any request it started or joined has settled.
    /// An inactive read returns an empty, non-loading snapshot and issues no
    /// request.
    pub async fn get(&self, key: Option<&str>, fetcher: Fetcher) -> Snapshot {
        let Some(key) = key else {
            return Snapshot::default();
        };

        loop {
            let (pending, current) = {
                let mut entries = self.entries.lock();
                let entry = entries.entry(key.to_owned()).or_insert_with(Entry::new);
                entry.fetcher = Some(Arc::clone(&fetcher));

                if let Some(in_flight) = &entry.in_flight {
                    let current = in_flight.generation == entry.generation;
                    (Some(in_flight.fetch.clone()), current)
                } else if entry.is_fresh(self.dedupe_interval) {
                    (None, true)
                } else {
                    (start_fetch(&self.entries, key, entry), true)
                }
            };

            match pending {
                Some(pending) => {
                    let _ = pending.await;
                    // A stale request only delays the fresh one
                    if current {
                        break;
                    }
                }
                None => break,
            }
        }
        self.peek(key)
    }

    /// Current state of a key without fetching
    pub fn peek(&self, key: &str) -> Snapshot {
        self.entries
            .lock()
            .get(key)
            .map(|e| e.state.borrow().clone())
            .unwrap_or_default()
    }

    pub fn data(&self, key: &str) -> Option<Value> {
        self.peek(key).data
    }

    /// Receiver observing every change to a key
    pub fn subscribe(&self, key: &str) -> watch::Receiver<Snapshot> {
        self.entries
            .lock()
            .entry(key.to_owned())
            .or_insert_with(Entry::new)
            .state
            .subscribe()
    }

    /// With a value, writes it immediately; without, forces a revalidation
    /// and waits for it
    pub async fn mutate(&self, key: &str, value: Option<Value>) -> Snapshot {
        match value {
            Some(value) => {
                self.set(key, Some(value));
                self.peek(key)
            }
            None => self.revalidate(key).await,
        }
    }

    /// Writes `data` without fetching, discarding any in-flight response
    pub fn set(&self, key: &str, data: Option<Value>) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_owned()).or_insert_with(Entry::new);
        entry.supersede();
        entry.fetched_at = Some(Instant::now());
        entry.state.send_modify(|s| {
            s.data = data;
            s.error = None;
            s.is_loading = false;
            s.is_validating = false;
        });
    }

    /// Sets a key's data to absent without refetching
    pub fn tombstone(&self, key: &str) {
        self.set(key, None);
    }

    /// Rewrites the cached value of a key in place
    ///
    /// # Returns
    /// `false` if the key holds no data, in which case nothing is written
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(Value) -> Value,
    {
        let Some(current) = self.data(key) else {
            return false;
        };
        self.set(key, Some(f(current)));
        true
    }

    /// Refetches a key with its registered fetcher once any request already
    /// in flight has settled. Keys that were never read, or were purged since,
    /// are left alone.
    pub async fn revalidate(&self, key: &str) -> Snapshot {
        self.force(key, None).await
    }

    /// Registers `fetcher` for the key and refetches with it
    pub async fn refresh(&self, key: &str, fetcher: Fetcher) -> Snapshot {
        self.force(key, Some(fetcher)).await
    }

    /// Waits out any request in flight, since it may predate the change
    /// being revalidated for, then starts a new one
    async fn force(&self, key: &str, fetcher: Option<Fetcher>) -> Snapshot {
        loop {
            let (pending, started) = {
                let mut entries = self.entries.lock();
                let entry = match &fetcher {
                    Some(fetcher) => {
                        let entry = entries.entry(key.to_owned()).or_insert_with(Entry::new);
                        entry.fetcher = Some(Arc::clone(fetcher));
                        entry
                    }
                    None => match entries.get_mut(key) {
                        Some(entry) if entry.fetcher.is_some() => entry,
                        _ => break,
                    },
                };

                if let Some(in_flight) = &entry.in_flight {
                    (Some(in_flight.fetch.clone()), false)
                } else {
                    (start_fetch(&self.entries, key, entry), true)
                }
            };

            let Some(pending) = pending else { break };
            let _ = pending.await;
            if started {
                break;
            }
        }
        self.peek(key)
    }

    /// Revalidates every key someone is subscribed to
    pub async fn revalidate_active(&self) -> usize {
        let keys: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, e)| e.fetcher.is_some() && e.state.receiver_count() > 0)
            .map(|(k, _)| k.clone())
            .collect();

        log::debug!("revalidating {} active keys", keys.len());
        join_all(keys.iter().map(|k| self.revalidate(k))).await;
        keys.len()
    }

    /// Resets every matching entry to empty, drops its in-flight response
    /// and forgets its fetcher, so nothing refetches it until it is read
    /// again
    ///
    /// # Returns
    /// How many entries were reset
    pub fn invalidate_all<P>(&self, predicate: P) -> usize
    where
        P: Fn(&str) -> bool,
    {
        let mut entries = self.entries.lock();
        let mut count = 0;

        for (key, entry) in entries.iter_mut() {
            if !predicate(key) {
                continue;
            }
            entry.supersede();
            entry.fetcher = None;
            entry.fetched_at = None;
            entry.state.send_replace(Snapshot::default());
            count += 1;
        }

        count
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

/// Spawns the key's fetcher and records it as in flight. Called with the
/// entries lock held.
fn start_fetch(entries: &Entries, key: &str, entry: &mut Entry) -> Option<SharedFetch> {
    let fetcher = entry.fetcher.clone()?;
    let generation = entry.generation;
    let request = fetcher();

    let task_entries = Arc::clone(entries);
    let task_key = key.to_owned();
    let handle = tokio::spawn(async move {
        let result = match AssertUnwindSafe(request).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Task(format!("fetcher for {task_key} panicked"))),
        };
        settle(&task_entries, &task_key, generation, &result);
        result
    });

    let shared = async move {
        handle
            .await
            .unwrap_or_else(|e| Err(ClientError::Task(e.to_string())))
    }
    .boxed()
    .shared();

    entry.in_flight = Some(InFlight {
        generation,
        fetch: shared.clone(),
    });
    entry.state.send_modify(|s| {
        s.is_validating = true;
        s.is_loading = s.data.is_none();
    });

    Some(shared)
}

/// Stores a fetch result unless the entry moved on while it was in flight
fn settle(entries: &Entries, key: &str, generation: u64, result: &Result<Value>) {
    let mut entries = entries.lock();
    let Some(entry) = entries.get_mut(key) else {
        return;
    };
    if entry
        .in_flight
        .as_ref()
        .is_some_and(|in_flight| in_flight.generation == generation)
    {
        entry.in_flight = None;
    }
    if entry.generation != generation {
        log::debug!("dropping stale response for {key}");
        return;
    }

    entry.fetched_at = Some(Instant::now());
    entry.state.send_modify(|s| {
        match result {
            Ok(value) => {
                s.data = Some(value.clone());
                s.error = None;
            }
            Err(e) => {
                log::debug!("fetch of {key} failed: {e}");
                s.error = Some(e.clone());
            }
        }
        s.is_loading = false;
        s.is_validating = false;
    });
}
