//! Request coalescing: at most one in-flight computation per key.
//!
//! The first caller for a key spawns the work on the tokio runtime and
//! registers a shared handle to it; callers arriving while it runs await the
//! same handle. The entry is cleared when the work finishes, so the next call
//! after completion starts a fresh flight.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

type Flight<V> = Shared<BoxFuture<'static, Option<V>>>;

struct Flights<K, V> {
    entries: Mutex<HashMap<K, (u64, Flight<V>)>>,
    next_id: AtomicU64,
}

impl<K: Eq + Hash, V> Flights<K, V> {
    /// Remove the entry for `key` if it still belongs to flight `id`.
    fn finish(&self, key: &K, id: u64) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|(current, _)| *current == id) {
            entries.remove(key);
        }
    }
}

pub struct SingleFlight<K, V> {
    flights: Arc<Flights<K, V>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            flights: Arc::new(Flights {
                entries: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Run `make()` for `key`, or join the flight already running for it.
    ///
    /// `make` is only invoked when this caller starts the flight. The work
    /// keeps running if every caller stops waiting. Returns `None` only if
    /// the work panicked or the runtime is shutting down.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let flight = {
            let mut entries = self.flights.entries.lock().unwrap_or_else(|e| e.into_inner());
            match entries.get(&key) {
                Some((_, flight)) => flight.clone(),
                None => {
                    let id = self.flights.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(flight = id, "starting flight");
                    let flight = self.launch(key.clone(), id, make());
                    entries.insert(key, (id, flight.clone()));
                    flight
                }
            }
        };

        flight.await
    }

    fn launch<Fut>(&self, key: K, id: u64, work: Fut) -> Flight<V>
    where
        Fut: Future<Output = V> + Send + 'static,
    {
        let flights = Arc::clone(&self.flights);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let value = work.await;
            flights.finish(&task_key, id);
            value
        });

        let flights = Arc::clone(&self.flights);
        async move {
            match handle.await {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(flight = id, error = %err, "single-flight task did not complete");
                    flights.finish(&key, id);
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Number of keys with a flight currently registered.
    pub fn in_flight(&self) -> usize {
        let entries = self.flights.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }
}
