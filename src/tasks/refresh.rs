//! Background Refresh Task
//!
//! Periodically re-fetches every location resident in the cache so entries
//! stay warm without a caller waiting on the network.
//!
//! A ticker task snapshots the cache keys on each tick and feeds them into a
//! bounded channel drained by a fixed pool of worker tasks. The cache lock is
//! only held to snapshot keys and to store a finished fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::WeatherCache;
use crate::config::Config;
use crate::fetch::Fetcher;

/// Queued keys per worker before the ticker waits for capacity
const QUEUE_DEPTH_PER_WORKER: usize = 4;

// == Refresh Handle ==
/// Owns the ticker and worker tasks of one refresher.
///
/// Shutting down (or dropping) the handle aborts the ticker, so no further
/// ticks happen, and aborts the workers, abandoning in-flight fetches at
/// their next await point. Neither waits for the tasks to finish.
#[derive(Debug)]
pub struct RefreshHandle {
    ticker: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl RefreshHandle {
    // == Shutdown ==
    pub fn shutdown(&self) {
        self.ticker.abort();
        for worker in &self.workers {
            worker.abort();
        }
    }

    /// True once the ticker and every worker have stopped.
    pub fn is_finished(&self) -> bool {
        self.ticker.is_finished() && self.workers.iter().all(|w| w.is_finished())
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the refresher for one cache/fetcher pair.
///
/// The first tick fires after `config.refresh_initial_delay`, then every
/// `config.refresh_interval`. A failed fetch is logged and leaves the
/// existing entry untouched.
///
/// Must be called from within a tokio runtime.
///
/// # Example
/// ```ignore
/// let handle = spawn_refresh_task(cache.clone(), fetcher.clone(), &config);
/// // Later, on dispose:
/// handle.shutdown();
/// ```
pub fn spawn_refresh_task(
    cache: Arc<RwLock<WeatherCache>>,
    fetcher: Fetcher,
    config: &Config,
) -> RefreshHandle {
    let worker_count = config.refresh_workers.max(1);
    let period = config.refresh_interval.max(Duration::from_millis(1));
    let initial_delay = config.refresh_initial_delay;

    let (tx, rx) = mpsc::channel::<String>(worker_count * QUEUE_DEPTH_PER_WORKER);
    let rx = Arc::new(Mutex::new(rx));

    let workers: Vec<JoinHandle<()>> = (0..worker_count)
        .map(|id| {
            let rx = Arc::clone(&rx);
            let cache = Arc::clone(&cache);
            let fetcher = fetcher.clone();
            tokio::spawn(async move {
                loop {
                    // Hold the receiver only while waiting for the next key
                    let next = rx.lock().await.recv().await;
                    let Some(location) = next else {
                        debug!("Refresh worker {} exiting: queue closed", id);
                        break;
                    };
                    refresh_location(&cache, &fetcher, &location).await;
                }
            })
        })
        .collect();

    let ticker = tokio::spawn(async move {
        info!(
            "Starting refresh task: first tick in {:?}, then every {:?}, {} workers",
            initial_delay, period, worker_count
        );

        let mut interval = interval_at(Instant::now() + initial_delay, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let locations = cache.read().await.keys();
            debug!("Refresh tick: {} cached locations", locations.len());

            for location in locations {
                if tx.send(location).await.is_err() {
                    return;
                }
            }
        }
    });

    RefreshHandle { ticker, workers }
}

async fn refresh_location(cache: &RwLock<WeatherCache>, fetcher: &Fetcher, location: &str) {
    match fetcher.fetch(location).await {
        Ok(record) => {
            cache.write().await.put(location, record);
            debug!("Refreshed '{}'", location);
        }
        Err(e) => {
            warn!("Refresh failed for '{}': {}", location, e);
        }
    }
}
