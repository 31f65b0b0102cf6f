//! Owner polling tracker
//!
//! Remembers when each owner address was last queried so that overly
//! frequent polling shows up in the logs. Purely advisory: nothing here
//! delays or rejects a request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::sync::Cache;
use tracing::{debug, warn};

/// Upper bound on tracked owners
const MAX_TRACKED_OWNERS: u64 = 10_000;

/// Last-access map keyed by owner address
pub struct ThrottleTracker {
    /// Last access time by owner address
    access: Cache<String, Instant>,
    /// Minimum polling interval before a diagnostic is logged
    interval: Duration,
    /// Number of queries that arrived inside the interval
    frequent_polls: AtomicU64,
}

impl ThrottleTracker {
    /// Create an empty tracker
    ///
    /// # Arguments
    /// * `interval` - polls closer together than this are reported
    pub fn new(interval: Duration) -> Self {
        let access = Cache::builder()
            .max_capacity(MAX_TRACKED_OWNERS)
            .name("owner_access")
            .build();

        Self {
            access,
            interval,
            frequent_polls: AtomicU64::new(0),
        }
    }

    /// Check an owner before querying it
    ///
    /// Returns the time since the previous query when it falls inside the
    /// polling interval, None otherwise.
    pub fn check(&self, address: &str) -> Option<Duration> {
        let last = self.access.get(address)?;
        let elapsed = last.elapsed();

        if elapsed < self.interval {
            self.frequent_polls.fetch_add(1, Ordering::Relaxed);
            warn!(
                owner = address,
                elapsed_ms = elapsed.as_millis() as u64,
                "Polling marketplace very frequently"
            );
            return Some(elapsed);
        }

        debug!(owner = address, elapsed_ms = elapsed.as_millis() as u64, "Owner last polled");
        None
    }

    /// Record a completed query for an owner
    pub fn record(&self, address: &str) {
        self.access.insert(address.to_string(), Instant::now());
    }

    /// When an owner was last queried
    pub fn last_access(&self, address: &str) -> Option<Instant> {
        self.access.get(address)
    }

    /// Number of owners currently tracked
    pub fn tracked_owners(&self) -> u64 {
        self.access.run_pending_tasks();
        self.access.entry_count()
    }

    /// Number of queries that arrived inside the polling interval
    pub fn frequent_polls(&self) -> u64 {
        self.frequent_polls.load(Ordering::Relaxed)
    }

    /// Forget all owners
    pub fn clear(&self) {
        self.access.invalidate_all();
        self.frequent_polls.store(0, Ordering::Relaxed);
        debug!("Cleared owner access records");
    }
}
