//! Self-refreshing snapshot of release versions

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::progress::clock::{Clock, SystemClock};
use crate::progress::fetcher::VersionFetcher;
use crate::progress::observer::{FetchObserver, TracingObserver};
use crate::progress::types::{FetchOperation, ReleaseConfig, ReleaseStatus, Snapshot};

/// Default time a snapshot stays fresh
pub const DEFAULT_REFRESH_INTERVAL: TimeDelta = TimeDelta::minutes(1);

/// Serves the latest snapshot of the configured releases, rebuilding it at
/// most once per refresh interval.
///
/// `get` takes `&mut self`; callers sharing one cache between tasks wrap it
/// in a `tokio::sync::Mutex`, which also serializes refreshes.
pub struct SnapshotCache {
    fetcher: Arc<dyn VersionFetcher>,
    releases: Vec<ReleaseConfig>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn FetchObserver>,
    refresh_interval: TimeDelta,
    last_fetch: Option<DateTime<Utc>>,
    snapshot: Snapshot,
}

impl SnapshotCache {
    /// Creates a cache with the default refresh interval, wall clock and
    /// `tracing` diagnostics. Nothing is fetched until the first `get`.
    pub fn new(fetcher: Arc<dyn VersionFetcher>, releases: Vec<ReleaseConfig>) -> Self {
        Self {
            fetcher,
            releases,
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            last_fetch: None,
            snapshot: Snapshot::default(),
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: TimeDelta) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn releases(&self) -> &[ReleaseConfig] {
        &self.releases
    }

    pub fn refresh_interval(&self) -> TimeDelta {
        self.refresh_interval
    }

    /// Time of the last live fetch, `None` before the first `get`
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Returns the cached snapshot, fetching a new one first if none exists
    /// yet or the refresh interval has elapsed since the last fetch.
    ///
    /// Never fails: lookups that fail leave their fields empty.
    pub async fn get(&mut self) -> Snapshot {
        let now = self.clock.now();

        if !self.is_stale(now) {
            debug!("Returning cached snapshot from {:?}", self.last_fetch);
            return self.snapshot.clone();
        }

        self.observer.fetch_started(self.releases.len());
        // Only committed once the fetch completes, so a dropped future leaves
        // the cache stale rather than fresh with old data.
        let snapshot = self.fetch().await;
        self.last_fetch = Some(now);
        self.snapshot = snapshot;

        self.snapshot.clone()
    }

    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetch {
            None => true,
            Some(last_fetch) => now - last_fetch > self.refresh_interval,
        }
    }

    /// Builds a snapshot from scratch, one release at a time in configuration order
    async fn fetch(&self) -> Snapshot {
        let mut statuses = Vec::with_capacity(self.releases.len());
        for release in &self.releases {
            statuses.push(self.fetch_release(release).await);
        }
        Snapshot::new(statuses)
    }

    async fn fetch_release(&self, release: &ReleaseConfig) -> ReleaseStatus {
        let mut status = ReleaseStatus::empty(release);

        match self.fetcher.get_develop_version(release).await {
            Ok(version) => status.develop_version = version,
            Err(e) => {
                self.observer
                    .sub_fetch_failed(release, FetchOperation::DevelopVersion, &e)
            }
        }

        let released_version = match self.fetcher.get_released_version(release).await {
            Ok(version) => version,
            Err(e) => {
                self.observer
                    .sub_fetch_failed(release, FetchOperation::ReleasedVersion, &e);
                return status;
            }
        };

        match self
            .fetcher
            .get_first_released_minor_version(release, &released_version)
            .await
        {
            Ok(version) => status.first_minor_version = version,
            Err(e) => {
                self.observer
                    .sub_fetch_failed(release, FetchOperation::FirstMinorVersion, &e)
            }
        }

        status.released_version = released_version;
        status
    }
}
