//! Diagnostic sink notified about fetch activity

#[cfg(test)]
use mockall::automock;
use tracing::{error, info};

use crate::progress::error::FetchError;
use crate::progress::types::{FetchOperation, ReleaseConfig};

/// Receives notifications from `SnapshotCache` while it rebuilds a snapshot.
///
/// Notifications carry no control flow; implementations must not panic.
#[cfg_attr(test, automock)]
pub trait FetchObserver: Send + Sync {
    /// Called once at the start of every live fetch
    fn fetch_started(&self, release_count: usize);

    /// Called for every lookup that failed during a fetch
    fn sub_fetch_failed(
        &self,
        release: &ReleaseConfig,
        operation: FetchOperation,
        error: &FetchError,
    );
}

/// Forwards notifications to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn fetch_started(&self, release_count: usize) {
        info!("Fetching new data for {} releases", release_count);
    }

    fn sub_fetch_failed(
        &self,
        release: &ReleaseConfig,
        operation: FetchOperation,
        error: &FetchError,
    ) {
        error!(
            release = %release.name,
            operation = %operation,
            "Failed to get {} for {}: {}",
            operation,
            release.name,
            error
        );
    }
}
