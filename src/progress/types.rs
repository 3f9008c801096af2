use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A release whose versions are tracked
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseConfig {
    /// Display label, unique within a configuration
    pub name: String,
    /// Source reference, e.g. "https://github.com/cloudfoundry/diego-release"
    pub url: String,
}

impl ReleaseConfig {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Versions of one release at the time of a fetch.
///
/// An empty field means the corresponding lookup failed during that fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStatus {
    pub name: String,
    pub url: String,
    pub develop_version: String,
    pub released_version: String,
    pub first_minor_version: String,
}

impl ReleaseStatus {
    /// Creates a status with every version field empty
    pub fn empty(release: &ReleaseConfig) -> Self {
        Self {
            name: release.name.clone(),
            url: release.url.clone(),
            ..Default::default()
        }
    }
}

/// Ordered statuses of all configured releases, one entry per release.
///
/// Cloning shares the underlying entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    releases: Arc<Vec<ReleaseStatus>>,
}

impl Snapshot {
    pub fn new(releases: Vec<ReleaseStatus>) -> Self {
        Self {
            releases: Arc::new(releases),
        }
    }

    pub fn releases(&self) -> &[ReleaseStatus] {
        &self.releases
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Returns true if both snapshots come from the same fetch
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.releases, &other.releases)
    }
}

/// The three per-release lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOperation {
    DevelopVersion,
    ReleasedVersion,
    FirstMinorVersion,
}

impl FetchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchOperation::DevelopVersion => "develop version",
            FetchOperation::ReleasedVersion => "released version",
            FetchOperation::FirstMinorVersion => "first released minor version",
        }
    }
}

impl fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
