//! Fetcher trait for looking up the versions of a release

#[cfg(test)]
use mockall::automock;

use crate::progress::error::FetchError;
use crate::progress::types::ReleaseConfig;

/// Trait for fetching the versions of a release from its source
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionFetcher: Send + Sync {
    /// Fetches the version currently on the release's development line
    async fn get_develop_version(&self, release: &ReleaseConfig) -> Result<String, FetchError>;

    /// Fetches the version of the latest formal release
    async fn get_released_version(&self, release: &ReleaseConfig) -> Result<String, FetchError>;

    /// Fetches the earliest minor release that contains `released_version`
    ///
    /// # Arguments
    /// * `release` - The release being looked up
    /// * `released_version` - A version returned by `get_released_version`
    async fn get_first_released_minor_version(
        &self,
        release: &ReleaseConfig,
        released_version: &str,
    ) -> Result<String, FetchError>;
}
