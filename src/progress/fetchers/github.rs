//! GitHub Releases API fetcher implementation

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use semver::Version;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::progress::error::FetchError;
use crate::progress::fetcher::VersionFetcher;
use crate::progress::semver::{first_in_minor_line, parse_version};
use crate::progress::types::ReleaseConfig;

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Number of releases requested per listing page
const RELEASES_PER_PAGE: usize = 100;

/// Upper bound on listing pages read while looking for the start of a minor line
const MAX_RELEASE_PAGES: u32 = 10;

static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?/?$")
        .expect("valid repository URL pattern")
});

/// Response item from GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
}

impl Release {
    fn is_published(&self) -> bool {
        !self.prerelease && !self.draft
    }
}

/// Fetcher backed by the GitHub Releases API.
///
/// - develop version: newest pre-release on the first listing page
/// - released version: the repository's latest release
/// - first minor version: earliest published release on the released version's minor line,
///   paging back until an older minor line shows up (at most `MAX_RELEASE_PAGES` pages)
pub struct GitHubVersionFetcher {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubVersionFetcher {
    /// Creates a fetcher talking to `base_url`, authenticating with `token` if given
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("release-progress")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Extracts "owner/repo" from the release URL
    fn repository(release: &ReleaseConfig) -> Result<String, FetchError> {
        let captures = REPO_URL
            .captures(release.url.trim())
            .ok_or_else(|| FetchError::InvalidUrl(release.url.clone()))?;
        Ok(format!("{}/{}", &captures[1], &captures[2]))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<T, FetchError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!("GET {}", url);
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(subject.to_string()));
        }

        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|v| v.as_bytes() == b"0");
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || (status == reqwest::StatusCode::FORBIDDEN && rate_limit_exhausted)
        {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub response from {}: {}", url, e);
            FetchError::InvalidResponse(e.to_string())
        })
    }

    /// Lists one page of releases, newest first; pages start at 1
    async fn list_releases(&self, repository: &str, page: u32) -> Result<Vec<Release>, FetchError> {
        let url = format!("{}/repos/{}/releases", self.base_url, repository);
        let per_page = RELEASES_PER_PAGE.to_string();
        let page = page.to_string();
        self.get_json(
            &url,
            &[("per_page", per_page.as_str()), ("page", page.as_str())],
            repository,
        )
        .await
    }

    /// Collects published release tags, newest first, until the listing
    /// reaches a minor line older than `released` or runs out
    async fn published_tags_down_to(
        &self,
        repository: &str,
        released: &Version,
    ) -> Result<Vec<String>, FetchError> {
        let mut tags = Vec::new();

        for page in 1..=MAX_RELEASE_PAGES {
            let releases = self.list_releases(repository, page).await?;
            let last_page = releases.len() < RELEASES_PER_PAGE;
            let mut reached_older_line = false;

            for release in releases.into_iter().filter(Release::is_published) {
                if let Some(parsed) = parse_version(&release.tag_name) {
                    reached_older_line |=
                        (parsed.major, parsed.minor) < (released.major, released.minor);
                }
                tags.push(release.tag_name);
            }

            if last_page || reached_older_line {
                return Ok(tags);
            }
        }

        warn!(
            "Stopped listing releases of {} after {} pages",
            repository, MAX_RELEASE_PAGES
        );
        Ok(tags)
    }
}

#[async_trait::async_trait]
impl VersionFetcher for GitHubVersionFetcher {
    async fn get_develop_version(&self, release: &ReleaseConfig) -> Result<String, FetchError> {
        let repository = Self::repository(release)?;
        self.list_releases(&repository, 1)
            .await?
            .into_iter()
            .find(|r| r.prerelease && !r.draft)
            .map(|r| r.tag_name)
            .ok_or_else(|| FetchError::NotFound(format!("pre-release of {}", repository)))
    }

    async fn get_released_version(&self, release: &ReleaseConfig) -> Result<String, FetchError> {
        let repository = Self::repository(release)?;
        let url = format!("{}/repos/{}/releases/latest", self.base_url, repository);
        let latest: Release = self.get_json(&url, &[], &repository).await?;
        Ok(latest.tag_name)
    }

    async fn get_first_released_minor_version(
        &self,
        release: &ReleaseConfig,
        released_version: &str,
    ) -> Result<String, FetchError> {
        let repository = Self::repository(release)?;
        let released = parse_version(released_version).ok_or_else(|| {
            FetchError::NotFound(format!("minor line of unparseable {}", released_version))
        })?;
        let tags = self.published_tags_down_to(&repository, &released).await?;

        first_in_minor_line(released_version, &tags).ok_or_else(|| {
            FetchError::NotFound(format!(
                "minor release of {} containing {}",
                repository, released_version
            ))
        })
    }
}
