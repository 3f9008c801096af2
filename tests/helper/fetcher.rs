//! Fetcher and observer test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use release_progress::progress::error::FetchError;
use release_progress::progress::fetcher::VersionFetcher;
use release_progress::progress::observer::FetchObserver;
use release_progress::progress::types::{FetchOperation, ReleaseConfig};

/// Canned answers for one release; `None` makes the lookup fail
#[derive(Debug, Clone, Default)]
pub struct Answers {
    pub develop: Option<String>,
    pub released: Option<String>,
    pub first_minor: Option<String>,
}

/// Fake fetcher answering from a table and recording every call
#[derive(Default)]
pub struct FakeFetcher {
    answers: Mutex<HashMap<String, Answers>>,
    calls: Mutex<Vec<(FetchOperation, String)>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(
        self,
        name: &str,
        develop: Option<&str>,
        released: Option<&str>,
        first_minor: Option<&str>,
    ) -> Self {
        self.set_release(name, develop, released, first_minor);
        self
    }

    /// Replaces the answers for `name`
    pub fn set_release(
        &self,
        name: &str,
        develop: Option<&str>,
        released: Option<&str>,
        first_minor: Option<&str>,
    ) {
        self.answers.lock().unwrap().insert(
            name.to_string(),
            Answers {
                develop: develop.map(str::to_string),
                released: released.map(str::to_string),
                first_minor: first_minor.map(str::to_string),
            },
        );
    }

    pub fn calls(&self) -> Vec<(FetchOperation, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: FetchOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    fn answer(
        &self,
        operation: FetchOperation,
        release: &ReleaseConfig,
    ) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation, release.name.clone()));

        let answers = self.answers.lock().unwrap();
        let answer = answers.get(&release.name).and_then(|a| match operation {
            FetchOperation::DevelopVersion => a.develop.clone(),
            FetchOperation::ReleasedVersion => a.released.clone(),
            FetchOperation::FirstMinorVersion => a.first_minor.clone(),
        });
        answer.ok_or_else(|| {
            FetchError::InvalidResponse(format!("no {} for {}", operation, release.name))
        })
    }
}

#[async_trait]
impl VersionFetcher for FakeFetcher {
    async fn get_develop_version(&self, release: &ReleaseConfig) -> Result<String, FetchError> {
        self.answer(FetchOperation::DevelopVersion, release)
    }

    async fn get_released_version(&self, release: &ReleaseConfig) -> Result<String, FetchError> {
        self.answer(FetchOperation::ReleasedVersion, release)
    }

    async fn get_first_released_minor_version(
        &self,
        release: &ReleaseConfig,
        _released_version: &str,
    ) -> Result<String, FetchError> {
        self.answer(FetchOperation::FirstMinorVersion, release)
    }
}

/// Observer that records notifications
#[derive(Default)]
pub struct RecordingObserver {
    pub fetches: Mutex<Vec<usize>>,
    pub failures: Mutex<Vec<(String, FetchOperation)>>,
}

impl FetchObserver for RecordingObserver {
    fn fetch_started(&self, release_count: usize) {
        self.fetches.lock().unwrap().push(release_count);
    }

    fn sub_fetch_failed(
        &self,
        release: &ReleaseConfig,
        operation: FetchOperation,
        _error: &FetchError,
    ) {
        self.failures
            .lock()
            .unwrap()
            .push((release.name.clone(), operation));
    }
}

/// Release pointing at a GitHub repository named after it
pub fn release(name: &str) -> ReleaseConfig {
    ReleaseConfig::new(name, &format!("https://github.com/cloudfoundry/{}", name))
}
