//! Fetcher implementations for looking up release versions

pub mod github;

pub use github::GitHubVersionFetcher;
