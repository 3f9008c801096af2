//! Release progress tracking
//!
//! Fetches the develop, released and first-minor versions of every configured
//! release and keeps the result as a snapshot that is rebuilt at most once per
//! refresh interval.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│    Cache    │────▶│  Snapshot   │
//! │  (network)  │     │ (interval)  │     │  (ordered)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!                        ▼       ▼
//!                 ┌─────────┐ ┌──────────┐
//!                 │  Clock  │ │ Observer │
//!                 └─────────┘ └──────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: `SnapshotCache`, the time-based refresh policy
//! - [`fetcher`]: `VersionFetcher` trait for the three per-release lookups
//! - [`fetchers`]: Concrete fetcher implementations (GitHub)
//! - [`clock`]: Injectable time source
//! - [`observer`]: Diagnostic sink for fetch activity
//! - [`error`]: Error types for fetch operations
//! - [`semver`]: Version parsing helpers
//! - [`types`]: `ReleaseConfig`, `ReleaseStatus` and `Snapshot`

pub mod cache;
pub mod clock;
pub mod error;
pub mod fetcher;
pub mod fetchers;
pub mod observer;
pub mod semver;
pub mod types;
