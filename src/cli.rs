//! Command-line interface

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{AppConfig, config_path, log_path};
use crate::logging::{self, LogOptions};
use crate::progress::cache::SnapshotCache;
use crate::progress::fetchers::GitHubVersionFetcher;
use crate::progress::types::Snapshot;

/// Environment variable consulted when the config file has no GitHub token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Parser)]
#[command(name = "release-progress")]
#[command(version, about = "Track develop and released versions of a set of releases")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to stderr
    #[arg(long, global = true)]
    pub stderr: bool,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Fetch all releases once and print the snapshot as JSON
    Snapshot {
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Poll the snapshot and print it every time it is refreshed
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
        /// Stop after this many polls
        #[arg(long)]
        count: Option<u64>,
    },
}

/// Builds a cache backed by the GitHub fetcher from the loaded config
pub fn build_cache(config: &AppConfig, env_token: Option<String>) -> Result<SnapshotCache> {
    let token = config.github.token.clone().or(env_token);
    let fetcher = GitHubVersionFetcher::new(
        &config.github.base_url,
        token,
        Duration::from_millis(config.github.timeout),
    )
    .context("Failed to create GitHub client")?;

    let refresh_interval = config.cache.refresh_interval()?;

    Ok(SnapshotCache::new(Arc::new(fetcher), config.releases.clone())
        .with_refresh_interval(refresh_interval))
}

/// Writes the snapshot as a single JSON document followed by a newline
pub fn write_snapshot<W: Write>(out: &mut W, snapshot: &Snapshot, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, snapshot)?;
    } else {
        serde_json::to_writer(&mut *out, snapshot)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let _guard = logging::init(
        &log_path(),
        LogOptions {
            stderr: cli.stderr,
            json: cli.json_logs,
        },
    )?;

    let path = cli.config.unwrap_or_else(config_path);
    let config = AppConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!(
        "Loaded {} releases from {}",
        config.releases.len(),
        path.display()
    );

    let mut cache = build_cache(&config, std::env::var(GITHUB_TOKEN_ENV).ok())?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Snapshot { pretty } => {
            let snapshot = cache.get().await;
            write_snapshot(&mut stdout, &snapshot, pretty)?;
        }
        Command::Watch { every, count } => {
            watch(&mut cache, &mut stdout, Duration::from_secs(every), count).await?;
        }
    }

    Ok(())
}

/// Polls `cache` every `every` and writes each newly fetched snapshot
pub async fn watch<W: Write>(
    cache: &mut SnapshotCache,
    out: &mut W,
    every: Duration,
    count: Option<u64>,
) -> Result<()> {
    anyhow::ensure!(!every.is_zero(), "Poll period must be non-zero");

    let mut ticker = tokio::time::interval(every);
    let mut previous: Option<Snapshot> = None;
    let mut polls = 0;

    while count.is_none_or(|count| polls < count) {
        ticker.tick().await;
        polls += 1;

        let snapshot = cache.get().await;
        if previous.as_ref().is_some_and(|p| p.ptr_eq(&snapshot)) {
            continue;
        }
        write_snapshot(out, &snapshot, false)?;
        previous = Some(snapshot);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::fetcher::MockVersionFetcher;
    use chrono::TimeDelta;
    use crate::progress::types::{ReleaseConfig, ReleaseStatus};
    use rstest::rstest;

    #[rstest]
    #[case(&["release-progress", "snapshot"], Command::Snapshot { pretty: false })]
    #[case(&["release-progress", "snapshot", "--pretty"], Command::Snapshot { pretty: true })]
    #[case(&["release-progress", "watch"], Command::Watch { every: 10, count: None })]
    #[case(&["release-progress", "watch", "--every", "2", "--count", "3"], Command::Watch { every: 2, count: Some(3) })]
    fn cli_parses_commands(#[case] args: &[&str], #[case] expected: Command) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.command, expected);
    }

    #[rstest]
    #[case(&["release-progress", "watch", "--every", "0"])]
    #[case(&["release-progress", "watch", "--every", "-1"])]
    #[case(&["release-progress", "watch", "--count", "many"])]
    fn cli_rejects_invalid_watch_arguments(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn cli_parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "release-progress",
            "snapshot",
            "--config",
            "/etc/release-progress.json",
            "--stderr",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/release-progress.json")));
        assert!(cli.stderr);
        assert!(!cli.json_logs);
    }

    #[test]
    fn write_snapshot_emits_one_json_line() {
        let snapshot = Snapshot::new(vec![ReleaseStatus {
            name: "diego".to_string(),
            url: "https://github.com/cloudfoundry/diego-release".to_string(),
            develop_version: "v2.1.0-rc.1".to_string(),
            released_version: "v2.0.1".to_string(),
            first_minor_version: "v2.0.0".to_string(),
        }]);
        let mut out = Vec::new();

        write_snapshot(&mut out, &snapshot, false).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains(r#""releasedVersion":"v2.0.1""#));
    }

    #[tokio::test]
    async fn watch_prints_only_refreshed_snapshots() {
        let mut fetcher = MockVersionFetcher::new();
        fetcher
            .expect_get_develop_version()
            .times(1)
            .returning(|_| Ok("v2.1.0-rc.1".to_string()));
        fetcher
            .expect_get_released_version()
            .times(1)
            .returning(|_| Ok("v2.0.1".to_string()));
        fetcher
            .expect_get_first_released_minor_version()
            .times(1)
            .returning(|_, _| Ok("v2.0.0".to_string()));
        let mut cache = SnapshotCache::new(
            Arc::new(fetcher),
            vec![ReleaseConfig::new(
                "diego",
                "https://github.com/cloudfoundry/diego-release",
            )],
        );
        let mut out = Vec::new();

        watch(&mut cache, &mut out, Duration::from_millis(1), Some(3))
            .await
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains(r#""developVersion":"v2.1.0-rc.1""#));
    }

    #[tokio::test]
    async fn watch_rejects_zero_poll_period() {
        let mut fetcher = MockVersionFetcher::new();
        fetcher.expect_get_develop_version().times(0);
        let mut cache = SnapshotCache::new(Arc::new(fetcher), vec![]);
        let mut out = Vec::new();

        let result = watch(&mut cache, &mut out, Duration::ZERO, Some(1)).await;

        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn build_cache_rejects_non_positive_refresh_interval() {
        let mut config = AppConfig::parse(
            r#"{"releases": [{"name": "diego", "url": "https://github.com/cloudfoundry/diego-release"}]}"#,
        )
        .unwrap();
        config.cache.refresh_interval = i64::MIN;

        assert!(build_cache(&config, None).is_err());
    }

    #[test]
    fn build_cache_applies_configured_refresh_interval() {
        let config = AppConfig::parse(
            r#"{
                "releases": [{"name": "diego", "url": "https://github.com/cloudfoundry/diego-release"}],
                "cache": {"refreshInterval": 1500}
            }"#,
        )
        .unwrap();

        let cache = build_cache(&config, None).unwrap();

        assert_eq!(cache.refresh_interval(), TimeDelta::milliseconds(1500));
        assert_eq!(cache.releases(), config.releases.as_slice());
        assert!(cache.last_fetch().is_none());
    }
}
