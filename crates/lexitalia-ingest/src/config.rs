//! Ingestion settings, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lexitalia_crawl::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::IngestError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Site root; relative locators resolve against it.
    pub base_url: String,
    pub user_agent: String,

    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,

    /// Minimum spacing between request issuances (in milliseconds)
    pub min_delay_ms: u64,

    /// Retries after the first attempt for transport errors and 429/5xx answers
    pub max_retries: u32,

    /// First backoff step (in milliseconds); doubles per retry
    pub backoff_base_ms: u64,

    /// Article fetches in flight per batch
    pub batch_width: usize,

    /// Save the census after this many processed Acts
    pub checkpoint_every: usize,

    /// Pause between Acts (in milliseconds)
    pub act_pause_ms: u64,

    /// Pause between passes (in milliseconds)
    pub pass_pause_ms: u64,

    /// Total passes; later passes retry only failed Acts
    pub passes: u32,

    /// Minimum share of article targets that must succeed for `partial`
    pub partial_threshold: f64,

    pub seeds_dir: PathBuf,
    pub census_path: PathBuf,

    /// Also ingest Acts classified `pre_republic`
    pub include_pre_republic: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.normattiva.it".into(),
            user_agent: concat!("lexitalia/", env!("CARGO_PKG_VERSION")).into(),
            request_timeout_secs: 30,
            min_delay_ms: 1_000,
            max_retries: 3,
            backoff_base_ms: 2_000,
            batch_width: 4,
            checkpoint_every: 10,
            act_pause_ms: 2_000,
            pass_pause_ms: 60_000,
            passes: 1,
            partial_threshold: 0.5,
            seeds_dir: PathBuf::from("data/seeds"),
            census_path: PathBuf::from("data/census.json"),
            include_pre_republic: false,
        }
    }
}

impl IngestConfig {
    /// Parse a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IngestError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, IngestError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_width == 0 {
            return Err(IngestError::Config("batch_width must be at least 1".into()));
        }
        if self.checkpoint_every == 0 {
            return Err(IngestError::Config("checkpoint_every must be at least 1".into()));
        }
        if self.passes == 0 {
            return Err(IngestError::Config("passes must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.partial_threshold) {
            return Err(IngestError::Config(format!(
                "partial_threshold must be within 0..=1, got {}",
                self.partial_threshold
            )));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| IngestError::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn act_pause(&self) -> Duration {
        Duration::from_millis(self.act_pause_ms)
    }

    pub fn pass_pause(&self) -> Duration {
        Duration::from_millis(self.pass_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(IngestConfig::from_toml("").unwrap(), IngestConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = IngestConfig::from_toml(
            r#"
            min_delay_ms = 250
            passes = 3
            seeds_dir = "/tmp/seeds"
            include_pre_republic = true
            "#,
        )
        .unwrap();
        assert_eq!(config.min_delay(), Duration::from_millis(250));
        assert_eq!(config.passes, 3);
        assert_eq!(config.seeds_dir, PathBuf::from("/tmp/seeds"));
        assert!(config.include_pre_republic);
        assert_eq!(config.batch_width, 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            IngestConfig::from_toml("batch_width = 0"),
            Err(IngestError::Config(_))
        ));
        assert!(matches!(
            IngestConfig::from_toml("partial_threshold = 1.5"),
            Err(IngestError::Config(_))
        ));
        assert!(matches!(
            IngestConfig::from_toml("passes = \"two\""),
            Err(IngestError::ConfigFormat(_))
        ));
    }

    #[test]
    fn session_config_carries_retry_policy() {
        let config = IngestConfig {
            max_retries: 5,
            backoff_base_ms: 100,
            ..IngestConfig::default()
        };
        let session = config.session_config();
        assert_eq!(session.max_retries, 5);
        assert_eq!(session.backoff(2), Duration::from_millis(400));
    }
}
