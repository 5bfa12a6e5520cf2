//! Configuration for matching and transfers

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matching::DEFAULT_MATCH_THRESHOLD;
use crate::port::MIN_CALLS_PER_SECOND;
use crate::retry::RetryPolicy;

/// Configuration for playlist-bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchConfig,
    pub transfer: TransferConfig,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
}

/// Candidate search and acceptance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum score for a candidate to be accepted
    pub threshold: f64,
    /// Number of search results considered per track
    pub top_k: usize,
    /// Retry with a title-only query when the title + artist query finds nothing
    pub title_only_fallback: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            top_k: 10,
            title_only_fallback: true,
        }
    }
}

/// Orchestration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Maximum number of tracks matched concurrently
    pub concurrency: usize,
    /// Timeout applied to each individual port call
    pub call_timeout_ms: u64,
    /// Append to an existing playlist with the same title instead of creating one
    pub reuse_existing_playlist: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            call_timeout_ms: 10_000,
            reuse_existing_playlist: false,
        }
    }
}

impl TransferConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Request quota applied to outbound calls per platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Calls that may go out back to back
    pub burst: u32,
    /// Sustained calls per second
    pub per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 10,
            per_second: 5.0,
        }
    }
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("playlist-bridge").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if missing or unreadable
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring malformed config file: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            std::fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.matching.threshold) {
            return Err(Error::Config(format!(
                "matching.threshold must be within 0..=1, got {}",
                self.matching.threshold
            )));
        }
        if self.matching.top_k == 0 {
            return Err(Error::Config("matching.top_k must be at least 1".to_string()));
        }
        if self.transfer.concurrency == 0 {
            return Err(Error::Config(
                "transfer.concurrency must be at least 1".to_string(),
            ));
        }
        if self.transfer.call_timeout_ms == 0 {
            return Err(Error::Config(
                "transfer.call_timeout_ms must be positive".to_string(),
            ));
        }
        if self.rate_limit.burst == 0 {
            return Err(Error::Config("rate_limit.burst must be at least 1".to_string()));
        }
        let per_second = self.rate_limit.per_second;
        if !per_second.is_finite() || per_second < MIN_CALLS_PER_SECOND {
            return Err(Error::Config(format!(
                "rate_limit.per_second must be a finite value of at least {}, got {}",
                MIN_CALLS_PER_SECOND, per_second
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.matching.threshold, 0.55);
        assert_eq!(config.matching.top_k, 10);
        assert_eq!(config.transfer.concurrency, 5);
        assert_eq!(config.retry.max_retries, 3);
        assert!(!config.transfer.reuse_existing_playlist);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"transfer":{"concurrency":2},"matching":{"threshold":0.7}}"#)
                .unwrap();
        assert_eq!(config.transfer.concurrency, 2);
        assert_eq!(config.transfer.call_timeout_ms, 10_000);
        assert_eq!(config.matching.threshold, 0.7);
        assert_eq!(config.matching.top_k, 10);
        assert_eq!(config.rate_limit, RateLimitConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.transfer.concurrency = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.matching.threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.matching.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.per_second = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.per_second = 1e-20;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.per_second = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.per_second = MIN_CALLS_PER_SECOND;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_call_timeout() {
        let config = TransferConfig::default();
        assert_eq!(config.call_timeout(), Duration::from_secs(10));
    }
}
