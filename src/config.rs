//! Configuration for gramscope.
//!
//! All configuration is immutable after construction: `Settings` and
//! `Config` are built once at startup (defaults, then `gramscope.toml` if
//! present, then CLI overrides) and passed by reference into the components
//! that need them. There is no process-wide mutable settings object.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config filename looked up in the data directory and the working directory.
pub const CONFIG_FILENAME: &str = "gramscope.toml";

/// Runtime settings: directories and transport parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory for reports and logs.
    pub data_dir: PathBuf,
    /// Directory holding the saved session file.
    pub session_dir: PathBuf,
    /// Request timeout in seconds.
    pub request_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/results/instagram for reports and ~/.sessions for
        // session files. Falls back gracefully: Home dir -> Current dir.
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_dir: home.join("results").join("instagram"),
            session_dir: home.join(".sessions"),
            request_timeout: 30,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Ensure the data and session directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.session_dir)?;
        Ok(())
    }

    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Admission governor configuration.
///
/// Defaults stay well under the platform's observed ~200 requests/hour
/// ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Rolling-hour request quota.
    #[serde(default = "default_requests_per_hour")]
    pub requests_per_hour: u32,
    /// Minimum spacing between requests in seconds.
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: f64,
    /// Requests inside the burst window that trigger a cooldown.
    #[serde(default = "default_burst_limit")]
    pub burst_limit: u32,
    /// Cooldown length in seconds after a burst trips.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Add a random human-like delay to every admission.
    #[serde(default = "default_humanize")]
    pub humanize: bool,
}

fn default_requests_per_hour() -> u32 {
    180
}
fn default_min_delay_secs() -> f64 {
    2.0
}
fn default_burst_limit() -> u32 {
    10
}
fn default_cooldown_secs() -> u64 {
    60
}
fn default_humanize() -> bool {
    true
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            requests_per_hour: default_requests_per_hour(),
            min_delay_secs: default_min_delay_secs(),
            burst_limit: default_burst_limit(),
            cooldown_secs: default_cooldown_secs(),
            humanize: default_humanize(),
        }
    }
}

impl GovernorConfig {
    /// Minimum inter-request spacing as a Duration.
    pub fn min_delay(&self) -> Duration {
        Duration::from_secs_f64(self.min_delay_secs.max(0.0))
    }

    /// Burst cooldown as a Duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Retry/backoff configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per operation (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay before the first retry, in seconds.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
    /// Ceiling for any single retry delay, in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
    /// Exponential growth factor between attempts.
    #[serde(default = "default_exponential_base")]
    pub exponential_base: f64,
    /// Jitter fraction applied to each delay (0.3 = plus or minus 30%).
    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_secs() -> f64 {
    5.0
}
fn default_max_delay_secs() -> f64 {
    300.0
}
fn default_exponential_base() -> f64 {
    2.0
}
fn default_jitter_fraction() -> f64 {
    0.3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            exponential_base: default_exponential_base(),
            jitter_fraction: default_jitter_fraction(),
        }
    }
}

/// Anti-detection options for the HTTP layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StealthConfig {
    /// User agent configuration.
    /// - None: use the default gramscope user agent
    /// - "impersonate": randomly select from real browser user agents
    /// - any other string: use as a custom user agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Data collection limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectLimits {
    /// Maximum posts to analyze per investigation.
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,
}

fn default_max_posts() -> usize {
    50
}

impl Default for CollectLimits {
    fn default() -> Self {
        Self {
            max_posts: default_max_posts(),
        }
    }
}

/// Top-level configuration loaded from gramscope.toml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rate_limit: GovernorConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub stealth: StealthConfig,
    #[serde(default)]
    pub limits: CollectLimits,
}

impl Config {
    /// Load configuration, preferring ./gramscope.toml over
    /// <data_dir>/gramscope.toml. Missing files yield defaults.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let candidates = [PathBuf::from(CONFIG_FILENAME), data_dir.join(CONFIG_FILENAME)];

        for path in &candidates {
            if path.exists() {
                let raw = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&raw)?;
                debug!("Loaded configuration from {}", path.display());
                return Ok(config);
            }
        }

        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_platform_budget() {
        let config = Config::default();
        assert_eq!(config.rate_limit.requests_per_hour, 180);
        assert_eq!(config.rate_limit.min_delay(), Duration::from_secs(2));
        assert_eq!(config.rate_limit.burst_limit, 10);
        assert_eq!(config.rate_limit.cooldown(), Duration::from_secs(60));
        assert!(config.rate_limit.humanize);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.limits.max_posts, 50);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rate_limit]
            requests_per_hour = 90
            humanize = false

            [retry]
            max_attempts = 5
        "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.requests_per_hour, 90);
        assert!(!config.rate_limit.humanize);
        assert_eq!(config.rate_limit.burst_limit, 10);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_secs, 5.0);
    }

    #[test]
    fn test_negative_min_delay_clamps_to_zero() {
        let governor = GovernorConfig {
            min_delay_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(governor.min_delay(), Duration::ZERO);
    }
}
