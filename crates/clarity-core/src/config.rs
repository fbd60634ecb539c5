// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the CodeClarity action.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. `DOMAIN` environment variable (platform domain only)
//! 2. Environment variables (prefix: `CODECLARITY_`)
//! 3. Config file: `~/.config/codeclarity/config.toml`
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Point the action at a self-hosted instance
//! DOMAIN=clarity.internal.example cargo run
//!
//! # Raise the HTTP timeout
//! CODECLARITY_PLATFORM__TIMEOUT_SECONDS=60 cargo run
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ClarityError;
use crate::retry::PollPolicy;

/// Default CodeClarity instance.
pub const DEFAULT_DOMAIN: &str = "platform.codeclarity.io";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Platform connection settings.
    pub platform: PlatformConfig,
    /// Result polling settings.
    pub polling: PollingConfig,
}

/// Platform connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Host name of the CodeClarity instance (no scheme).
    pub domain: String,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Result polling settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Wait before the first poll, in seconds.
    pub initial_delay_seconds: u64,
    /// Wait before the single retry, in seconds.
    pub retry_delay_seconds: u64,
    /// Status code that triggers the retry.
    pub retry_status: u16,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay_seconds: 15,
            retry_delay_seconds: 30,
            retry_status: 500,
        }
    }
}

impl PollingConfig {
    /// Builds the poll policy used by the pipeline.
    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_secs(self.initial_delay_seconds),
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
            retry_status: self.retry_status,
        }
    }
}

/// Returns the CodeClarity configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/codeclarity`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("codeclarity");
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".config")
        .join("codeclarity")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `CODECLARITY_` and double underscore
/// for nested keys (e.g., `CODECLARITY_POLLING__RETRY_DELAY_SECONDS`).
/// A non-empty `DOMAIN` variable takes precedence over every other source.
///
/// # Errors
///
/// Returns `ClarityError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, ClarityError> {
    let config_path = config_file_path();
    let domain = std::env::var("DOMAIN").ok().filter(|d| !d.is_empty());

    let config = Config::builder()
        // Load from config file (optional - may not exist)
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        // Override with environment variables
        .add_source(
            Environment::with_prefix("CODECLARITY")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("platform.domain", domain)?
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    /// Runs `f` with the given environment variables set, restoring them afterwards.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let originals: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(k, _)| ((*k).to_string(), std::env::var(k).ok()))
            .collect();
        unsafe {
            for (k, v) in vars {
                match v {
                    Some(v) => std::env::set_var(k, v),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        // Cleanup
        unsafe {
            for (k, v) in originals {
                match v {
                    Some(v) => std::env::set_var(&k, v),
                    None => std::env::remove_var(&k),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_config_defaults() {
        let dir = tempfile::tempdir().unwrap();
        with_env(
            &[
                ("XDG_CONFIG_HOME", dir.path().to_str()),
                ("DOMAIN", None),
            ],
            || {
                let config = load_config().expect("should load with defaults");

                assert_eq!(config.platform.domain, "platform.codeclarity.io");
                assert_eq!(config.platform.timeout_seconds, 30);
                assert_eq!(config.polling.initial_delay_seconds, 15);
                assert_eq!(config.polling.retry_delay_seconds, 30);
                assert_eq!(config.polling.retry_status, 500);
            },
        );
    }

    #[test]
    #[serial]
    fn test_domain_env_overrides_default() {
        let dir = tempfile::tempdir().unwrap();
        with_env(
            &[
                ("XDG_CONFIG_HOME", dir.path().to_str()),
                ("DOMAIN", Some("localhost")),
            ],
            || {
                let config = load_config().unwrap();
                assert_eq!(config.platform.domain, "localhost");
            },
        );
    }

    #[test]
    #[serial]
    fn test_empty_domain_env_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        with_env(
            &[
                ("XDG_CONFIG_HOME", dir.path().to_str()),
                ("DOMAIN", Some("")),
            ],
            || {
                let config = load_config().unwrap();
                assert_eq!(config.platform.domain, DEFAULT_DOMAIN);
            },
        );
    }

    #[test]
    #[serial]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let config_home = dir.path().join("codeclarity");
        std::fs::create_dir_all(&config_home).unwrap();
        std::fs::write(
            config_home.join("config.toml"),
            "[platform]\ndomain = \"clarity.example\"\n\n[polling]\nretry_delay_seconds = 5\n",
        )
        .unwrap();

        with_env(
            &[
                ("XDG_CONFIG_HOME", dir.path().to_str()),
                ("DOMAIN", None),
            ],
            || {
                let config = load_config().unwrap();
                assert_eq!(config.platform.domain, "clarity.example");
                assert_eq!(config.polling.retry_delay_seconds, 5);
                assert_eq!(config.polling.initial_delay_seconds, 15);
            },
        );
    }

    #[test]
    fn test_polling_policy_from_config() {
        let policy = PollingConfig::default().policy();
        assert_eq!(policy.initial_delay, Duration::from_secs(15));
        assert_eq!(policy.retry_delay, Duration::from_secs(30));
        assert_eq!(policy.retry_status, 500);
    }

    #[test]
    #[serial]
    fn test_config_dir_respects_xdg_config_home() {
        with_env(&[("XDG_CONFIG_HOME", Some("/custom/config"))], || {
            assert_eq!(config_dir(), PathBuf::from("/custom/config/codeclarity"));
            assert!(config_file_path().ends_with("config.toml"));
        });
    }
}
