//! Client configuration file.
//!
//! Every section is optional; missing values fall back to the defaults the
//! auth service is deployed with (threshold 3, local server on port 5000).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::attempts::ChallengePolicy;
use crate::capture::CaptureConstraints;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid jpeg quality {0} (must be 1-100)")]
    InvalidQuality(u8),
    #[error("challenge threshold must be at least 1")]
    InvalidThreshold,
    #[error("{0} must be greater than zero")]
    InvalidTimeout(&'static str),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConstraints,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Challenge policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Failed attempts before a capture is mandatory.
    pub threshold: u32,
    /// Also send each challenge capture to `/verify-face`.
    pub verify_on_capture: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            threshold: crate::attempts::DEFAULT_CHALLENGE_THRESHOLD,
            verify_on_capture: false,
        }
    }
}

impl PolicyConfig {
    pub fn challenge_policy(&self) -> ChallengePolicy {
        ChallengePolicy::new(self.threshold)
    }
}

/// Auth service endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the auth service, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Look up the public IP before each login.
    pub lookup_ip: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            lookup_ip: true,
        }
    }
}

impl AuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Persisted storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File holding session keys and attempt counters.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("face-gate-storage.toml"),
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.policy.challenge_policy().validate()?;
        if self.auth.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("auth.timeout_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Facing;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy.threshold, 3);
        assert_eq!(config.auth.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            facing = "environment"
            width = 1280

            [policy]
            verify_on_capture = true
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.facing, Facing::Environment);
        assert_eq!(config.capture.width, 1280);
        assert_eq!(config.capture.height, 480);
        assert_eq!(config.policy.threshold, 3);
        assert!(config.policy.verify_on_capture);
        assert_eq!(config.auth.timeout_secs, 30);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = FileConfig::from_toml("[policy]\nthreshold = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidThreshold)));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let result = FileConfig::from_toml("[capture\nwidth = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
