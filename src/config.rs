//! TOML configuration.
//!
//! ```toml
//! [infer]
//! max_steps = 10
//! confidence_threshold = 0.7
//! max_results = 10
//! timeout_ms = 5000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::infer::InferenceParams;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoemaConfig {
    pub infer: InferConfig,
}

/// Bounds applied to every inference run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferConfig {
    pub max_steps: usize,
    pub confidence_threshold: f32,
    pub max_results: usize,
    /// Optional wall-clock budget in milliseconds; absent means unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for InferConfig {
    fn default() -> Self {
        let params = InferenceParams::default();
        Self {
            max_steps: params.max_steps,
            confidence_threshold: params.confidence_threshold,
            max_results: params.max_results,
            timeout_ms: None,
        }
    }
}

impl NoemaConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: NoemaConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let infer = &self.infer;
        if infer.max_steps == 0 {
            return Err(ConfigError::Invalid {
                message: "infer.max_steps must be greater than 0".into(),
            });
        }
        if infer.max_results == 0 {
            return Err(ConfigError::Invalid {
                message: "infer.max_results must be greater than 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&infer.confidence_threshold)
            || !infer.confidence_threshold.is_finite()
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "infer.confidence_threshold must lie in [0.0, 1.0], got {}",
                    infer.confidence_threshold
                ),
            });
        }
        Ok(())
    }

    /// The inference parameters this config describes.
    pub fn params(&self) -> InferenceParams {
        InferenceParams {
            max_steps: self.infer.max_steps,
            confidence_threshold: self.infer.confidence_threshold,
            max_results: self.infer.max_results,
            timeout: self.infer.timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = NoemaConfig::from_toml("").unwrap();
        let params = config.params();
        assert_eq!(params.max_steps, 10);
        assert!((params.confidence_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(params.max_results, 10);
        assert!(params.timeout.is_none());
    }

    #[test]
    fn partial_overrides_keep_the_rest() {
        let config = NoemaConfig::from_toml(
            "[infer]\nmax_steps = 25\ntimeout_ms = 500\n",
        )
        .unwrap();
        let params = config.params();
        assert_eq!(params.max_steps, 25);
        assert_eq!(params.max_results, 10);
        assert_eq!(params.timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = NoemaConfig::from_toml("[infer]\nconfidence_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_bounds_are_rejected() {
        assert!(NoemaConfig::from_toml("[infer]\nmax_steps = 0\n").is_err());
        assert!(NoemaConfig::from_toml("[infer]\nmax_results = 0\n").is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = NoemaConfig::from_toml("[infer\nmax_steps = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
