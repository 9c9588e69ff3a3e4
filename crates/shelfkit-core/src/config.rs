#![forbid(unsafe_code)]

//! Engine timing and batching configuration.
//!
//! Defaults encode the interaction contracts of the ordering and counting
//! screens: a 200ms window to coalesce keystroke-driven validity flips, a
//! 500ms window that makes action buttons idempotent under rapid clicks, and
//! a fixed chunk size for sequential batch close.

use std::fmt;
use std::time::Duration;

/// Default validity debounce window.
pub const DEFAULT_VALIDITY_DEBOUNCE: Duration = Duration::from_millis(200);
/// Default action-button debounce window.
pub const DEFAULT_SUBMIT_DEBOUNCE: Duration = Duration::from_millis(500);
/// Default number of counts closed per request.
pub const DEFAULT_CLOSE_BATCH_SIZE: usize = 25;
/// Default number of fractional digits accepted by decimal validators.
pub const DEFAULT_DECIMAL_SCALE: u32 = 4;

/// Configuration shared by the form, grid and page crates.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Quiet window before a cell reports a validity change.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub validity_debounce: Duration,
    /// Quiet window before a save/generate/close click is dispatched.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub submit_debounce: Duration,
    /// Counts closed per sequential request.
    pub close_batch_size: usize,
    /// Maximum fractional digits for non-EACH quantities.
    pub decimal_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validity_debounce: DEFAULT_VALIDITY_DEBOUNCE,
            submit_debounce: DEFAULT_SUBMIT_DEBOUNCE,
            close_batch_size: DEFAULT_CLOSE_BATCH_SIZE,
            decimal_scale: DEFAULT_DECIMAL_SCALE,
        }
    }
}

impl EngineConfig {
    /// Set the validity debounce window.
    #[must_use]
    pub fn with_validity_debounce(mut self, window: Duration) -> Self {
        self.validity_debounce = window;
        self
    }

    /// Set the action-button debounce window.
    #[must_use]
    pub fn with_submit_debounce(mut self, window: Duration) -> Self {
        self.submit_debounce = window;
        self
    }

    /// Set the batch-close chunk size.
    #[must_use]
    pub fn with_close_batch_size(mut self, size: usize) -> Self {
        self.close_batch_size = size;
        self
    }

    /// Set the decimal scale.
    #[must_use]
    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = scale;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.close_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "close_batch_size must be at least 1".into(),
            ));
        }
        if self.decimal_scale > 28 {
            return Err(ConfigError::Invalid(format!(
                "decimal_scale {} exceeds 28",
                self.decimal_scale
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing keys take defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors produced while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input could not be decoded.
    Parse(String),
    /// The decoded configuration is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_interaction_contracts() {
        let config = EngineConfig::default();
        assert_eq!(config.validity_debounce, Duration::from_millis(200));
        assert_eq!(config.submit_debounce, Duration::from_millis(500));
        assert_eq!(config.close_batch_size, 25);
        assert_eq!(config.decimal_scale, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let config = EngineConfig::default()
            .with_validity_debounce(Duration::from_millis(50))
            .with_submit_debounce(Duration::from_millis(600))
            .with_close_batch_size(3)
            .with_decimal_scale(2);
        assert_eq!(config.validity_debounce, Duration::from_millis(50));
        assert_eq!(config.submit_debounce, Duration::from_millis(600));
        assert_eq!(config.close_batch_size, 3);
        assert_eq!(config.decimal_scale, 2);
    }

    #[test]
    fn zero_batch_size_is_invalid() {
        let err = EngineConfig::default()
            .with_close_batch_size(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("close_batch_size"));
    }

    #[test]
    fn oversized_scale_is_invalid() {
        assert!(
            EngineConfig::default()
                .with_decimal_scale(29)
                .validate()
                .is_err()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_partial_override_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"submit_debounce": 600}"#).unwrap();
        assert_eq!(config.submit_debounce, Duration::from_millis(600));
        assert_eq!(config.validity_debounce, DEFAULT_VALIDITY_DEBOUNCE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"close_batch_size": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
