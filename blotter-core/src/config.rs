//! TOML configuration for the demo apps.

use crate::domain::AppName;
use crate::entry::OrderDraft;
use crate::session::FillSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application identities on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsConfig {
    pub desk: String,
    pub combined: String,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            desk: "desk".to_string(),
            combined: "combined".to_string(),
        }
    }
}

/// Fill simulator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Milliseconds between increments.
    pub tick_ms: u64,
    /// Per-step fraction of the target quantity.
    pub increment_fraction: f64,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            tick_ms: 2000,
            increment_fraction: 0.25,
        }
    }
}

/// Top-level configuration. Every section has working defaults, so an empty
/// file (or no file) is a valid setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BlotterConfig {
    pub apps: AppsConfig,
    pub fill: FillConfig,
    /// Initial values for the order entry form.
    pub draft: OrderDraft,
}

impl BlotterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fill.tick_ms == 0 {
            return Err(ConfigError::Invalid("fill.tick_ms must be nonzero".into()));
        }
        if !(self.fill.increment_fraction > 0.0 && self.fill.increment_fraction <= 1.0) {
            return Err(ConfigError::Invalid(
                "fill.increment_fraction must be in (0, 1]".into(),
            ));
        }
        if self.apps.desk == self.apps.combined {
            return Err(ConfigError::Invalid(
                "apps.desk and apps.combined must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn desk_app(&self) -> AppName {
        AppName::new(self.apps.desk.clone())
    }

    pub fn combined_app(&self) -> AppName {
        AppName::new(self.apps.combined.clone())
    }

    pub fn fill_settings(&self) -> FillSettings {
        FillSettings {
            tick: Duration::from_millis(self.fill.tick_ms),
            fraction: self.fill.increment_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = BlotterConfig::from_toml("").unwrap();
        assert_eq!(config.apps.desk, "desk");
        assert_eq!(config.apps.combined, "combined");
        assert_eq!(config.fill.tick_ms, 2000);
        assert_eq!(config.fill.increment_fraction, 0.25);
        assert_eq!(config.draft.ticker, "AAPL");
    }

    #[test]
    fn sections_override_selectively() {
        let config = BlotterConfig::from_toml(
            r#"
[apps]
desk = "equities-desk"

[fill]
tick_ms = 250

[draft]
ticker = "MSFT"
target_quantity = 400
"#,
        )
        .unwrap();

        assert_eq!(config.apps.desk, "equities-desk");
        assert_eq!(config.apps.combined, "combined");
        assert_eq!(config.fill.tick_ms, 250);
        assert_eq!(config.draft.ticker, "MSFT");
        assert_eq!(config.draft.target_quantity, 400);
        // Untouched draft fields keep their form defaults.
        assert_eq!(config.draft.target_price, 42.0);

        let settings = config.fill_settings();
        assert_eq!(settings.tick, Duration::from_millis(250));
    }

    #[test]
    fn bad_fraction_is_rejected() {
        let err = BlotterConfig::from_toml("[fill]\nincrement_fraction = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn identical_app_names_are_rejected() {
        let err = BlotterConfig::from_toml("[apps]\ndesk = \"combined\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn syntax_errors_surface_as_parse_errors() {
        let err = BlotterConfig::from_toml("not toml at all [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
