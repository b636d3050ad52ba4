use crate::schema::ExtensionColumn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seconds between consecutive synthetic listing dates.
pub const SYNTHETIC_INTERVAL_SECS: i64 = 2345;

/// Upper bound on the synthetic interval: one day.
pub const MAX_SYNTHETIC_INTERVAL_SECS: i64 = 86_400;

/// Where the listing's date column comes from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// The record's stored creation time, synthetic only where missing.
    #[default]
    Stored,
    /// Always the synthetic sequence, ignoring stored times.
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub currency_symbol: String,
    pub minor_units_per_major: u32,
    /// chrono strftime pattern for the listing's date cell.
    pub date_format: String,
    pub synthetic_interval_secs: i64,
    pub date_source: DateSource,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "£".into(),
            minor_units_per_major: 100,
            date_format: "%d %b %Y at %-I:%M%p".into(),
            synthetic_interval_secs: SYNTHETIC_INTERVAL_SECS,
            date_source: DateSource::Stored,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub presentation: PresentationConfig,
    /// Named extension column sets, selectable per request.
    #[serde(default = "default_presets")]
    pub presets: HashMap<String, Vec<ExtensionColumn>>,
}

fn default_presets() -> HashMap<String, Vec<ExtensionColumn>> {
    let mut presets = HashMap::new();
    presets.insert(
        "services".to_string(),
        vec![
            ExtensionColumn::new("Service", "Example service"),
            ExtensionColumn::new("Merchant ID", "EXAMPLE_SERVICE_0345_LIVE"),
        ],
    );
    presets
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            presentation: PresentationConfig::default(),
            presets: default_presets(),
        }
    }
}

impl ReportConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    /// In tests, use ReportConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ReportConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.presentation.minor_units_per_major == 0 {
            anyhow::bail!("{path}: minor_units_per_major must be > 0");
        }
        let interval = config.presentation.synthetic_interval_secs;
        if interval <= 0 || interval > MAX_SYNTHETIC_INTERVAL_SECS {
            anyhow::bail!(
                "{path}: synthetic_interval_secs must be in 1..={MAX_SYNTHETIC_INTERVAL_SECS}, got {interval}"
            );
        }
        Ok(config)
    }

    /// Defaults with synthetic dates, so listings do not depend on
    /// when a test happened to insert its records.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.presentation.date_source = DateSource::Synthetic;
        config
    }

    pub fn preset(&self, name: &str) -> Option<&[ExtensionColumn]> {
        self.presets.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"presentation": {"currency_symbol": "$"}}"#).unwrap();
        assert_eq!(config.presentation.currency_symbol, "$");
        assert_eq!(config.presentation.minor_units_per_major, 100);
        assert_eq!(config.presentation.synthetic_interval_secs, SYNTHETIC_INTERVAL_SECS);
        assert_eq!(config.presentation.date_source, DateSource::Stored);
        assert_eq!(config.preset("services").map(|p| p.len()), Some(2));
    }

    #[test]
    fn date_source_uses_snake_case() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"presentation": {"date_source": "synthetic"}, "presets": {}}"#)
                .unwrap();
        assert_eq!(config.presentation.date_source, DateSource::Synthetic);
        assert!(config.preset("services").is_none());
    }

    fn load_from(name: &str, body: &str) -> anyhow::Result<ReportConfig> {
        let path = std::env::temp_dir().join(format!(
            "payreport-{name}-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, body).unwrap();
        let loaded = ReportConfig::load(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        loaded
    }

    #[test]
    fn load_bounds_the_synthetic_interval() {
        let err = load_from(
            "huge-interval",
            r#"{"presentation": {"synthetic_interval_secs": 10000000000000, "date_source": "synthetic"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("synthetic_interval_secs"), "{err}");

        assert!(load_from("zero-interval", r#"{"presentation": {"synthetic_interval_secs": 0}}"#).is_err());

        let config = load_from(
            "max-interval",
            &format!(r#"{{"presentation": {{"synthetic_interval_secs": {MAX_SYNTHETIC_INTERVAL_SECS}}}}}"#),
        )
        .unwrap();
        assert_eq!(config.presentation.synthetic_interval_secs, MAX_SYNTHETIC_INTERVAL_SECS);
    }
}
