use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use trend_calculator::TrendConfig;

/// The optional YAML config file.
#[derive(Deserialize, Debug, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub trend: TrendConfig,

    /// Emit JSON lines instead of plain columns.
    #[serde(default)]
    pub json: bool,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config = serde_yaml::from_slice(&raw)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config: ConfigFile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.trend, TrendConfig::default());
        assert!(!config.json);
    }

    #[test]
    fn nested_trend_section() {
        let config: ConfigFile =
            serde_yaml::from_str("trend:\n  peak_hold_ms: 1500\njson: true\n").unwrap();
        assert_eq!(config.trend.peak_hold_ms, 1500);
        assert!(config.json);
    }

    #[test]
    fn missing_file_has_context() {
        let err = ConfigFile::load(Path::new("/nonexistent/trend-replay.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }
}
