use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::{Error, Result};
use crate::ingest::FileType;
use crate::series::ExportFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub distance: DistanceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub file_type: FileType,
    /// Trend lines with fewer points are dropped after aggregation; 0 keeps all.
    #[serde(default)]
    pub min_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    #[serde(default = "default_weight")]
    pub count_weight: f64,
    #[serde(default = "default_weight")]
    pub delta_weight: f64,
    #[serde(default = "default_weight")]
    pub delta_delta_weight: f64,
    #[serde(default = "default_trending_penalty")]
    pub trending_penalty: f64,
    /// Compare over the union of timestamps, filling the missing side with zeros.
    #[serde(default)]
    pub zero_fill: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ExportFormat,
}

fn default_weight() -> f64 { 1.0 }
fn default_trending_penalty() -> f64 { 1.0 }

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            file_type: FileType::default(),
            min_points: 0,
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            count_weight: default_weight(),
            delta_weight: default_weight(),
            delta_delta_weight: default_weight(),
            trending_penalty: default_trending_penalty(),
            zero_fill: false,
        }
    }
}

impl DistanceConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("count_weight", self.count_weight),
            ("delta_weight", self.delta_weight),
            ("delta_delta_weight", self.delta_delta_weight),
            ("trending_penalty", self.trending_penalty),
        ];

        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Reads the user config file if it exists, otherwise returns defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.distance.validate()?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| Error::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config/trendline/config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.distance.count_weight, 1.0);
        assert_eq!(config.distance.delta_weight, 1.0);
        assert_eq!(config.distance.delta_delta_weight, 1.0);
        assert_eq!(config.distance.trending_penalty, 1.0);
        assert!(!config.distance.zero_fill);
        assert_eq!(config.loader.min_points, 0);
        assert_eq!(config.loader.file_type, FileType::Tsv);
        assert_eq!(config.output.format, ExportFormat::Text);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            [distance]
            count_weight = 0.5
            zero_fill = true

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.distance.count_weight, 0.5);
        assert_eq!(config.distance.delta_weight, 1.0);
        assert!(config.distance.zero_fill);
        assert_eq!(config.output.format, ExportFormat::Json);
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = Config::parse("[distance]\ntrending_penalty = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("trending_penalty")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[loader]\nmin_points = 30\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.loader.min_points, 30);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.distance.delta_delta_weight = 2.5;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
