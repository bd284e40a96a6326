//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use crate::output::report::CSV_FILE_NAME;
use crate::processing::scorer::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub processing: ProcessingConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Upper bound on documents extracted and embedded at the same time
    pub max_concurrency: usize,
    pub enable_caching: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub strong_hire_threshold: f64,
    pub maybe_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub csv_file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-screener")
            .join("models");

        let thresholds = Thresholds::default();

        Self {
            models: ModelConfig {
                models_dir,
                default_embedding_model: "potion-base-8M".to_string(),
            },
            processing: ProcessingConfig {
                max_concurrency: 4,
                enable_caching: true,
            },
            scoring: ScoringConfig {
                strong_hire_threshold: thresholds.strong_hire,
                maybe_threshold: thresholds.maybe,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                csv_file_name: CSV_FILE_NAME.to_string(),
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.processing.max_concurrency == 0 {
            return Err(ScreenerError::Configuration(
                "processing.max_concurrency must be at least 1".to_string(),
            ));
        }
        let scoring = &self.scoring;
        if !scoring.maybe_threshold.is_finite() || !scoring.strong_hire_threshold.is_finite() {
            return Err(ScreenerError::Configuration(
                "scoring thresholds must be finite numbers".to_string(),
            ));
        }
        if scoring.maybe_threshold > scoring.strong_hire_threshold {
            return Err(ScreenerError::Configuration(format!(
                "scoring.maybe_threshold ({}) exceeds scoring.strong_hire_threshold ({})",
                scoring.maybe_threshold, scoring.strong_hire_threshold
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            strong_hire: self.scoring.strong_hire_threshold,
            maybe: self.scoring.maybe_threshold,
        }
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, Config::default());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = Config::default().thresholds();
        assert_eq!(thresholds.strong_hire, 75.0);
        assert_eq!(thresholds.maybe, 50.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.scoring.maybe_threshold = 80.0;
        config.save_to(&path).unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ScreenerError::Configuration(_))));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "models = 3").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ScreenerError::Configuration(_))));
    }
}
