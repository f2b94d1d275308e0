use crate::error::{Result, VjsonError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Decode settings
    #[serde(default)]
    pub decode: DecodeConfig,

    /// Type detection settings
    #[serde(default)]
    pub detect: DetectConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Indent width for saved documents (0 = compact)
    #[serde(default = "default_prettiness")]
    pub prettiness: usize,
}

/// Decode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Abort on corrupted type tagging instead of recovering with a warning
    #[serde(default)]
    pub strict: bool,
}

/// Type detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Detect string subtypes (color, datetime) while encoding
    #[serde(default = "default_special_strings")]
    pub special_strings: bool,
}

// Default value functions
fn default_prettiness() -> usize {
    2
}

fn default_special_strings() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prettiness: default_prettiness(),
        }
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { strict: false }
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            special_strings: default_special_strings(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            decode: DecodeConfig::default(),
            detect: DetectConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VjsonError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            VjsonError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from XDG config directory (~/.config/vjson/config.toml)
    /// Falls back to default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::xdg_config_path() {
            if config_path.exists() {
                return Self::from_file(&config_path);
            }
        }

        // Return default config if no config file exists
        Ok(Self::default())
    }

    /// Load configuration with optional custom path
    /// If custom_path is provided, load from there
    /// Otherwise, fall back to XDG config path
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::from_file(path);
        }

        Self::load()
    }

    /// Get the XDG config path (~/.config/vjson/config.toml)
    pub fn xdg_config_path() -> Option<PathBuf> {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(config_dir).join("vjson").join("config.toml"))
        } else if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("vjson")
                    .join("config.toml"),
            )
        } else {
            None
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        // Validate indent width
        if self.output.prettiness > 16 {
            return Err(VjsonError::Config(format!(
                "Invalid prettiness {}. Must be between 0 and 16",
                self.output.prettiness
            )));
        }

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.prettiness, 2);
        assert!(!config.decode.strict);
        assert!(config.detect.special_strings);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Compact output is valid
        config.output.prettiness = 0;
        assert!(config.validate().is_ok());

        // Excessive indent should fail
        config.output.prettiness = 32;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str("[decode]\nstrict = true\n").unwrap();
        assert!(config.decode.strict);
        assert_eq!(config.output.prettiness, 2);
    }

    #[test]
    fn test_sample_config() {
        let sample = Config::sample_config();
        assert!(sample.contains("prettiness"));
        assert!(sample.contains("strict"));
        assert!(sample.contains("special_strings"));
    }
}
