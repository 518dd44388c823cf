//! Configuration management for MultiResize

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ResizeError};
use crate::processing::{EncodeHints, FilterType, ScanMode};

pub mod spec;
pub use spec::*;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output variants, in the order they are produced
    pub variants: Vec<VariantConfig>,

    /// Worker settings
    pub processing: ProcessingConfig,

    /// Encoder and resampler settings
    pub encoding: EncodingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variants: vec![
                VariantConfig::new("HIGH", 900, 600, 95),
                VariantConfig::new("MEDIUM", 450, 300, 90),
                VariantConfig::new("SMALL", 120, 80, 85),
            ],
            processing: ProcessingConfig::default(),
            encoding: EncodingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One output variant as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub suffix: String,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl VariantConfig {
    pub fn new<S: Into<String>>(suffix: S, width: u32, height: u32, quality: u8) -> Self {
        Self {
            suffix: suffix.into(),
            width,
            height,
            quality,
        }
    }
}

impl From<&VariantConfig> for ResizeSpec {
    fn from(variant: &VariantConfig) -> Self {
        ResizeSpec::new(
            BoxSize::new(variant.width, variant.height),
            variant.quality,
            variant.suffix.clone(),
        )
    }
}

/// Worker settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of workers (None = available parallelism)
    pub workers: Option<usize>,
}

impl ProcessingConfig {
    /// Configured worker count, or one per logical CPU
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }
}

/// Encoder and resampler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Progressive (interlaced) scans instead of a single baseline scan
    pub progressive: bool,

    /// Optimized Huffman coding
    pub optimize_coding: bool,

    /// Resample filter
    pub filter: FilterType,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            progressive: true,
            optimize_coding: true,
            filter: FilterType::Lanczos3,
        }
    }
}

impl EncodingConfig {
    pub fn hints(&self) -> EncodeHints {
        EncodeHints {
            scan: if self.progressive {
                ScanMode::Progressive
            } else {
                ScanMode::Baseline
            },
            optimize_coding: self.optimize_coding,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ResizeError::config(format!("Failed to read config file {:?}: {}", path.as_ref(), e))
        })?;

        match config_extension(path.as_ref()).as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ResizeError::config(
                "Unsupported config file format. Use .toml or .yaml",
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = match config_extension(path.as_ref()).as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| ResizeError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| ResizeError::config(format!("YAML serialization failed: {}", e)))?,
            _ => {
                return Err(ResizeError::config(
                    "Unsupported config file format. Use .toml or .yaml",
                ))
            }
        };

        std::fs::write(&path, content).map_err(|e| {
            ResizeError::config(format!("Failed to write config file {:?}: {}", path.as_ref(), e))
        })?;

        Ok(())
    }

    /// Build the spec set from `variants`, surfacing invalid or duplicate entries
    pub fn spec_set(&self) -> Result<SpecSet> {
        SpecSet::try_from_specs(self.variants.iter().map(ResizeSpec::from))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let specs = self.spec_set()?;
        if specs.is_empty() {
            return Err(ResizeError::config("At least one variant is required"));
        }

        if self.processing.workers == Some(0) {
            return Err(ResizeError::config("Worker count must be greater than 0"));
        }

        Ok(())
    }
}

fn config_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}
