//! Configuration types for batch runs.
//!
//! All sections deserialize from JSON with per-field defaults, so a config
//! file only has to name the values it overrides.

use crate::core::{ExecutionMode, WorkItem};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Items to process, in order.
    #[serde(default)]
    pub items: Vec<WorkItem>,
    /// Runner configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Image stage configuration.
    #[serde(default)]
    pub images: ImagePipelineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.batch.validate()?;
        self.images.validate()?;
        Ok(())
    }
}

/// Configuration for the batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Which strategies to run.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Upper bound on chains running at once under the parallel strategy.
    ///
    /// `None` starts every item immediately.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    /// Whether to emit an event per item in addition to batch events.
    #[serde(default = "default_item_events")]
    pub item_events: bool,
}

fn default_item_events() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            max_concurrency: None,
            item_events: default_item_events(),
        }
    }
}

impl BatchConfig {
    /// Creates a new batch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Limits how many chains run at once under the parallel strategy.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// Enables or disables per-item events.
    #[must_use]
    pub fn with_item_events(mut self, enabled: bool) -> Self {
        self.item_events = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::invalid("max_concurrency", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Resampling filter used by the resize stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Linear.
    Triangle,
    /// Cubic.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with window 3.
    #[default]
    Lanczos3,
}

/// Configuration for the image stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePipelineConfig {
    /// Directory processed images are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Target width in pixels.
    #[serde(default = "default_dimension")]
    pub width: u32,
    /// Target height in pixels.
    #[serde(default = "default_dimension")]
    pub height: u32,
    /// Resampling filter.
    #[serde(default)]
    pub filter: ResizeFilter,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("images/output")
}

fn default_dimension() -> u32 {
    500
}

impl Default for ImagePipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            width: default_dimension(),
            height: default_dimension(),
            filter: ResizeFilter::default(),
        }
    }
}

impl ImagePipelineConfig {
    /// Creates a new image configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the target size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the resampling filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::invalid("width", "must be greater than 0"));
        }
        if self.height == 0 {
            return Err(ConfigError::invalid("height", "must be greater than 0"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("output_dir", "must not be empty"));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert!(config.items.is_empty());
        assert_eq!(config.batch.mode, ExecutionMode::Both);
        assert_eq!(config.batch.max_concurrency, None);
        assert!(config.batch.item_events);
        assert_eq!(config.images.width, 500);
        assert_eq!(config.images.height, 500);
        assert_eq!(config.images.filter, ResizeFilter::Lanczos3);
        assert_eq!(config.images.output_dir, PathBuf::from("images/output"));
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "items": ["images/cat1.jpg", "images/cat2.jpg"],
            "batch": { "mode": "parallel", "max_concurrency": 2 },
            "images": { "width": 128 }
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.items, WorkItem::from_paths(["images/cat1.jpg", "images/cat2.jpg"]));
        assert_eq!(config.batch.mode, ExecutionMode::Parallel);
        assert_eq!(config.batch.max_concurrency, Some(2));
        assert_eq!(config.images.width, 128);
        assert_eq!(config.images.height, 500);
    }

    #[test]
    fn test_builders() {
        let batch = BatchConfig::new()
            .with_mode(ExecutionMode::Sequential)
            .with_max_concurrency(4)
            .with_item_events(false);
        assert_eq!(batch.mode, ExecutionMode::Sequential);
        assert_eq!(batch.max_concurrency, Some(4));
        assert!(!batch.item_events);

        let images = ImagePipelineConfig::new()
            .with_output_dir("out")
            .with_size(64, 32)
            .with_filter(ResizeFilter::Nearest);
        assert_eq!(images.output_dir, PathBuf::from("out"));
        assert_eq!((images.width, images.height), (64, 32));
        assert_eq!(images.filter, ResizeFilter::Nearest);
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let err = BatchConfig::new().with_max_concurrency(0).validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        assert!(ImagePipelineConfig::new().with_size(0, 10).validate().is_err());
        assert!(ImagePipelineConfig::new().with_size(10, 0).validate().is_err());
        assert!(ImagePipelineConfig::new().with_output_dir("").validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "items": ["a.png"], "logging": {{ "json": true }} }}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.items, vec![WorkItem::from("a.png")]);
        assert!(config.logging.json);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = AppConfig::from_file("/nonexistent/batchflow.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let invalid = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(invalid, ConfigError::Parse { .. }));
    }
}
