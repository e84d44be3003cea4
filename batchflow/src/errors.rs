//! Error types for batchflow.
//!
//! Per-item failures ([`StageFailure`]) are recovered into outcome records and
//! never abort a batch. Batch-level errors ([`BatchError`]) are precondition
//! violations reported before any stage runs.

use crate::core::WorkItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for batchflow operations.
#[derive(Debug, Error)]
pub enum BatchflowError {
    /// A batch precondition was violated.
    #[error("{0}")]
    Batch(#[from] BatchError),

    /// Configuration could not be loaded or is invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The taxonomy of per-item failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The item's input could not be found or opened.
    MissingInput,
    /// The input exists but could not be decoded.
    DecodeFailure,
    /// A transformation step rejected its input.
    TransformFailure,
    /// The result could not be written.
    WriteFailure,
    /// A stage panicked while processing the item.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "missing-input"),
            Self::DecodeFailure => write!(f, "decode-failure"),
            Self::TransformFailure => write!(f, "transform-failure"),
            Self::WriteFailure => write!(f, "write-failure"),
            Self::Panicked => write!(f, "panicked"),
        }
    }
}

/// A failure raised by a stage while processing one item.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageFailure {
    /// The item's input could not be found or opened.
    #[error("missing input '{item}': {cause}")]
    MissingInput {
        /// The failing item.
        item: WorkItem,
        /// The underlying cause.
        cause: String,
    },

    /// The input could not be decoded.
    #[error("failed to decode '{item}': {cause}")]
    DecodeFailure {
        /// The failing item.
        item: WorkItem,
        /// The underlying cause.
        cause: String,
    },

    /// A transformation step failed.
    #[error("failed to transform '{item}': {cause}")]
    TransformFailure {
        /// The failing item.
        item: WorkItem,
        /// The underlying cause.
        cause: String,
    },

    /// The result could not be written.
    #[error("failed to write '{item}': {cause}")]
    WriteFailure {
        /// The failing item.
        item: WorkItem,
        /// The underlying cause.
        cause: String,
    },

    /// A stage panicked.
    #[error("processing '{item}' panicked: {cause}")]
    Panicked {
        /// The failing item.
        item: WorkItem,
        /// The panic message.
        cause: String,
    },
}

impl StageFailure {
    /// Creates a failure of the given kind.
    #[must_use]
    pub fn new(kind: FailureKind, item: WorkItem, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        match kind {
            FailureKind::MissingInput => Self::MissingInput { item, cause },
            FailureKind::DecodeFailure => Self::DecodeFailure { item, cause },
            FailureKind::TransformFailure => Self::TransformFailure { item, cause },
            FailureKind::WriteFailure => Self::WriteFailure { item, cause },
            FailureKind::Panicked => Self::Panicked { item, cause },
        }
    }

    /// Creates a missing input failure.
    #[must_use]
    pub fn missing_input(item: WorkItem, cause: impl Into<String>) -> Self {
        Self::MissingInput {
            item,
            cause: cause.into(),
        }
    }

    /// Creates a decode failure.
    #[must_use]
    pub fn decode(item: WorkItem, cause: impl Into<String>) -> Self {
        Self::DecodeFailure {
            item,
            cause: cause.into(),
        }
    }

    /// Creates a transform failure.
    #[must_use]
    pub fn transform(item: WorkItem, cause: impl Into<String>) -> Self {
        Self::TransformFailure {
            item,
            cause: cause.into(),
        }
    }

    /// Creates a write failure.
    #[must_use]
    pub fn write(item: WorkItem, cause: impl Into<String>) -> Self {
        Self::WriteFailure {
            item,
            cause: cause.into(),
        }
    }

    /// Creates a panic failure.
    #[must_use]
    pub fn panicked(item: WorkItem, cause: impl Into<String>) -> Self {
        Self::Panicked {
            item,
            cause: cause.into(),
        }
    }

    /// Returns the failure kind.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingInput { .. } => FailureKind::MissingInput,
            Self::DecodeFailure { .. } => FailureKind::DecodeFailure,
            Self::TransformFailure { .. } => FailureKind::TransformFailure,
            Self::WriteFailure { .. } => FailureKind::WriteFailure,
            Self::Panicked { .. } => FailureKind::Panicked,
        }
    }

    /// Returns the failing item.
    #[must_use]
    pub fn item(&self) -> &WorkItem {
        match self {
            Self::MissingInput { item, .. }
            | Self::DecodeFailure { item, .. }
            | Self::TransformFailure { item, .. }
            | Self::WriteFailure { item, .. }
            | Self::Panicked { item, .. } => item,
        }
    }

    /// Returns the underlying cause.
    #[must_use]
    pub fn cause(&self) -> &str {
        match self {
            Self::MissingInput { cause, .. }
            | Self::DecodeFailure { cause, .. }
            | Self::TransformFailure { cause, .. }
            | Self::WriteFailure { cause, .. }
            | Self::Panicked { cause, .. } => cause,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("kind".to_string(), serde_json::json!(self.kind()));
        map.insert("item".to_string(), serde_json::json!(self.item()));
        map.insert("cause".to_string(), serde_json::json!(self.cause()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors that reject a batch before any item is processed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch contained no items.
    #[error("Batch has no items to process")]
    EmptyBatch,

    /// The runner configuration is invalid.
    #[error("Invalid batch configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Two results being compared were produced from different item lists.
    #[error("Cannot compare batches over different items ({left} vs {right} items, or differing order)")]
    MismatchedItems {
        /// Number of items on the left-hand side.
        left: usize,
        /// Number of items on the right-hand side.
        right: usize,
    },
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A stage chain was built without stages.
    #[error("Stage chain '{name}' has no stages")]
    EmptyChain {
        /// The chain name.
        name: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    Invalid {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// The file path.
        path: PathBuf,
        /// The IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
