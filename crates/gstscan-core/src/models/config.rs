//! Configuration structures for the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::export::ExportFormat;
use crate::intake::MAX_FILE_SIZE;

/// Main configuration for gstscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GstScanConfig {
    /// Analysis service configuration.
    pub service: ServiceConfig,

    /// Upload intake configuration.
    pub intake: IntakeConfig,

    /// Export configuration.
    pub export: ExportConfig,

    /// Result validation configuration.
    pub validation: ValidationConfig,
}

/// Remote analysis service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Analysis endpoint receiving the multipart upload.
    pub endpoint: String,

    /// Request timeout in seconds (native targets only).
    pub timeout_secs: u64,

    /// Multipart field carrying the file.
    pub field_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/api/analyze".to_string(),
            timeout_secs: 120,
            field_name: "file".to_string(),
        }
    }
}

/// Upload intake configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Largest accepted upload in bytes (inclusive).
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory downloads are written to.
    pub output_dir: PathBuf,

    /// Format used when none is given on the command line.
    pub default_format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            default_format: ExportFormat::Json,
        }
    }
}

/// Result validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed relative gap between extracted and predicted totals.
    pub tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { tolerance: 0.1 }
    }
}

impl GstScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
