//! Error types for the gstscan-core library.

use thiserror::Error;

/// Main error type for the gstscan library.
#[derive(Error, Debug)]
pub enum GstScanError {
    /// Upload candidate rejected before it left the machine.
    #[error("intake error: {0}")]
    Intake(#[from] IntakeError),

    /// The analysis service could not be reached or refused the invoice.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Export artifact could not be produced or delivered.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons an upload candidate is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// MIME type outside the accepted set.
    #[error("Please upload a JPG, PNG, or PDF file")]
    UnsupportedType(String),

    /// File exceeds the size limit.
    #[error("File size must be less than {}MB", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },

    /// Processing was requested with nothing selected.
    #[error("No file selected")]
    NoSelection,
}

impl IntakeError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            IntakeError::UnsupportedType(_) => "unsupported type",
            IntakeError::TooLarge { .. } => "too large",
            IntakeError::NoSelection => "no selection",
        }
    }
}

/// Failures of a single analysis attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The service answered and signaled failure.
    #[error("{0}")]
    Service(String),

    /// Connection failure, timeout or an unreadable body.
    #[error("Network or server error.")]
    Transport(String),
}

impl AnalysisError {
    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors related to exporting an invoice record.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Serializing the record failed.
    #[error("failed to serialize record: {0}")]
    Serialize(String),

    /// Building the PDF document failed.
    #[error("failed to build PDF: {0}")]
    Pdf(String),

    /// The artifact could not be written to its destination.
    #[error("failed to deliver {filename}: {reason}")]
    Delivery { filename: String, reason: String },

    /// Unknown export format name.
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialize(e.to_string())
    }
}

/// Result type for the gstscan library.
pub type Result<T> = std::result::Result<T, GstScanError>;
