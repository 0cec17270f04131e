//! Upload intake: type and size checks, single-file selection.

mod preview;

pub use preview::{mime_from_extension, preview_data_url, sniff_mime};

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GstScanError, IntakeError};

/// Largest accepted upload: 16 MiB, inclusive.
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Leading bytes read to detect the type of an unnamed upload.
const SNIFF_LEN: u64 = 64;

/// MIME types the analysis service accepts.
pub const ALLOWED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "application/pdf"];

/// Result type for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;

/// An upload candidate held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFile {
    /// File name sent with the upload.
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl InvoiceFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Load a file from disk, deriving the MIME type from its extension or,
    /// failing that, from its leading bytes.
    ///
    /// Type and size are checked against `limit` before the body is read, so
    /// an oversized file is rejected without loading it.
    pub fn open(path: &Path, limit: u64) -> crate::Result<Self> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut bytes = Vec::new();
        (&mut file).take(SNIFF_LEN).read_to_end(&mut bytes)?;
        let mime = mime_from_extension(path)
            .or_else(|| sniff_mime(&bytes))
            .unwrap_or("application/octet-stream");
        validate_upload_with_limit(mime, size, limit)?;

        // The file may have grown since the metadata call.
        file.take(limit.saturating_add(1).saturating_sub(bytes.len() as u64))
            .read_to_end(&mut bytes)?;
        validate_upload_with_limit(mime, bytes.len() as u64, limit)?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("invoice")
            .to_string();

        Ok(Self::new(name, mime, bytes))
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the file is an image (and so gets a preview).
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Check a MIME type and size against the upload constraints.
pub fn validate_upload(mime: &str, size: u64) -> Result<()> {
    validate_upload_with_limit(mime, size, MAX_FILE_SIZE)
}

/// Same as [`validate_upload`] with an explicit size limit.
pub fn validate_upload_with_limit(mime: &str, size: u64, limit: u64) -> Result<()> {
    if !ALLOWED_MIME_TYPES.contains(&mime) {
        return Err(IntakeError::UnsupportedType(mime.to_string()));
    }

    if size > limit {
        return Err(IntakeError::TooLarge { size, limit });
    }

    Ok(())
}

/// An accepted file plus its optional preview.
#[derive(Debug, Clone)]
pub struct Selection {
    pub file: InvoiceFile,
    /// `data:` URL for image uploads; `None` for PDFs or when encoding failed.
    pub preview: Option<String>,
}

/// Holds at most one selected file at a time.
#[derive(Debug, Clone)]
pub struct FileIntake {
    selection: Option<Selection>,
    last_error: Option<IntakeError>,
    max_file_size: u64,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::with_limit(MAX_FILE_SIZE)
    }

    pub fn with_limit(max_file_size: u64) -> Self {
        Self {
            selection: None,
            last_error: None,
            max_file_size,
        }
    }

    /// Validate and select a file, replacing any previous selection.
    ///
    /// A rejected file leaves nothing selected.
    pub fn select(&mut self, file: InvoiceFile) -> Result<&Selection> {
        self.selection = None;

        if let Err(e) = validate_upload_with_limit(&file.mime, file.size(), self.max_file_size) {
            debug!("Rejected {} ({}): {}", file.name, file.mime, e.reason());
            self.last_error = Some(e.clone());
            return Err(e);
        }

        self.last_error = None;
        let preview = if file.is_image() {
            preview_data_url(&file)
        } else {
            None
        };

        info!("Selected {} ({} bytes)", file.name, file.size());
        Ok(&*self.selection.insert(Selection { file, preview }))
    }

    /// Load and select a file from disk, rejecting oversized files before
    /// their contents are read.
    pub fn select_path(&mut self, path: &Path) -> crate::Result<&Selection> {
        self.selection = None;

        match InvoiceFile::open(path, self.max_file_size) {
            Ok(file) => Ok(self.select(file)?),
            Err(GstScanError::Intake(e)) => {
                debug!("Rejected {}: {}", path.display(), e.reason());
                self.last_error = Some(e.clone());
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Discard the selection, its preview and any pending rejection.
    pub fn reset(&mut self) {
        self.selection = None;
        self.last_error = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Rejection from the last `select`, shown next to the upload control.
    pub fn last_error(&self) -> Option<&IntakeError> {
        self.last_error.as_ref()
    }
}

impl Default for FileIntake {
    fn default() -> Self {
        Self::new()
    }
}
