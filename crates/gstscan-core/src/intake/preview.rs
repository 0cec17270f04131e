//! Previews and MIME detection for upload candidates.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use super::InvoiceFile;

/// Build a `data:` URL preview for an image upload.
///
/// Returns `None` for empty files; callers treat a missing preview as
/// cosmetic and keep the selection.
pub fn preview_data_url(file: &InvoiceFile) -> Option<String> {
    if file.bytes.is_empty() {
        return None;
    }
    Some(format!(
        "data:{};base64,{}",
        file.mime,
        STANDARD.encode(&file.bytes)
    ))
}

/// MIME type implied by a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Detect the MIME type from leading bytes (camera captures carry no name).
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }

    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Bmp => Some("image/bmp"),
        _ => None,
    }
}
