//! WASM bindings for GST invoice analysis.
//!
//! The browser front end calls these to validate uploads, talk to the
//! analysis service, derive display figures and build export downloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use gstscan_core::export::{self, DownloadSink, ExportArtifact, ExportFormat};
use gstscan_core::intake::{self, InvoiceFile};
use gstscan_core::invoice;
use gstscan_core::models::invoice::{InvoiceRecord, LineItem};
use gstscan_core::notify::{Notification, NotificationKind, Notifier};
use gstscan_core::session::InvoiceSession;
use gstscan_core::view::{JitterSource, LoadingOverlay as Overlay};
use gstscan_core::{ExportError, GstScanError, HttpAnalysisClient};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn now() -> DateTime<Utc> {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    DateTime::parse_from_rfc3339(&iso)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Check a picked file's MIME type and size. Throws the user-facing message.
#[wasm_bindgen(js_name = validateUpload)]
pub fn validate_upload(mime: &str, size: f64) -> Result<(), JsValue> {
    intake::validate_upload(mime, size as u64).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Data URL for an image preview, or `undefined` for PDFs and empty files.
#[wasm_bindgen(js_name = previewDataUrl)]
pub fn preview_data_url(name: &str, mime: &str, bytes: Vec<u8>) -> Option<String> {
    intake::preview_data_url(&InvoiceFile::new(name, mime, bytes))
}

/// Adapt a raw service reply into an invoice record.
#[wasm_bindgen(js_name = adaptResponse)]
pub fn adapt_response(raw: JsValue) -> Result<JsValue, JsValue> {
    let raw: serde_json::Value = from_js(raw)?;
    to_js(&invoice::adapt(&raw))
}

#[wasm_bindgen(js_name = clipboardSummary)]
pub fn clipboard_summary(record: JsValue) -> Result<String, JsValue> {
    let record: InvoiceRecord = from_js(record)?;
    Ok(export::clipboard_summary(&record))
}

/// `{ taxAmount, lineTotal }` for a line item, or `null`.
#[wasm_bindgen(js_name = lineFigures)]
pub fn line_figures(item: JsValue) -> Result<JsValue, JsValue> {
    let item: LineItem = from_js(item)?;
    to_js(&invoice::line_figures(&item))
}

#[wasm_bindgen(js_name = isValidated)]
pub fn is_validated(record: JsValue) -> Result<bool, JsValue> {
    let record: InvoiceRecord = from_js(record)?;
    Ok(invoice::is_validated(&record))
}

#[wasm_bindgen(js_name = categoryTotals)]
pub fn category_totals(record: JsValue) -> Result<JsValue, JsValue> {
    let record: InvoiceRecord = from_js(record)?;
    to_js(&invoice::category_totals(&record))
}

/// A rendered export, handed back to the page to trigger the download.
#[wasm_bindgen]
pub struct ExportedFile {
    artifact: ExportArtifact,
}

#[wasm_bindgen]
impl ExportedFile {
    #[wasm_bindgen(getter)]
    pub fn filename(&self) -> String {
        self.artifact.filename.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.artifact.mime.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.artifact.bytes.clone()
    }
}

#[derive(Default)]
struct CapturedDownload {
    artifact: Option<ExportArtifact>,
}

impl DownloadSink for CapturedDownload {
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        self.artifact = Some(artifact.clone());
        Ok(())
    }
}

/// Forwards notifications to a page callback `(notification) => void`.
struct CallbackNotifier<'a> {
    callback: &'a js_sys::Function,
}

impl Notifier for CallbackNotifier<'_> {
    fn notify(&mut self, message: &str, kind: NotificationKind) {
        let notification = Notification {
            message: message.to_string(),
            kind,
        };
        let delivered = to_js(&notification)
            .and_then(|value| self.callback.call1(&JsValue::NULL, &value));
        if delivered.is_err() {
            web_sys::console::error_1(&JsValue::from_str(message));
        }
    }
}

/// Render `record` as `format` ("json", "csv"/"excel" or "pdf").
///
/// `notify` receives exactly one success or failure notification.
#[wasm_bindgen(js_name = exportInvoice)]
pub fn export_invoice(
    record: JsValue,
    format: &str,
    notify: &js_sys::Function,
) -> Result<ExportedFile, JsValue> {
    let mut notifier = CallbackNotifier { callback: notify };

    let parsed = format
        .parse::<ExportFormat>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
        .and_then(|format| Ok((format, from_js::<InvoiceRecord>(record)?)));
    let (format, record) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            notifier.notify(export::EXPORT_FAILED_MESSAGE, NotificationKind::Error);
            return Err(e);
        }
    };

    let mut sink = CapturedDownload::default();
    export::export_at(&record, format, now(), &mut sink, &mut notifier)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    sink.artifact
        .map(|artifact| ExportedFile { artifact })
        .ok_or_else(|| JsValue::from_str(export::EXPORT_FAILED_MESSAGE))
}

/// Upload a file to `endpoint` and resolve with the adapted record.
///
/// Rejects with the user-facing message on intake or analysis failure.
#[wasm_bindgen(js_name = analyzeInvoice)]
pub fn analyze_invoice(
    name: String,
    mime: String,
    bytes: Vec<u8>,
    endpoint: String,
) -> js_sys::Promise {
    future_to_promise(async move {
        let client =
            HttpAnalysisClient::new(endpoint).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut session = InvoiceSession::new();

        let selected = session
            .select(InvoiceFile::new(name, mime, bytes))
            .map(|_| ());
        let outcome = match selected {
            Ok(()) => session.process(&client).await.map(Clone::clone),
            Err(e) => Err(GstScanError::from(e)),
        };

        match outcome {
            Ok(record) => to_js(&record),
            Err(e) => {
                let message = session
                    .notifications()
                    .pop()
                    .map(|n| n.message)
                    .unwrap_or_else(|| e.to_string());
                Err(JsValue::from_str(&message))
            }
        }
    })
}

/// Loading overlay driven by the page's timers.
#[wasm_bindgen]
pub struct LoadingOverlay {
    overlay: Overlay,
    jitter: JitterSource,
}

#[wasm_bindgen]
impl LoadingOverlay {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            overlay: Overlay::new(),
            jitter: JitterSource::new(),
        }
    }

    /// Tick interval the page should use, in milliseconds.
    #[wasm_bindgen(js_name = tickInterval)]
    pub fn tick_interval() -> u32 {
        gstscan_core::view::progress::TICK_INTERVAL_MS
    }

    /// Delay between a full bar and `settle`, in milliseconds.
    #[wasm_bindgen(js_name = settleDelay)]
    pub fn settle_delay() -> u32 {
        gstscan_core::view::progress::SETTLE_DELAY_MS
    }

    /// Advance by a random increment; returns the new state.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let increment = self.jitter.next_increment();
        to_js(&self.overlay.tick(increment))
    }

    pub fn settle(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.overlay.settle())
    }

    pub fn dismiss(&mut self) {
        self.overlay.dismiss();
    }

    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.overlay.progress()
    }

    #[wasm_bindgen(getter, js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.overlay.is_ready()
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}
