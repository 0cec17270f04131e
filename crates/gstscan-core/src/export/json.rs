//! Pretty-printed JSON export.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::{ExportFormat, Result};
use crate::models::invoice::InvoiceRecord;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    #[serde(flatten)]
    record: &'a InvoiceRecord,
    exported_at: String,
    format: &'static str,
}

/// The record's fields followed by `exportedAt` and `format`.
pub(super) fn render(record: &InvoiceRecord, exported_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let export = JsonExport {
        record,
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        format: ExportFormat::Json.tag(),
    };

    Ok(serde_json::to_vec_pretty(&export)?)
}
