//! Client for the remote invoice analysis service.

mod http;

pub use http::HttpAnalysisClient;

use std::future::Future;

use serde_json::Value;

use crate::error::AnalysisError;
use crate::intake::InvoiceFile;

/// Message used when the service fails without saying why.
pub const GENERIC_SERVICE_ERROR: &str = "Failed to analyze invoice.";

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// A service that turns an uploaded invoice into a raw JSON analysis.
///
/// One call is one attempt; implementations never retry.
pub trait AnalysisService {
    fn analyze(&self, file: &InvoiceFile) -> impl Future<Output = Result<Value>>;
}

/// Decide the outcome of an analysis request from its status and body.
///
/// An `error` string in the body wins regardless of status; a non-2xx
/// status without one gets the generic message; a 2xx body that is not
/// JSON is a transport failure.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Value> {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str)
    {
        return Err(AnalysisError::Service(message.to_string()));
    }

    if !(200..300).contains(&status) {
        return Err(AnalysisError::Service(GENERIC_SERVICE_ERROR.to_string()));
    }

    parsed.ok_or_else(|| AnalysisError::Transport("response body is not JSON".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_passes_body_through() {
        let body = br#"{"filename":"a.png","invoice_data":{}}"#;
        let value = interpret_response(200, body).unwrap();
        assert_eq!(value["filename"], "a.png");
    }

    #[test]
    fn test_service_error_message_preferred() {
        let body = br#"{"error": "OCR engine unavailable"}"#;
        assert_eq!(
            interpret_response(500, body),
            Err(AnalysisError::Service("OCR engine unavailable".to_string()))
        );
    }

    #[test]
    fn test_error_field_on_success_status() {
        let body = br#"{"error": "Could not extract sufficient text from the file."}"#;
        assert!(matches!(
            interpret_response(200, body),
            Err(AnalysisError::Service(_))
        ));
    }

    #[test]
    fn test_non_success_without_message() {
        for body in [&br#"{"detail": "nope"}"#[..], b"<html>Bad Gateway</html>", b""] {
            assert_eq!(
                interpret_response(502, body),
                Err(AnalysisError::Service(GENERIC_SERVICE_ERROR.to_string()))
            );
        }
    }

    #[test]
    fn test_malformed_success_body() {
        let err = interpret_response(200, b"not json").unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
        assert_eq!(err.user_message(), "Network or server error.");
    }

    #[test]
    fn test_non_string_error_field_ignored() {
        let value = interpret_response(200, br#"{"error": null, "filename": "x"}"#).unwrap();
        assert_eq!(value, json!({"error": null, "filename": "x"}));
    }
}
