//! HTTP implementation of [`AnalysisService`] on top of reqwest.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{AnalysisService, Result, interpret_response};
use crate::error::{AnalysisError, GstScanError};
use crate::intake::InvoiceFile;
use crate::models::config::ServiceConfig;

/// Posts invoices as multipart uploads to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
}

impl HttpAnalysisClient {
    /// Create a client for `endpoint` with default settings.
    pub fn new(endpoint: impl Into<String>) -> crate::Result<Self> {
        Self::from_config(&ServiceConfig {
            endpoint: endpoint.into(),
            ..ServiceConfig::default()
        })
    }

    /// Create a client from service configuration.
    pub fn from_config(config: &ServiceConfig) -> crate::Result<Self> {
        let builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gstscan/", env!("CARGO_PKG_VERSION")));

        let client = builder
            .build()
            .map_err(|e| GstScanError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, file: &InvoiceFile) -> Result<Value> {
        info!("Uploading {} ({} bytes) to {}", file.name, file.size(), self.endpoint);

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(transport)?;
        let form = Form::new().part(self.field_name.clone(), part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;
        debug!("Analysis service answered {} with {} bytes", status, body.len());

        interpret_response(status, &body)
    }
}

fn transport(e: reqwest::Error) -> AnalysisError {
    warn!("Analysis request failed: {}", e);
    AnalysisError::Transport(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = find(&buf, b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            if headers.contains("transfer-encoding: chunked") {
                if buf.ends_with(b"0\r\n\r\n") {
                    break;
                }
                continue;
            }
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
        buf
    }

    /// Serve one canned response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}/api/analyze"), handle)
    }

    fn png_file() -> InvoiceFile {
        InvoiceFile::new("scan.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
    }

    #[tokio::test]
    async fn test_posts_multipart_file_field() {
        let (url, server) = serve_once("200 OK", r#"{"filename":"scan_1.png"}"#).await;
        let client = HttpAnalysisClient::new(url).unwrap();

        let value = client.analyze(&png_file()).await.unwrap();
        assert_eq!(value["filename"], "scan_1.png");

        let request = String::from_utf8_lossy(&server.await.unwrap()).to_string();
        assert!(request.starts_with("POST /api/analyze HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: multipart/form-data"));
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(r#"filename="scan.png""#));
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let (url, server) = serve_once(
            "500 Internal Server Error",
            r#"{"error": "OCR engine unavailable"}"#,
        )
        .await;
        let client = HttpAnalysisClient::new(url).unwrap();

        let err = client.analyze(&png_file()).await.unwrap_err();
        assert_eq!(err, AnalysisError::Service("OCR engine unavailable".to_string()));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpAnalysisClient::new(format!("http://{addr}/api/analyze")).unwrap();
        let err = client.analyze(&png_file()).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Transport(_)));
        assert_eq!(err.to_string(), "Network or server error.");
    }
}
