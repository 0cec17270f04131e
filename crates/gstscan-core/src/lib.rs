//! Core library for GST invoice analysis.
//!
//! This crate provides:
//! - Upload intake (type/size validation, previews)
//! - A client for the remote invoice analysis service
//! - Lenient adaptation of the service reply into an `InvoiceRecord`
//! - Display figures (per-line tax, total validation, category totals)
//! - JSON, CSV and PDF export plus a clipboard summary

pub mod client;
pub mod error;
pub mod export;
pub mod intake;
pub mod invoice;
pub mod models;
pub mod notify;
pub mod session;
pub mod view;

pub use client::{AnalysisService, HttpAnalysisClient, interpret_response};
pub use error::{AnalysisError, ExportError, GstScanError, IntakeError, Result};
pub use export::{DownloadSink, ExportArtifact, ExportFormat, clipboard_summary, export, render};
pub use intake::{FileIntake, InvoiceFile, validate_upload};
pub use invoice::{adapt, category_totals, is_validated, line_figures};
pub use models::config::GstScanConfig;
pub use models::invoice::{Category, InvoiceRecord, LineItem, TaxSummary};
pub use notify::{Notification, NotificationKind, NotificationQueue, Notifier};
pub use session::InvoiceSession;
