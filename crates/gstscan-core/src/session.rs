//! One user's upload-to-results flow.

use std::path::Path;

use tracing::{info, warn};

use crate::client::AnalysisService;
use crate::error::{GstScanError, IntakeError};
use crate::intake::{FileIntake, InvoiceFile, Selection};
use crate::invoice::adapt;
use crate::models::invoice::InvoiceRecord;
use crate::notify::{NotificationKind, NotificationQueue, Notifier};

/// Owns the selection, the current record and the notification queue.
///
/// `process` takes `&mut self`, so a session has at most one request in
/// flight.
#[derive(Debug, Default)]
pub struct InvoiceSession {
    intake: FileIntake,
    record: Option<InvoiceRecord>,
    notifications: NotificationQueue,
}

impl InvoiceSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intake(intake: FileIntake) -> Self {
        Self {
            intake,
            ..Self::default()
        }
    }

    /// Select a file for upload, replacing any previous selection.
    pub fn select(&mut self, file: InvoiceFile) -> Result<&Selection, IntakeError> {
        match self.intake.select(file) {
            Ok(selection) => Ok(selection),
            Err(e) => {
                self.notifications.notify(&e.to_string(), NotificationKind::Error);
                Err(e)
            }
        }
    }

    /// Select a file on disk; oversized files are rejected before reading.
    pub fn select_path(&mut self, path: &Path) -> Result<&Selection, GstScanError> {
        match self.intake.select_path(path) {
            Ok(selection) => Ok(selection),
            Err(e) => {
                if let GstScanError::Intake(rejection) = &e {
                    self.notifications
                        .notify(&rejection.to_string(), NotificationKind::Error);
                }
                Err(e)
            }
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.intake.selection()
    }

    /// Upload the selected file and adapt the reply.
    ///
    /// On failure exactly one error notification is queued and the
    /// previous record (if any) is left in place.
    pub async fn process<S>(&mut self, service: &S) -> Result<&InvoiceRecord, GstScanError>
    where
        S: AnalysisService + ?Sized,
    {
        let Some(selection) = self.intake.selection() else {
            let e = IntakeError::NoSelection;
            self.notifications.notify(&e.to_string(), NotificationKind::Error);
            return Err(e.into());
        };

        match service.analyze(&selection.file).await {
            Ok(raw) => {
                let record = adapt(&raw);
                info!(
                    "Analysis of {} produced {} line items",
                    selection.file.name,
                    record.line_items.len()
                );
                Ok(&*self.record.insert(record))
            }
            Err(e) => {
                warn!("Analysis of {} failed: {:?}", selection.file.name, e);
                self.notifications.notify(&e.user_message(), NotificationKind::Error);
                Err(e.into())
            }
        }
    }

    pub fn record(&self) -> Option<&InvoiceRecord> {
        self.record.as_ref()
    }

    /// Start over: drop the record and the selection.
    pub fn new_invoice(&mut self) {
        self.record = None;
        self.intake.reset();
    }

    pub fn notifications(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }
}
