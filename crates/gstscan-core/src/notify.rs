//! User-facing notifications, passed to components as a capability.

use std::collections::VecDeque;

use serde::Serialize;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A single message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Anything that can show a notification.
pub trait Notifier {
    fn notify(&mut self, message: &str, kind: NotificationKind);
}

/// FIFO of pending notifications, owned by the top-level view.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest pending notification.
    pub fn pop(&mut self) -> Option<Notification> {
        self.pending.pop_front()
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for NotificationQueue {
    fn notify(&mut self, message: &str, kind: NotificationKind) {
        self.pending.push_back(Notification {
            message: message.to_string(),
            kind,
        });
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, message: &str, kind: NotificationKind) {
        (**self).notify(message, kind);
    }
}
