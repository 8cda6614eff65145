//! Notification bus
//!
//! The notification port shared by the resource client and the ingestion
//! coordinator. Producers call [`Notifier::notify`]; presentation layers decide
//! how (and whether) a notification is rendered.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        f.write_str(s)
    }
}

/// A single notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Local::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Notification port
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationKind::Error, message);
    }

    fn info(&self, message: &str) {
        self.notify(NotificationKind::Info, message);
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Channel-backed notifier
///
/// Cloning the bus shares the same channel. Notifications published after the
/// receiver is dropped are discarded with a debug log.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: NotificationSender,
}

impl NotificationBus {
    pub fn new(sender: NotificationSender) -> Self {
        Self { sender }
    }

    /// Create a bus and the receiving end of its channel
    pub fn channel() -> (Self, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    #[allow(clippy::result_large_err)]
    pub fn publish(
        &self,
        notification: Notification,
    ) -> Result<(), mpsc::error::SendError<Notification>> {
        trace!("◆ NOTIFY [{}]: {}", notification.kind, notification.message);
        self.sender.send(notification)
    }

    pub fn sender(&self) -> NotificationSender {
        self.sender.clone()
    }
}

impl Notifier for NotificationBus {
    fn notify(&self, kind: NotificationKind, message: &str) {
        if self.publish(Notification::new(kind, message)).is_err() {
            debug!("◆ notification dropped, no receiver: {}", message);
        }
    }
}

/// Drains a [`NotificationBus`] into a handler
pub struct NotificationDispatcher {
    receiver: NotificationReceiver,
}

impl NotificationDispatcher {
    pub fn new(receiver: NotificationReceiver) -> Self {
        Self { receiver }
    }

    /// Run until every sender is dropped. Returns the number of notifications handled.
    pub async fn run<F>(mut self, handler: F) -> usize
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        debug!("◆ NOTIFICATION DISPATCHER ONLINE");

        let mut handled = 0;
        while let Some(notification) = self.receiver.recv().await {
            handler(notification);
            handled += 1;
        }

        debug!("◆ NOTIFICATION DISPATCHER OFFLINE ({} handled)", handled);
        handled
    }

    /// Collect everything currently queued without waiting
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.receiver.try_recv() {
            out.push(notification);
        }
        out
    }
}

/// Forwards notifications to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => error!("{}", message),
            NotificationKind::Success | NotificationKind::Info => info!("{}", message),
        }
    }
}

/// Records notifications in order
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification::new(kind, message));
    }
}
