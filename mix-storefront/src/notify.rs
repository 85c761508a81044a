//! User-facing notifications
//!
//! Services push toasts through a broadcast channel; whatever frontend
//! hosts this crate subscribes and renders them.

use tokio::sync::broadcast;

const TOAST_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Toast sink shared by the services
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Toast>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(TOAST_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(ToastKind::Error, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.send(ToastKind::Warning, message.into());
    }

    fn send(&self, kind: ToastKind, message: String) {
        // No subscribers is fine (headless tests)
        let _ = self.tx.send(Toast { kind, message });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }
}
