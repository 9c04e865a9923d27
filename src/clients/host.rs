//! Capabilities the host extension shell lends to the panel.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use tracing::{info, warn};

use crate::models::{
    alert::{Alert, AlertVariant},
    session::UserInfo,
};

/// Identity of the operator the shell is logged in as.
pub trait SessionPort {
    fn user_info(&self) -> Option<UserInfo>;
}

/// Alerts and modal chrome owned by the shell.
pub trait NotificationPort {
    fn alert(&self, alert: Alert);
    fn close_modal(&self);
}

impl SessionPort for UserInfo {
    fn user_info(&self) -> Option<UserInfo> {
        Some(self.clone())
    }
}

/// Writes alerts to the log; used when no shell is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationPort for TracingNotifier {
    fn alert(&self, alert: Alert) {
        match alert.variant {
            AlertVariant::Success => info!(alert = %alert.message, "Operator alert"),
            AlertVariant::Error | AlertVariant::Warning => {
                warn!(variant = %alert.variant, alert = %alert.message, "Operator alert")
            }
        }
    }

    fn close_modal(&self) {
        info!("Modal close requested");
    }
}

/// Buffers alerts so they can be handed back to the widget in one response.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    alerts: Mutex<Vec<Alert>>,
    modal_closed: AtomicBool,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn modal_closed(&self) -> bool {
        self.modal_closed.load(Ordering::SeqCst)
    }
}

impl NotificationPort for CollectingNotifier {
    fn alert(&self, alert: Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(alert);
    }

    fn close_modal(&self) {
        self.modal_closed.store(true, Ordering::SeqCst);
    }
}
