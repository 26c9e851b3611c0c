//! Notification sinks for challenge status events

use std::sync::Mutex;

use tracing::{error, info, warn};

use vc_core::{Notification, NotificationKind, NotificationSinkTrait};

/// Writes every notification to the log
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink {
    flow: String,
}

impl TracingNotificationSink {
    /// Sink tagging records with `flow`
    pub fn new(flow: impl Into<String>) -> Self {
        Self { flow: flow.into() }
    }
}

impl NotificationSinkTrait for TracingNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Info | NotificationKind::Success => {
                info!(flow = %self.flow, kind = ?notification.kind, "{}", notification.message)
            }
            NotificationKind::Warning => warn!(flow = %self.flow, "{}", notification.message),
            NotificationKind::Error => error!(flow = %self.flow, "{}", notification.message),
        }
    }

    fn on_succeeded(&self, trust_device: bool) {
        info!(
            flow = %self.flow,
            trust_device = trust_device,
            event = "challenge_succeeded",
            "Challenge succeeded"
        );
    }
}

/// Collects notifications for a UI to drain
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    pending: Mutex<Vec<Notification>>,
    succeeded: Mutex<Option<bool>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every notification recorded since the last drain
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(
            &mut *self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    /// Trust flag reported with the success callback, if it fired
    pub fn succeeded(&self) -> Option<bool> {
        *self
            .succeeded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationSinkTrait for RecordingNotificationSink {
    fn notify(&self, notification: Notification) {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }

    fn on_succeeded(&self, trust_device: bool) {
        *self
            .succeeded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(trust_device);
    }
}
