//! Traits for delivery, verification, notification and time integration

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::Channel;
use crate::domain::value_objects::{Notification, VerifyResponse};

/// Trait for code delivery integration (SMS, WhatsApp, email)
#[async_trait]
pub trait DeliveryGatewayTrait: Send + Sync {
    /// Send a fresh code via `channel` to `identifier`; returns a message id.
    ///
    /// Not idempotent: every call may send a new message. Callers gate it
    /// with the resend cooldown.
    async fn request_delivery(&self, channel: Channel, identifier: &str) -> Result<String, String>;
}

/// Trait for credential verification integration
#[async_trait]
pub trait CredentialVerifierTrait: Send + Sync {
    /// Check `secret` submitted through `channel` for `identifier`
    async fn verify_secret(
        &self,
        channel: Channel,
        identifier: &str,
        secret: &str,
    ) -> VerifyResponse;
}

/// Trait for the presentation layer receiving challenge events
pub trait NotificationSinkTrait: Send + Sync {
    /// Show a status message; fire-and-forget
    fn notify(&self, notification: Notification);

    /// Called once when the challenge succeeds
    fn on_succeeded(&self, trust_device: bool) {
        let _ = trust_device;
    }
}

/// Time source for lockout deadlines
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
