//! Delivery gateway issuing one-time codes

use std::sync::Arc;

use async_trait::async_trait;
use rand::{rngs::OsRng, Rng};
use tracing::{error, info};

use vc_core::{Channel, DeliveryGatewayTrait};
use vc_shared::mask_identifier;

use super::MessageSender;
use crate::store::OtpStore;

/// Generates a code per request, stores it, and sends it through `S`
pub struct IssuingDeliveryGateway<S: MessageSender> {
    sender: Arc<S>,
    store: Arc<OtpStore>,
    code_length: usize,
    expiry_minutes: u64,
}

impl<S: MessageSender> IssuingDeliveryGateway<S> {
    /// Create a new issuing gateway
    ///
    /// # Arguments
    ///
    /// * `sender` - Transport carrying the message
    /// * `store` - Store shared with the verifier
    /// * `code_length` - Digits per generated code
    /// * `expiry_seconds` - Lifetime mentioned in the message
    pub fn new(
        sender: Arc<S>,
        store: Arc<OtpStore>,
        code_length: usize,
        expiry_seconds: u64,
    ) -> Self {
        Self {
            sender,
            store,
            code_length,
            expiry_minutes: expiry_seconds.div_ceil(60),
        }
    }

    pub fn sender(&self) -> &Arc<S> {
        &self.sender
    }

    fn message_body(&self, channel: Channel, code: &str) -> String {
        format!(
            "Your {} verification code is {}. It expires in {} minutes.",
            channel.label(),
            code,
            self.expiry_minutes
        )
    }
}

#[async_trait]
impl<S: MessageSender> DeliveryGatewayTrait for IssuingDeliveryGateway<S> {
    async fn request_delivery(&self, channel: Channel, identifier: &str) -> Result<String, String> {
        let code = generate_code(self.code_length);
        self.store.issue(channel, identifier, &code);

        let body = self.message_body(channel, &code);
        match self.sender.send_message(channel, identifier, &body).await {
            Ok(message_id) => {
                info!(
                    channel = %channel,
                    provider = self.sender.provider_name(),
                    recipient = %mask_identifier(identifier),
                    message_id = %message_id,
                    event = "otp_sent",
                    "Verification code sent"
                );
                Ok(message_id)
            }
            Err(e) => {
                self.store.revoke(channel, identifier);
                error!(
                    channel = %channel,
                    provider = self.sender.provider_name(),
                    recipient = %mask_identifier(identifier),
                    error = %e,
                    event = "otp_send_failed",
                    "Failed to send verification code"
                );
                Err(e.to_string())
            }
        }
    }
}

/// Generate a numeric code of `length` digits from the OS random source
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
