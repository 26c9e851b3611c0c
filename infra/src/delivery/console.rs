//! Development sender printing messages to stdout

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use vc_core::Channel;
use vc_shared::mask_identifier;

use super::MessageSender;
use crate::InfrastructureError;

/// Prints each message instead of contacting a provider
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMessageSender;

impl ConsoleMessageSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSender for ConsoleMessageSender {
    async fn send_message(
        &self,
        channel: Channel,
        recipient: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let message_id = format!("console-{}", Uuid::new_v4());

        println!("[{} -> {}] {}", channel.label(), mask_identifier(recipient), body);
        info!(
            channel = %channel,
            recipient = %mask_identifier(recipient),
            message_id = %message_id,
            "Message printed to console"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &'static str {
        "console"
    }
}
