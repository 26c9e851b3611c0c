//! Mock sender for testing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use vc_core::Channel;

use super::MessageSender;
use crate::InfrastructureError;

/// A message captured by [`MockMessageSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: Channel,
    pub recipient: String,
    pub body: String,
}

/// Records messages in memory; can be switched into failure mode
#[derive(Debug, Default)]
pub struct MockMessageSender {
    messages: Mutex<Vec<SentMessage>>,
    should_fail: AtomicBool,
}

impl MockMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_should_fail(true);
        sender
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// First run of digits in the last message sent to `recipient`
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.messages()
            .into_iter()
            .rev()
            .find(|message| message.recipient == recipient)
            .and_then(|message| {
                message
                    .body
                    .split(|c: char| !c.is_ascii_digit())
                    .find(|run| !run.is_empty())
                    .map(String::from)
            })
    }
}

#[async_trait]
impl MessageSender for MockMessageSender {
    async fn send_message(
        &self,
        channel: Channel,
        recipient: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(InfrastructureError::Delivery(format!(
                "{} provider unavailable",
                channel.label()
            )));
        }

        let mut messages = self
            .messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.push(SentMessage {
            channel,
            recipient: recipient.to_string(),
            body: body.to_string(),
        });
        debug!(channel = %channel, count = messages.len(), "Mock message recorded");

        Ok(format!("mock-msg-{}", messages.len()))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
