//! Code Delivery Module
//!
//! This module turns a delivery request from the challenge engine into a
//! freshly issued one-time code and a message carrying it.
//!
//! ## Features
//!
//! - **Message Sender Trait**: Common interface for SMS, WhatsApp and email transports
//! - **Console Sender**: Prints messages to stdout for development
//! - **Mock Sender**: Records messages in memory for tests
//! - **Issuing Gateway**: Generates codes with the OS random source and stores them

pub mod console;
pub mod gateway;
pub mod mock;

pub use console::ConsoleMessageSender;
pub use gateway::{generate_code, IssuingDeliveryGateway};
pub use mock::{MockMessageSender, SentMessage};

use async_trait::async_trait;
use vc_core::Channel;

use crate::InfrastructureError;

/// Transport for code messages
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `body` to `recipient` over `channel`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Provider message id
    /// * `Err(InfrastructureError)` - If the message could not be handed off
    async fn send_message(
        &self,
        channel: Channel,
        recipient: &str,
        body: &str,
    ) -> Result<String, InfrastructureError>;

    /// Provider name for logs
    fn provider_name(&self) -> &'static str;
}
