//! # Infrastructure Layer
//!
//! Concrete collaborators for the verification challenge engine.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Delivery**: code generation and message senders behind the delivery gateway trait
//! - **Store**: in-memory store of issued one-time codes
//! - **Verifier**: demo credential verifier for passwords, TOTP, recovery and one-time codes
//! - **Notify**: notification sinks for logs and UIs

// Re-export core types for convenience
pub use vc_core::errors::*;

/// Delivery module - code generation and message senders
pub mod delivery;

/// Issued one-time code storage
pub mod store;

/// Credential verification
pub mod verifier;

/// Notification sinks
pub mod notify;

/// Configuration for infrastructure services
pub mod config;

pub use config::{DeliveryProvider, DemoSecrets, InfrastructureConfig};
pub use delivery::{
    generate_code, ConsoleMessageSender, IssuingDeliveryGateway, MessageSender, MockMessageSender,
};
pub use notify::{RecordingNotificationSink, TracingNotificationSink};
pub use store::{OtpCheck, OtpStore};
pub use verifier::DemoCredentialVerifier;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Message transport error
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
