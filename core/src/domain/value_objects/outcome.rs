//! Results of delivery and verification round-trips

use serde::{Deserialize, Serialize};

/// Answer from the credential verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyResponse {
    /// The secret is correct
    Accept,
    /// The secret is wrong; counts as a failed attempt
    Reject,
    /// The verifier could not be reached; does not count as an attempt
    TransportError(String),
}

/// Result of a send/resend request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The active channel needs no delivery step
    NotRequired,
    /// Delivery was handed to the gateway
    Sent {
        masked_identifier: String,
        message_id: String,
        cooldown_seconds: u32,
    },
}

/// Result of a submission that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The verifier accepted the secret
    Succeeded { trust_device: bool },
    /// The challenge had already succeeded; nothing happened
    AlreadySucceeded,
    /// The channel changed or the challenge was reset while verifying; the response was dropped
    Superseded,
}
