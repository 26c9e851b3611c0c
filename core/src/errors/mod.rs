//! Domain-specific error types and error handling.

use thiserror::Error;

use crate::domain::entities::Channel;

/// Local validation failures; never reach the verifier or the gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Channel {channel} is not available for this identifier")]
    ChannelUnavailable { channel: Channel },

    #[error("No verification channel is available for this identifier")]
    NoChannelAvailable,

    #[error("Send a code first")]
    CodeNotSent,

    #[error("Enter all {expected} digits (got {actual})")]
    IncompleteCode { expected: usize, actual: usize },

    #[error("Enter your {}", .channel.label())]
    EmptySecret { channel: Channel },

    #[error("Please wait {remaining_seconds} seconds before requesting a new code")]
    CooldownActive { remaining_seconds: u32 },

    #[error("Invalid challenge configuration: {message}")]
    InvalidConfig { message: String },
}

/// Core challenge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not send code via {channel}: {message}")]
    Delivery { channel: Channel, message: String },

    #[error("Verification via {channel} rejected: {remaining_attempts} attempts remaining")]
    Rejected {
        channel: Channel,
        failure_count: u32,
        remaining_attempts: u32,
        locked_for_seconds: Option<u64>,
    },

    #[error("Verification service unavailable: {message}")]
    Transport { message: String },

    #[error("Too many attempts. Try again in {retry_after_seconds} seconds")]
    Locked { retry_after_seconds: u64 },

    #[error("A verification is already in progress")]
    InProgress,

    #[error("Challenge already completed")]
    Completed,
}

impl ChallengeError {
    /// Error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            ChallengeError::Validation(err) => match err {
                ValidationError::ChannelUnavailable { .. } => "CHANNEL_UNAVAILABLE",
                ValidationError::NoChannelAvailable => "NO_CHANNEL_AVAILABLE",
                ValidationError::CodeNotSent => "CODE_NOT_SENT",
                ValidationError::IncompleteCode { .. } => "INCOMPLETE_CODE",
                ValidationError::EmptySecret { .. } => "EMPTY_SECRET",
                ValidationError::CooldownActive { .. } => "COOLDOWN_ACTIVE",
                ValidationError::InvalidConfig { .. } => "INVALID_CONFIG",
            },
            ChallengeError::Delivery { .. } => "DELIVERY_FAILED",
            ChallengeError::Rejected { .. } => "SECRET_REJECTED",
            ChallengeError::Transport { .. } => "VERIFIER_UNAVAILABLE",
            ChallengeError::Locked { .. } => "CHALLENGE_LOCKED",
            ChallengeError::InProgress => "VERIFICATION_IN_PROGRESS",
            ChallengeError::Completed => "CHALLENGE_COMPLETED",
        }
    }

    /// Whether the user can try again right away
    pub fn is_retryable(&self) -> bool {
        match self {
            ChallengeError::Rejected {
                locked_for_seconds, ..
            } => locked_for_seconds.is_none(),
            ChallengeError::Locked { .. } | ChallengeError::Completed => false,
            ChallengeError::Validation(ValidationError::CooldownActive { .. }) => false,
            ChallengeError::Validation(ValidationError::InvalidConfig { .. })
            | ChallengeError::Validation(ValidationError::NoChannelAvailable) => false,
            _ => true,
        }
    }
}

pub type ChallengeResult<T> = Result<T, ChallengeError>;
