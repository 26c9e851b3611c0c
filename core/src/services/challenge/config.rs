//! Configuration for a verification challenge

use vc_shared::{ChallengePolicyConfig, ChallengeSettings, FlowKind};

use crate::domain::entities::Channel;
use crate::errors::ValidationError;

/// Configuration for one challenge flow, built once per flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeConfig {
    /// Channels the flow offers, in display order
    pub allowed_channels: Vec<Channel>,
    /// Rejections allowed before the challenge locks
    pub max_attempts: u32,
    /// Seconds the challenge stays locked after `max_attempts` rejections
    pub lockout_duration_seconds: u64,
    /// Seconds before another code can be requested
    pub resend_cooldown_seconds: u32,
    /// Digits in a one-time code
    pub code_length: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self::from_policy(Channel::ALL, &ChallengePolicyConfig::default())
    }
}

impl ChallengeConfig {
    /// Create a config offering `channels` with the default policy
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self::from_policy(channels, &ChallengePolicyConfig::default())
    }

    /// Create a config from a shared policy preset
    pub fn from_policy(
        channels: impl IntoIterator<Item = Channel>,
        policy: &ChallengePolicyConfig,
    ) -> Self {
        let mut allowed_channels: Vec<Channel> = Vec::new();
        for channel in channels {
            if !allowed_channels.contains(&channel) {
                allowed_channels.push(channel);
            }
        }

        Self {
            allowed_channels,
            max_attempts: policy.max_attempts,
            lockout_duration_seconds: policy.lockout_duration_seconds,
            resend_cooldown_seconds: policy.resend_cooldown_seconds,
            code_length: policy.code_length,
        }
    }

    /// Channels and policy used by a given flow
    pub fn for_flow(flow: FlowKind, settings: &ChallengeSettings) -> Self {
        Self::from_policy(flow_channels(flow).iter().copied(), settings.policy(flow))
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_lockout_duration_seconds(mut self, seconds: u64) -> Self {
        self.lockout_duration_seconds = seconds;
        self
    }

    pub fn with_resend_cooldown_seconds(mut self, seconds: u32) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Check the numeric bounds and the channel list
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.allowed_channels.is_empty() {
            return Err(ValidationError::InvalidConfig {
                message: "at least one channel must be allowed".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidConfig {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.code_length == 0 {
            return Err(ValidationError::InvalidConfig {
                message: "code_length must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Channels each flow offers
pub fn flow_channels(flow: FlowKind) -> &'static [Channel] {
    match flow {
        FlowKind::SignIn => &Channel::ALL,
        FlowKind::Mfa => &[
            Channel::Totp,
            Channel::Sms,
            Channel::Whatsapp,
            Channel::EmailOtp,
            Channel::RecoveryCode,
        ],
        FlowKind::PasswordReset => &[Channel::EmailOtp, Channel::Sms, Channel::Whatsapp],
        FlowKind::Reauth => &[
            Channel::Password,
            Channel::Totp,
            Channel::Sms,
            Channel::Whatsapp,
            Channel::EmailOtp,
        ],
    }
}
