//! Verification challenge policy configuration module

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Verification flows that run a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Primary sign-in with a second factor
    SignIn,
    /// Standalone multi-factor prompt
    Mfa,
    /// Password reset confirmation
    PasswordReset,
    /// Re-authentication before a sensitive action
    Reauth,
}

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [
        FlowKind::SignIn,
        FlowKind::Mfa,
        FlowKind::PasswordReset,
        FlowKind::Reauth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::SignIn => "sign_in",
            FlowKind::Mfa => "mfa",
            FlowKind::PasswordReset => "password_reset",
            FlowKind::Reauth => "reauth",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sign_in" | "signin" | "login" => Ok(FlowKind::SignIn),
            "mfa" | "2fa" => Ok(FlowKind::Mfa),
            "password_reset" | "reset" => Ok(FlowKind::PasswordReset),
            "reauth" | "re_auth" => Ok(FlowKind::Reauth),
            _ => Err(format!("Invalid flow: {}", s)),
        }
    }
}

/// Attempt, lockout and resend policy for one flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChallengePolicyConfig {
    /// Rejected verifications allowed before the challenge locks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lock duration in seconds once `max_attempts` is reached
    #[serde(default = "default_lockout_seconds")]
    pub lockout_duration_seconds: u64,

    /// Minimum seconds between code deliveries
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_seconds: u32,

    /// Number of digits in a one-time code
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for ChallengePolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lockout_duration_seconds: default_lockout_seconds(),
            resend_cooldown_seconds: default_resend_cooldown(),
            code_length: default_code_length(),
        }
    }
}

impl ChallengePolicyConfig {
    /// Override the attempt limit
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Check the policy values
    pub fn validate(&self, flow: FlowKind) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                format!("challenge.{}.max_attempts", flow),
                "must be at least 1",
            ));
        }
        if self.code_length == 0 {
            return Err(ConfigError::invalid(
                format!("challenge.{}.code_length", flow),
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Challenge policies for every flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChallengeSettings {
    #[serde(default = "sign_in_policy")]
    pub sign_in: ChallengePolicyConfig,

    #[serde(default)]
    pub mfa: ChallengePolicyConfig,

    #[serde(default = "password_reset_policy")]
    pub password_reset: ChallengePolicyConfig,

    #[serde(default)]
    pub reauth: ChallengePolicyConfig,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            sign_in: sign_in_policy(),
            mfa: ChallengePolicyConfig::default(),
            password_reset: password_reset_policy(),
            reauth: ChallengePolicyConfig::default(),
        }
    }
}

impl ChallengeSettings {
    /// Policy for a given flow
    pub fn policy(&self, flow: FlowKind) -> &ChallengePolicyConfig {
        match flow {
            FlowKind::SignIn => &self.sign_in,
            FlowKind::Mfa => &self.mfa,
            FlowKind::PasswordReset => &self.password_reset,
            FlowKind::Reauth => &self.reauth,
        }
    }

    fn policy_mut(&mut self, flow: FlowKind) -> &mut ChallengePolicyConfig {
        match flow {
            FlowKind::SignIn => &mut self.sign_in,
            FlowKind::Mfa => &mut self.mfa,
            FlowKind::PasswordReset => &mut self.password_reset,
            FlowKind::Reauth => &mut self.reauth,
        }
    }

    /// Load defaults and apply `CHALLENGE_*` overrides to every flow
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        for flow in FlowKind::ALL {
            let policy = settings.policy_mut(flow);
            if let Some(value) = env_override("CHALLENGE_MAX_ATTEMPTS") {
                policy.max_attempts = value;
            }
            if let Some(value) = env_override("CHALLENGE_LOCKOUT_SECONDS") {
                policy.lockout_duration_seconds = value;
            }
            if let Some(value) = env_override("CHALLENGE_RESEND_COOLDOWN_SECONDS") {
                policy.resend_cooldown_seconds = value;
            }
            if let Some(value) = env_override("CHALLENGE_CODE_LENGTH") {
                policy.code_length = value;
            }
        }
        settings
    }

    /// Validate all flow policies
    pub fn validate(&self) -> Result<(), ConfigError> {
        for flow in FlowKind::ALL {
            self.policy(flow).validate(flow)?;
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

fn default_max_attempts() -> u32 {
    3
}

fn default_lockout_seconds() -> u64 {
    30
}

fn default_resend_cooldown() -> u32 {
    30
}

fn default_code_length() -> usize {
    6
}

fn sign_in_policy() -> ChallengePolicyConfig {
    ChallengePolicyConfig::default().with_max_attempts(5)
}

fn password_reset_policy() -> ChallengePolicyConfig {
    ChallengePolicyConfig::default().with_max_attempts(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_kind_parsing() {
        assert_eq!("sign-in".parse::<FlowKind>(), Ok(FlowKind::SignIn));
        assert_eq!("PASSWORD_RESET".parse::<FlowKind>(), Ok(FlowKind::PasswordReset));
        assert_eq!("re-auth".parse::<FlowKind>(), Ok(FlowKind::Reauth));
        assert!("wallet".parse::<FlowKind>().is_err());
    }

    #[test]
    fn test_default_presets() {
        let settings = ChallengeSettings::default();
        assert_eq!(settings.policy(FlowKind::SignIn).max_attempts, 5);
        assert_eq!(settings.policy(FlowKind::Mfa).max_attempts, 3);
        assert_eq!(settings.policy(FlowKind::Reauth).lockout_duration_seconds, 30);
        assert_eq!(settings.policy(FlowKind::PasswordReset).resend_cooldown_seconds, 30);
        assert_eq!(settings.policy(FlowKind::Mfa).code_length, 6);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_apply_to_all_flows() {
        temp_env::with_vars(
            [
                ("CHALLENGE_MAX_ATTEMPTS", Some("4")),
                ("CHALLENGE_LOCKOUT_SECONDS", Some("90")),
                ("CHALLENGE_RESEND_COOLDOWN_SECONDS", Some("not-a-number")),
                ("CHALLENGE_CODE_LENGTH", None),
            ],
            || {
                let settings = ChallengeSettings::from_env();
                for flow in FlowKind::ALL {
                    let policy = settings.policy(flow);
                    assert_eq!(policy.max_attempts, 4);
                    assert_eq!(policy.lockout_duration_seconds, 90);
                    assert_eq!(policy.resend_cooldown_seconds, 30);
                    assert_eq!(policy.code_length, 6);
                }
            },
        );
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut settings = ChallengeSettings::default();
        settings.mfa.max_attempts = 0;

        match settings.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "challenge.mfa.max_attempts");
            }
            other => panic!("Expected invalid value error, got {:?}", other),
        }
    }
}
