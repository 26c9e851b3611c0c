//! Verification channels a challenge can be answered through.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A way for the user to prove who they are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Account password
    Password,
    /// Authenticator app code
    Totp,
    /// One-time code delivered by SMS
    Sms,
    /// One-time code delivered over WhatsApp
    Whatsapp,
    /// One-time code delivered by email
    EmailOtp,
    /// Single-use backup code
    RecoveryCode,
}

impl Channel {
    /// Every channel, in the order flows usually present them
    pub const ALL: [Channel; 6] = [
        Channel::Password,
        Channel::Totp,
        Channel::Sms,
        Channel::Whatsapp,
        Channel::EmailOtp,
        Channel::RecoveryCode,
    ];

    /// Whether a code has to be sent before the user can answer
    pub fn requires_delivery(&self) -> bool {
        matches!(self, Channel::Sms | Channel::Whatsapp | Channel::EmailOtp)
    }

    /// Whether the answer is entered into fixed-length digit slots
    pub fn uses_digit_code(&self) -> bool {
        matches!(
            self,
            Channel::Totp | Channel::Sms | Channel::Whatsapp | Channel::EmailOtp
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Password => "password",
            Channel::Totp => "totp",
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
            Channel::EmailOtp => "email_otp",
            Channel::RecoveryCode => "recovery_code",
        }
    }

    /// Human-readable label for notifications
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Password => "password",
            Channel::Totp => "authenticator app",
            Channel::Sms => "SMS",
            Channel::Whatsapp => "WhatsApp",
            Channel::EmailOtp => "email",
            Channel::RecoveryCode => "recovery code",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "password" => Ok(Channel::Password),
            "totp" | "authenticator" => Ok(Channel::Totp),
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            "email_otp" | "email" => Ok(Channel::EmailOtp),
            "recovery_code" | "recovery" => Ok(Channel::RecoveryCode),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}
