//! Configuration management for infrastructure services
//!
//! Handles:
//! - Delivery provider selection
//! - Issued code lifetime
//! - Demo credentials for the console verifier

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InfrastructureError;

/// Transport used to carry code messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// Print messages to stdout
    Console,
    /// Record messages in memory
    Mock,
}

impl FromStr for DeliveryProvider {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" | "stdout" => Ok(DeliveryProvider::Console),
            "mock" => Ok(DeliveryProvider::Mock),
            other => Err(InfrastructureError::Config(format!(
                "Unknown delivery provider: {}",
                other
            ))),
        }
    }
}

/// Secrets accepted by the demo verifier
#[derive(Clone, Serialize, Deserialize)]
pub struct DemoSecrets {
    pub password: String,
    pub totp_code: String,
    pub recovery_codes: Vec<String>,
}

impl std::fmt::Debug for DemoSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoSecrets")
            .field("password", &"<redacted>")
            .field("totp_code", &"<redacted>")
            .field("recovery_codes", &self.recovery_codes.len())
            .finish()
    }
}

impl Default for DemoSecrets {
    fn default() -> Self {
        Self {
            password: "correct-horse".to_string(),
            totp_code: "246810".to_string(),
            recovery_codes: vec!["ABCD-EFGH-JKLM".to_string(), "NPQR-STUV-WXYZ".to_string()],
        }
    }
}

/// Infrastructure configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    /// Message transport for one-time codes
    pub delivery_provider: DeliveryProvider,
    /// Seconds an issued code stays valid
    pub code_expiry_seconds: u64,
    /// bcrypt cost used when hashing the demo password
    pub bcrypt_cost: u32,
    /// Demo verifier secrets
    pub demo: DemoSecrets,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            delivery_provider: DeliveryProvider::Console,
            code_expiry_seconds: 300, // 5 minutes
            bcrypt_cost: bcrypt::DEFAULT_COST,
            demo: DemoSecrets::default(),
        }
    }
}

impl InfrastructureConfig {
    /// Load infrastructure configuration from environment
    ///
    /// Reads a `.env` file when present. Unset variables keep their defaults;
    /// malformed values are errors.
    pub fn from_env() -> Result<Self, InfrastructureError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(provider) = env::var("DELIVERY_PROVIDER") {
            config.delivery_provider = provider.parse()?;
        }
        if let Ok(expiry) = env::var("CODE_EXPIRY_SECONDS") {
            config.code_expiry_seconds = parse_number("CODE_EXPIRY_SECONDS", &expiry)?;
        }
        if let Ok(cost) = env::var("BCRYPT_COST") {
            config.bcrypt_cost = parse_number("BCRYPT_COST", &cost)?;
        }
        if let Ok(password) = env::var("DEMO_PASSWORD") {
            config.demo.password = password;
        }
        if let Ok(code) = env::var("DEMO_TOTP_CODE") {
            config.demo.totp_code = code;
        }
        if let Ok(codes) = env::var("DEMO_RECOVERY_CODES") {
            config.demo.recovery_codes = codes
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(String::from)
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InfrastructureError> {
        if self.code_expiry_seconds == 0 {
            return Err(InfrastructureError::Config(
                "CODE_EXPIRY_SECONDS must be greater than 0".to_string(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(InfrastructureError::Config(
                "BCRYPT_COST must be between 4 and 31".to_string(),
            ));
        }
        if self.demo.password.is_empty() {
            return Err(InfrastructureError::Config(
                "DEMO_PASSWORD must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T, InfrastructureError> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            InfrastructureError::Config(format!("{} must be a number, got '{}'", name, value))
        })
}
