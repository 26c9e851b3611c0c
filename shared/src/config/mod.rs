//! Configuration module
//!
//! - `challenge` - Attempt, lockout and resend policies per verification flow
//! - `environment` - Environment detection and logging configuration

pub mod challenge;
pub mod environment;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;

// Re-export commonly used types
pub use challenge::{ChallengePolicyConfig, ChallengeSettings, FlowKind};
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Prefix for environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "VC";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Challenge policies per flow
    #[serde(default)]
    pub challenge: ChallengeSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            challenge: ChallengeSettings::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            challenge: ChallengeSettings::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Layer `from_env()` defaults, an optional TOML file and `VC__`-prefixed
    /// variables (e.g. `VC__CHALLENGE__MFA__MAX_ATTEMPTS=5`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::from_env();

        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&defaults)?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.challenge.validate()?;
        Ok(config)
    }
}
