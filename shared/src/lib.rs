//! Shared utilities and common types for the verification console
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types (environment, logging, challenge policy presets)
//! - Configuration error type
//! - Utility functions (identifier classification, phone normalisation, masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ChallengePolicyConfig, ChallengeSettings, Environment, FlowKind, LogFormat,
    LoggingConfig,
};
pub use errors::ConfigError;
pub use utils::{identifier, phone};
pub use utils::identifier::{classify_identifier, mask_identifier, IdentifierKind};
