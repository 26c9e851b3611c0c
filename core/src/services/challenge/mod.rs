//! Verification challenge module
//!
//! This module provides the multi-channel verification challenge including:
//! - Channel availability by identifier kind
//! - Code delivery with a resend cooldown
//! - Digit-slot and text secret entry
//! - Verification with attempt counting and timed lockout
//! - A background 1 Hz ticker

mod config;
mod engine;
pub mod policy;
mod selector;
mod ticker;
mod traits;

#[cfg(test)]
mod tests;

pub use config::{flow_channels, ChallengeConfig};
pub use engine::ChallengeEngine;
pub use selector::{available_channels, is_channel_available};
pub use ticker::{ChallengeTicker, TickerHandle, TICK_PERIOD};
pub use traits::{
    Clock, CredentialVerifierTrait, DeliveryGatewayTrait, NotificationSinkTrait, SystemClock,
};
