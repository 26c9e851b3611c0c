//! Business services containing the challenge logic.

pub mod challenge;

// Re-export commonly used types
pub use challenge::{
    available_channels, flow_channels, is_channel_available, ChallengeConfig, ChallengeEngine,
    ChallengeTicker, Clock, CredentialVerifierTrait, DeliveryGatewayTrait, NotificationSinkTrait,
    SystemClock, TickerHandle,
};
