//! Domain entities representing the verification challenge.

pub mod challenge_state;
pub mod channel;
pub mod code_entry;

// Re-export commonly used types
pub use challenge_state::{ChallengePhase, ChallengeState};
pub use channel::Channel;
pub use code_entry::{normalize_recovery_code, CodeEntry, SecretEntry};
