//! Read-only view of a challenge for rendering

use serde::Serialize;

use crate::domain::entities::{ChallengePhase, Channel};
use vc_shared::IdentifierKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeSnapshot {
    pub flow_id: String,
    pub identifier_kind: IdentifierKind,
    pub masked_identifier: String,
    pub available_channels: Vec<Channel>,
    pub active_channel: Channel,
    pub phase: ChallengePhase,
    pub code_sent: bool,
    pub cooldown_remaining: u32,
    pub can_resend: bool,
    /// Digit slots for code channels; empty for text channels
    pub code_slots: Vec<Option<char>>,
    pub active_slot: Option<usize>,
    /// Characters in the text field for password/recovery channels
    pub secret_length: usize,
    pub failure_count: u32,
    pub remaining_attempts: u32,
    pub lock_remaining_seconds: Option<u64>,
    pub trust_device: bool,
}
