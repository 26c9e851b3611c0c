//! Mutable state of a single verification challenge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::code_entry::SecretEntry;

/// Where the challenge currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    /// Waiting for the user to send a code and/or enter a secret
    Entering,
    /// A verifier round-trip is outstanding
    Verifying,
    /// Too many rejections; submissions are refused until `locked_until`
    Locked,
    /// Verified; terminal
    Succeeded,
}

/// State owned exclusively by one challenge engine
#[derive(Debug, Clone)]
pub struct ChallengeState {
    pub active_channel: Channel,
    pub code_sent: bool,
    pub cooldown_remaining: u32,
    pub entry: SecretEntry,
    pub failure_count: u32,
    pub locked_until: Option<DateTime<Utc>>,
    pub phase: ChallengePhase,
    /// Bumped on channel switch and reset; responses from an older epoch are dropped
    pub epoch: u64,
    pub trust_device: bool,
    pub success_reported: bool,
}

impl ChallengeState {
    pub fn new(channel: Channel, code_length: usize) -> Self {
        Self {
            active_channel: channel,
            code_sent: false,
            cooldown_remaining: 0,
            entry: SecretEntry::for_channel(channel, code_length),
            failure_count: 0,
            locked_until: None,
            phase: ChallengePhase::Entering,
            epoch: 0,
            trust_device: false,
            success_reported: false,
        }
    }

    /// Make `channel` active with a fresh buffer, no pending code and no failures.
    ///
    /// An active lock survives the switch.
    pub fn switch_channel(&mut self, channel: Channel, code_length: usize) {
        self.active_channel = channel;
        self.code_sent = false;
        self.cooldown_remaining = 0;
        self.entry = SecretEntry::for_channel(channel, code_length);
        self.failure_count = 0;
        self.epoch += 1;
        if self.phase == ChallengePhase::Verifying {
            self.phase = ChallengePhase::Entering;
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.locked_until, Some(until) if now < until)
    }

    /// Release an expired lock. Returns true when the lock was lifted.
    pub fn refresh_lock(&mut self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(until) if now >= until => {
                self.locked_until = None;
                self.failure_count = 0;
                if self.phase == ChallengePhase::Locked {
                    self.phase = ChallengePhase::Entering;
                }
                true
            }
            _ => false,
        }
    }

    pub fn lock(&mut self, until: DateTime<Utc>) {
        self.locked_until = Some(until);
        self.phase = ChallengePhase::Locked;
        self.entry.clear();
    }

    pub fn succeed(&mut self) {
        self.phase = ChallengePhase::Succeeded;
        self.failure_count = 0;
        self.locked_until = None;
        self.cooldown_remaining = 0;
    }
}
