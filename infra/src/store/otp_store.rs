//! In-memory store of issued one-time codes
//!
//! Codes are kept only as SHA-256 digests with an expiry. Issuing a new code
//! for the same channel and identifier replaces the previous one, and a code
//! is removed as soon as it is accepted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use vc_core::{Channel, Clock, SystemClock};
use vc_shared::mask_identifier;

/// Longest lifetime a code can be issued with (one week)
const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Result of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Mismatch,
    Expired,
    Missing,
}

#[derive(Debug, Clone)]
struct IssuedCode {
    digest: String,
    expires_at: DateTime<Utc>,
}

/// Issued-code store shared by the delivery gateway and the verifier
pub struct OtpStore {
    codes: Mutex<HashMap<(Channel, String), IssuedCode>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl OtpStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_clock(ttl_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            clock,
        }
    }

    /// Remember `code` for (channel, identifier), replacing any earlier code
    pub fn issue(&self, channel: Channel, identifier: &str, code: &str) -> DateTime<Utc> {
        let expires_at = self.clock.now() + self.ttl;
        let replaced = self
            .codes()
            .insert(
                (channel, identifier.to_string()),
                IssuedCode {
                    digest: digest_code(code),
                    expires_at,
                },
            )
            .is_some();

        info!(
            channel = %channel,
            identifier = %mask_identifier(identifier),
            replaced_previous = replaced,
            expires_at = %expires_at,
            event = "otp_generated",
            "One-time code issued"
        );
        expires_at
    }

    /// Check `code` for (channel, identifier); a valid code is consumed
    pub fn verify(&self, channel: Channel, identifier: &str, code: &str) -> OtpCheck {
        let key = (channel, identifier.to_string());
        let now = self.clock.now();
        let mut codes = self.codes();

        let Some(issued) = codes.get(&key) else {
            debug!(channel = %channel, "No code issued");
            return OtpCheck::Missing;
        };

        if now >= issued.expires_at {
            codes.remove(&key);
            warn!(
                channel = %channel,
                identifier = %mask_identifier(identifier),
                event = "otp_expired",
                "Submitted code has expired"
            );
            return OtpCheck::Expired;
        }

        let provided = digest_code(code);
        if !constant_time_eq(issued.digest.as_bytes(), provided.as_bytes()) {
            return OtpCheck::Mismatch;
        }

        codes.remove(&key);
        info!(
            channel = %channel,
            identifier = %mask_identifier(identifier),
            event = "otp_consumed",
            "One-time code accepted and consumed"
        );
        OtpCheck::Valid
    }

    /// Withdraw the code for (channel, identifier), e.g. after a failed send
    pub fn revoke(&self, channel: Channel, identifier: &str) -> bool {
        self.codes()
            .remove(&(channel, identifier.to_string()))
            .is_some()
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut codes = self.codes();
        let before = codes.len();
        codes.retain(|_, issued| now < issued.expires_at);
        before - codes.len()
    }

    pub fn len(&self) -> usize {
        self.codes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes().is_empty()
    }

    fn codes(&self) -> MutexGuard<'_, HashMap<(Channel, String), IssuedCode>> {
        self.codes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Hex-encoded SHA-256 digest of a code
pub fn digest_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
