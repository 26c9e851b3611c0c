//! Verification challenge engine
//!
//! One engine instance drives one verification flow: it tracks the active
//! channel, gates code delivery behind a resend cooldown, collects the user's
//! secret, asks the verifier, and counts rejections up to a timed lockout.
//!
//! State lives behind a mutex that is never held across an `.await`, so the
//! 1 Hz ticker keeps running while a verification round-trip is in flight.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use vc_shared::identifier::normalize_identifier;
use vc_shared::{classify_identifier, mask_identifier, IdentifierKind};

use crate::domain::entities::{ChallengePhase, ChallengeState, Channel, CodeEntry, SecretEntry};
use crate::domain::value_objects::{
    ChallengeSnapshot, Notification, SendOutcome, SubmitOutcome, VerifyResponse,
};
use crate::errors::{ChallengeError, ChallengeResult, ValidationError};

use super::config::ChallengeConfig;
use super::policy;
use super::selector::available_channels;
use super::traits::{
    Clock, CredentialVerifierTrait, DeliveryGatewayTrait, NotificationSinkTrait, SystemClock,
};

/// Outcome of applying a verifier response to the state
struct Applied {
    result: ChallengeResult<SubmitOutcome>,
    notification: Notification,
    succeeded: Option<bool>,
}

/// Verification challenge engine; clones share the same challenge
pub struct ChallengeEngine<D, V, N>
where
    D: DeliveryGatewayTrait,
    V: CredentialVerifierTrait,
    N: NotificationSinkTrait,
{
    flow_id: Uuid,
    identifier: Arc<str>,
    masked_identifier: Arc<str>,
    identifier_kind: IdentifierKind,
    available: Arc<[Channel]>,
    config: Arc<ChallengeConfig>,
    delivery: Arc<D>,
    verifier: Arc<V>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<ChallengeState>>,
}

impl<D, V, N> Clone for ChallengeEngine<D, V, N>
where
    D: DeliveryGatewayTrait,
    V: CredentialVerifierTrait,
    N: NotificationSinkTrait,
{
    fn clone(&self) -> Self {
        Self {
            flow_id: self.flow_id,
            identifier: Arc::clone(&self.identifier),
            masked_identifier: Arc::clone(&self.masked_identifier),
            identifier_kind: self.identifier_kind,
            available: Arc::clone(&self.available),
            config: Arc::clone(&self.config),
            delivery: Arc::clone(&self.delivery),
            verifier: Arc::clone(&self.verifier),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            state: Arc::clone(&self.state),
        }
    }
}

impl<D, V, N> ChallengeEngine<D, V, N>
where
    D: DeliveryGatewayTrait,
    V: CredentialVerifierTrait,
    N: NotificationSinkTrait,
{
    /// Create a challenge for `identifier` using the wall clock
    ///
    /// # Arguments
    ///
    /// * `config` - Allowed channels and attempt/lockout/cooldown policy
    /// * `identifier` - Raw email or phone number as typed by the user
    /// * `delivery` - Gateway that sends one-time codes
    /// * `verifier` - Backend that accepts or rejects secrets
    /// * `notifier` - Presentation layer sink for status events
    ///
    /// # Returns
    ///
    /// * `Ok(ChallengeEngine)` - Engine with the first available channel active
    /// * `Err(ChallengeError)` - If the config is invalid or no channel fits the identifier
    pub fn new(
        config: ChallengeConfig,
        identifier: &str,
        delivery: Arc<D>,
        verifier: Arc<V>,
        notifier: Arc<N>,
    ) -> ChallengeResult<Self> {
        Self::with_clock(config, identifier, delivery, verifier, notifier, Arc::new(SystemClock))
    }

    /// Create a challenge with an explicit time source
    pub fn with_clock(
        config: ChallengeConfig,
        identifier: &str,
        delivery: Arc<D>,
        verifier: Arc<V>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> ChallengeResult<Self> {
        config.validate()?;

        let identifier_kind = classify_identifier(identifier);
        let available = available_channels(identifier_kind, &config.allowed_channels);
        let first = *available
            .first()
            .ok_or(ValidationError::NoChannelAvailable)?;

        let flow_id = Uuid::new_v4();
        let masked_identifier = mask_identifier(identifier);
        info!(
            flow_id = %flow_id,
            identifier = %masked_identifier,
            identifier_kind = %identifier_kind,
            channel = %first,
            event = "challenge_started",
            "Verification challenge started"
        );

        let state = ChallengeState::new(first, config.code_length);
        Ok(Self {
            flow_id,
            identifier: Arc::from(normalize_identifier(identifier)),
            masked_identifier: Arc::from(masked_identifier),
            identifier_kind,
            available: Arc::from(available),
            config: Arc::new(config),
            delivery,
            verifier,
            notifier,
            clock,
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn identifier_kind(&self) -> IdentifierKind {
        self.identifier_kind
    }

    pub fn masked_identifier(&self) -> &str {
        &self.masked_identifier
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Channels the user may pick for this identifier
    pub fn available_channels(&self) -> &[Channel] {
        &self.available
    }

    pub fn active_channel(&self) -> Channel {
        self.state().active_channel
    }

    /// Current phase, releasing an expired lock first
    pub fn phase(&self) -> ChallengePhase {
        let now = self.clock.now();
        let mut state = self.state();
        state.refresh_lock(now);
        state.phase
    }

    pub fn code_sent(&self) -> bool {
        self.state().code_sent
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.state().cooldown_remaining
    }

    pub fn failure_count(&self) -> u32 {
        self.state().failure_count
    }

    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.state().locked_until
    }

    /// Seconds until the lock lifts, if locked
    pub fn lock_remaining_seconds(&self) -> Option<u64> {
        let now = self.clock.now();
        let mut state = self.state();
        state.refresh_lock(now);
        state
            .locked_until
            .map(|until| policy::remaining_seconds(until, now))
    }

    /// The secret as it would be submitted for the active channel
    pub fn assembled_secret(&self) -> String {
        let state = self.state();
        state.entry.assembled(state.active_channel)
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> ChallengeSnapshot {
        let now = self.clock.now();
        let mut state = self.state();
        state.refresh_lock(now);

        let (code_slots, active_slot, secret_length) = match &state.entry {
            SecretEntry::Digits(entry) => (entry.slots().to_vec(), Some(entry.active_slot()), 0),
            SecretEntry::Text(value) => (Vec::new(), None, value.chars().count()),
        };

        ChallengeSnapshot {
            flow_id: self.flow_id.to_string(),
            identifier_kind: self.identifier_kind,
            masked_identifier: self.masked_identifier.to_string(),
            available_channels: self.available.to_vec(),
            active_channel: state.active_channel,
            phase: state.phase,
            code_sent: state.code_sent,
            cooldown_remaining: state.cooldown_remaining,
            can_resend: state.active_channel.requires_delivery()
                && state.cooldown_remaining == 0
                && state.phase != ChallengePhase::Succeeded,
            code_slots,
            active_slot,
            secret_length,
            failure_count: state.failure_count,
            remaining_attempts: policy::remaining_attempts(
                state.failure_count,
                self.config.max_attempts,
            ),
            lock_remaining_seconds: state
                .locked_until
                .map(|until| policy::remaining_seconds(until, now)),
            trust_device: state.trust_device,
        }
    }

    /// Switch to another channel, discarding the current channel's progress
    ///
    /// Channels outside the available set are refused without touching state.
    pub fn select_channel(&self, channel: Channel) -> ChallengeResult<()> {
        if !self.available.contains(&channel) {
            let err = ValidationError::ChannelUnavailable { channel };
            warn!(
                flow_id = %self.flow_id,
                channel = %channel,
                event = "channel_unavailable",
                "Rejected selection of unavailable channel"
            );
            self.notifier.notify(Notification::warning(err.to_string()));
            return Err(err.into());
        }

        let mut state = self.state();
        if state.phase == ChallengePhase::Succeeded {
            return Err(ChallengeError::Completed);
        }
        if state.active_channel == channel {
            return Ok(());
        }

        let previous = state.active_channel;
        state.switch_channel(channel, self.config.code_length);
        info!(
            flow_id = %self.flow_id,
            from = %previous,
            to = %channel,
            event = "channel_switched",
            "Verification channel switched"
        );
        Ok(())
    }

    /// Send (or resend) a code through the active channel
    ///
    /// The cooldown starts before the gateway is called, so a second request
    /// made while the first is still in flight is refused instead of sending
    /// a duplicate message.
    pub async fn request_send(&self) -> ChallengeResult<SendOutcome> {
        let now = self.clock.now();
        let channel = {
            let mut state = self.state();
            state.refresh_lock(now);
            if state.phase == ChallengePhase::Succeeded {
                return Err(ChallengeError::Completed);
            }

            let channel = state.active_channel;
            if !channel.requires_delivery() {
                return Ok(SendOutcome::NotRequired);
            }

            if state.cooldown_remaining > 0 {
                let remaining = state.cooldown_remaining;
                drop(state);

                warn!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    cooldown_remaining = remaining,
                    event = "rate_limit_exceeded",
                    "Code resend requested during cooldown"
                );
                let err = ValidationError::CooldownActive {
                    remaining_seconds: remaining,
                };
                self.notifier.notify(Notification::warning(err.to_string()));
                return Err(err.into());
            }

            state.code_sent = true;
            state.cooldown_remaining = self.config.resend_cooldown_seconds;
            channel
        };

        info!(
            flow_id = %self.flow_id,
            channel = %channel,
            identifier = %self.masked_identifier,
            event = "delivery_requested",
            "Requesting code delivery"
        );

        match self.delivery.request_delivery(channel, &self.identifier).await {
            Ok(message_id) => {
                self.notifier.notify(Notification::info(format!(
                    "Code sent via {} to {}",
                    channel.label(),
                    self.masked_identifier
                )));
                Ok(SendOutcome::Sent {
                    masked_identifier: self.masked_identifier.to_string(),
                    message_id,
                    cooldown_seconds: self.config.resend_cooldown_seconds,
                })
            }
            Err(message) => {
                warn!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    error = %message,
                    event = "delivery_failed",
                    "Code delivery failed"
                );
                let err = ChallengeError::Delivery { channel, message };
                self.notifier.notify(Notification::warning(err.to_string()));
                Err(err)
            }
        }
    }

    /// Advance the resend countdown by one second and release an expired lock
    pub fn tick(&self) {
        let now = self.clock.now();
        let mut state = self.state();

        if state.cooldown_remaining > 0 {
            state.cooldown_remaining -= 1;
            if state.cooldown_remaining == 0 {
                debug!(
                    flow_id = %self.flow_id,
                    channel = %state.active_channel,
                    "Resend available"
                );
            }
        }

        if state.refresh_lock(now) {
            info!(
                flow_id = %self.flow_id,
                event = "challenge_unlocked",
                "Challenge lock expired"
            );
        }
    }

    /// Put a digit into a code slot; returns whether it was accepted
    pub fn input_digit(&self, slot: usize, digit: char) -> bool {
        self.with_code_entry(|entry| entry.input_digit(slot, digit))
            .unwrap_or(false)
    }

    /// Put a digit into the focused code slot
    pub fn type_digit(&self, digit: char) -> bool {
        self.with_code_entry(|entry| entry.type_digit(digit))
            .unwrap_or(false)
    }

    /// Backspace on a code slot
    pub fn backspace(&self, slot: usize) {
        self.with_code_entry(|entry| entry.backspace(slot));
    }

    /// Paste text into the code slots; returns the number of digits written
    pub fn paste_code(&self, text: &str) -> usize {
        self.with_code_entry(|entry| entry.paste(text)).unwrap_or(0)
    }

    /// Replace the secret for the active channel.
    ///
    /// On code channels this clears the slots and pastes `text`.
    pub fn set_secret(&self, text: &str) {
        let mut state = self.state();
        if state.phase == ChallengePhase::Succeeded {
            return;
        }
        match &mut state.entry {
            SecretEntry::Digits(entry) => {
                entry.clear();
                entry.paste(text);
            }
            SecretEntry::Text(value) => {
                value.clear();
                value.push_str(text);
            }
        }
    }

    pub fn clear_secret(&self) {
        self.state().entry.clear();
    }

    /// Ask the session layer to remember this device once the challenge succeeds
    pub fn set_trust_device(&self, trust_device: bool) {
        self.state().trust_device = trust_device;
    }

    /// Submit the entered secret for verification
    ///
    /// Local guards (lock, pending delivery, incomplete input) are checked
    /// first and never reach the verifier. Only verifier rejections count
    /// toward the lockout; transport failures leave the counters untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(SubmitOutcome::Succeeded)` - The verifier accepted the secret
    /// * `Ok(SubmitOutcome::AlreadySucceeded)` - Nothing to do, already verified
    /// * `Ok(SubmitOutcome::Superseded)` - The channel changed while verifying
    /// * `Err(ChallengeError)` - Validation, rejection, lock or transport failure
    pub async fn submit(&self) -> ChallengeResult<SubmitOutcome> {
        let now = self.clock.now();
        let (channel, epoch, secret) = {
            let mut state = self.state();
            if state.refresh_lock(now) {
                info!(
                    flow_id = %self.flow_id,
                    event = "challenge_unlocked",
                    "Challenge lock expired"
                );
            }

            match state.phase {
                ChallengePhase::Succeeded => return Ok(SubmitOutcome::AlreadySucceeded),
                ChallengePhase::Verifying => return Err(ChallengeError::InProgress),
                ChallengePhase::Entering | ChallengePhase::Locked => {}
            }

            if let Some(until) = state.locked_until.filter(|until| now < *until) {
                drop(state);

                let retry_after_seconds = policy::remaining_seconds(until, now);
                warn!(
                    flow_id = %self.flow_id,
                    retry_after_seconds = retry_after_seconds,
                    event = "verification_blocked_locked",
                    "Verification attempt blocked - challenge locked"
                );
                let err = ChallengeError::Locked {
                    retry_after_seconds,
                };
                self.notifier.notify(Notification::warning(err.to_string()));
                return Err(err);
            }

            let channel = state.active_channel;
            let ready = self.check_ready(&state);
            if let Err(err) = ready {
                drop(state);

                debug!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    error = %err,
                    "Submission refused locally"
                );
                self.notifier.notify(Notification::warning(err.to_string()));
                return Err(err.into());
            }

            state.phase = ChallengePhase::Verifying;
            (channel, state.epoch, state.entry.assembled(channel))
        };

        debug!(
            flow_id = %self.flow_id,
            channel = %channel,
            event = "verification_started",
            "Submitting secret to verifier"
        );
        let response = self
            .verifier
            .verify_secret(channel, &self.identifier, &secret)
            .await;

        let now = self.clock.now();
        let applied = {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    event = "verification_superseded",
                    "Dropping verifier response for a previous channel"
                );
                return Ok(SubmitOutcome::Superseded);
            }
            self.apply_response(&mut state, channel, response, now)
        };

        self.notifier.notify(applied.notification);
        if let Some(trust_device) = applied.succeeded {
            self.notifier.on_succeeded(trust_device);
        }
        applied.result
    }

    /// Start over on the first available channel.
    ///
    /// A lock that is still running is kept; the trust flag is kept.
    /// A challenge that already succeeded stays succeeded.
    pub fn reset(&self) -> ChallengeResult<()> {
        let now = self.clock.now();
        let mut state = self.state();
        if state.phase == ChallengePhase::Succeeded {
            return Err(ChallengeError::Completed);
        }

        let locked_until = state.locked_until.filter(|until| now < *until);
        let mut fresh = ChallengeState::new(self.available[0], self.config.code_length);
        fresh.epoch = state.epoch + 1;
        fresh.trust_device = state.trust_device;
        fresh.success_reported = state.success_reported;
        if let Some(until) = locked_until {
            fresh.lock(until);
        }
        *state = fresh;

        info!(
            flow_id = %self.flow_id,
            event = "challenge_reset",
            "Verification challenge reset"
        );
        Ok(())
    }

    fn check_ready(&self, state: &ChallengeState) -> Result<(), ValidationError> {
        let channel = state.active_channel;
        if channel.requires_delivery() && !state.code_sent {
            return Err(ValidationError::CodeNotSent);
        }
        match &state.entry {
            SecretEntry::Digits(entry) if !entry.is_complete() => {
                Err(ValidationError::IncompleteCode {
                    expected: entry.code_length(),
                    actual: entry.filled(),
                })
            }
            SecretEntry::Digits(_) => Ok(()),
            SecretEntry::Text(_) => {
                if state.entry.assembled(channel).is_empty() {
                    Err(ValidationError::EmptySecret { channel })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn apply_response(
        &self,
        state: &mut ChallengeState,
        channel: Channel,
        response: VerifyResponse,
        now: DateTime<Utc>,
    ) -> Applied {
        match response {
            VerifyResponse::Accept => {
                state.succeed();
                let first_report = !state.success_reported;
                state.success_reported = true;

                info!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    trust_device = state.trust_device,
                    event = "verification_success",
                    "Verification challenge succeeded"
                );
                Applied {
                    result: Ok(SubmitOutcome::Succeeded {
                        trust_device: state.trust_device,
                    }),
                    notification: Notification::success("Verification successful"),
                    succeeded: first_report.then_some(state.trust_device),
                }
            }
            VerifyResponse::Reject => {
                state.failure_count += 1;
                let mut failure_count = state.failure_count;

                if policy::reaches_lockout(failure_count, self.config.max_attempts) {
                    let until = policy::lock_deadline(now, self.config.lockout_duration_seconds);
                    if until > now {
                        state.lock(until);
                        let locked_for = policy::remaining_seconds(until, now);

                        warn!(
                            flow_id = %self.flow_id,
                            channel = %channel,
                            failure_count = failure_count,
                            lock_expires_at = %until,
                            event = "challenge_locked",
                            "Maximum verification attempts exceeded - challenge locked"
                        );
                        return Applied {
                            result: Err(ChallengeError::Rejected {
                                channel,
                                failure_count,
                                remaining_attempts: 0,
                                locked_for_seconds: Some(locked_for),
                            }),
                            notification: Notification::error(format!(
                                "Too many attempts. Try again in {} seconds",
                                locked_for
                            )),
                            succeeded: None,
                        };
                    }

                    // Zero-length lockout: the counter starts over right away
                    state.failure_count = 0;
                    failure_count = 0;
                }

                state.phase = ChallengePhase::Entering;
                state.entry.clear();
                let remaining_attempts =
                    policy::remaining_attempts(failure_count, self.config.max_attempts);

                warn!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    failure_count = failure_count,
                    remaining_attempts = remaining_attempts,
                    event = "verification_failed",
                    "Verification rejected"
                );
                Applied {
                    result: Err(ChallengeError::Rejected {
                        channel,
                        failure_count,
                        remaining_attempts,
                        locked_for_seconds: None,
                    }),
                    notification: Notification::error(format!(
                        "Incorrect {}. {} attempts remaining",
                        channel.label(),
                        remaining_attempts
                    )),
                    succeeded: None,
                }
            }
            VerifyResponse::TransportError(message) => {
                state.phase = ChallengePhase::Entering;

                warn!(
                    flow_id = %self.flow_id,
                    channel = %channel,
                    error = %message,
                    event = "verification_transport_error",
                    "Verifier unreachable"
                );
                Applied {
                    result: Err(ChallengeError::Transport { message }),
                    notification: Notification::error(
                        "Could not reach the verification service. Please try again.",
                    ),
                    succeeded: None,
                }
            }
        }
    }

    fn with_code_entry<T>(&self, f: impl FnOnce(&mut CodeEntry) -> T) -> Option<T> {
        let mut state = self.state();
        if state.phase == ChallengePhase::Succeeded {
            return None;
        }
        match &mut state.entry {
            SecretEntry::Digits(entry) => Some(f(entry)),
            SecretEntry::Text(_) => None,
        }
    }

    fn state(&self) -> MutexGuard<'_, ChallengeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
