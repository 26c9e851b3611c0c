//! Unit tests for channel availability and selection

use std::sync::Arc;

use vc_shared::{ChallengeSettings, FlowKind, IdentifierKind};

use crate::domain::entities::{ChallengePhase, Channel};
use crate::domain::value_objects::NotificationKind;
use crate::errors::{ChallengeError, ValidationError};
use crate::services::challenge::{
    available_channels, is_channel_available, ChallengeConfig, ChallengeEngine,
};

use super::mocks::{Harness, MockDeliveryGateway, RecordingSink, ScriptedVerifier};

#[test]
fn test_availability_by_identifier_kind() {
    assert!(is_channel_available(IdentifierKind::Phone, Channel::Sms));
    assert!(is_channel_available(IdentifierKind::Phone, Channel::Whatsapp));
    assert!(!is_channel_available(IdentifierKind::Phone, Channel::EmailOtp));

    assert!(is_channel_available(IdentifierKind::Email, Channel::EmailOtp));
    assert!(!is_channel_available(IdentifierKind::Email, Channel::Sms));

    for kind in [IdentifierKind::Email, IdentifierKind::Phone, IdentifierKind::Unknown] {
        assert!(is_channel_available(kind, Channel::Password));
        assert!(is_channel_available(kind, Channel::Totp));
        assert!(is_channel_available(kind, Channel::RecoveryCode));
    }
    assert!(!is_channel_available(IdentifierKind::Unknown, Channel::Sms));
    assert!(!is_channel_available(IdentifierKind::Unknown, Channel::EmailOtp));
}

#[test]
fn test_available_channels_keep_allowed_order() {
    let allowed = [Channel::RecoveryCode, Channel::Sms, Channel::EmailOtp, Channel::Sms];

    assert_eq!(
        available_channels(IdentifierKind::Phone, &allowed),
        vec![Channel::RecoveryCode, Channel::Sms]
    );
    assert_eq!(
        available_channels(IdentifierKind::Email, &allowed),
        vec![Channel::RecoveryCode, Channel::EmailOtp]
    );
    assert!(available_channels(IdentifierKind::Unknown, &[Channel::Sms]).is_empty());
}

#[test]
fn test_phone_identifier_starts_on_first_available_channel() {
    let config = ChallengeConfig::new([Channel::EmailOtp, Channel::Sms, Channel::Totp]);
    let harness = Harness::new(config, "+256 772 123456", ScriptedVerifier::accepting());

    assert_eq!(harness.engine.identifier_kind(), IdentifierKind::Phone);
    assert_eq!(harness.engine.available_channels(), &[Channel::Sms, Channel::Totp]);
    assert_eq!(harness.engine.active_channel(), Channel::Sms);
    assert_eq!(harness.engine.masked_identifier(), "+25****3456");
    assert_eq!(harness.engine.phase(), ChallengePhase::Entering);
}

#[test]
fn test_email_identifier_offers_email_otp() {
    let harness = Harness::new(
        ChallengeConfig::default(),
        "jane@example.com",
        ScriptedVerifier::accepting(),
    );

    assert_eq!(
        harness.engine.available_channels(),
        &[Channel::Password, Channel::Totp, Channel::EmailOtp, Channel::RecoveryCode]
    );
    assert_eq!(harness.engine.masked_identifier(), "j***@example.com");
}

#[test]
fn test_no_channel_available() {
    let config = ChallengeConfig::for_flow(FlowKind::PasswordReset, &ChallengeSettings::default());
    let result = ChallengeEngine::new(
        config,
        "janedoe",
        Arc::new(MockDeliveryGateway::new()),
        Arc::new(ScriptedVerifier::accepting()),
        Arc::new(RecordingSink::new()),
    );

    assert!(matches!(
        result,
        Err(ChallengeError::Validation(ValidationError::NoChannelAvailable))
    ));
}

#[test]
fn test_invalid_config_is_refused() {
    let config = ChallengeConfig::default().with_max_attempts(0);
    let result = ChallengeEngine::new(
        config,
        "jane@example.com",
        Arc::new(MockDeliveryGateway::new()),
        Arc::new(ScriptedVerifier::accepting()),
        Arc::new(RecordingSink::new()),
    );

    match result {
        Err(err) => assert_eq!(err.code(), "INVALID_CONFIG"),
        Ok(_) => panic!("Expected invalid config error"),
    }
}

#[test]
fn test_selecting_unavailable_channel_changes_nothing() {
    let harness = Harness::new(
        ChallengeConfig::default(),
        "jane@example.com",
        ScriptedVerifier::accepting(),
    );
    harness.engine.set_secret("hunter2");
    let before = harness.engine.snapshot();

    let result = harness.engine.select_channel(Channel::Sms);

    assert_eq!(
        result,
        Err(ChallengeError::Validation(ValidationError::ChannelUnavailable {
            channel: Channel::Sms
        }))
    );
    assert_eq!(harness.engine.snapshot(), before);
    assert_eq!(harness.sink.kinds(), vec![NotificationKind::Warning]);
}

#[tokio::test]
async fn test_switching_channel_resets_channel_state() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    harness.engine.paste_code("123456");
    let _ = harness.engine.submit().await;
    assert_eq!(harness.engine.failure_count(), 1);

    harness.engine.select_channel(Channel::Whatsapp).unwrap();

    let snapshot = harness.engine.snapshot();
    assert_eq!(snapshot.active_channel, Channel::Whatsapp);
    assert!(!snapshot.code_sent);
    assert_eq!(snapshot.cooldown_remaining, 0);
    assert_eq!(snapshot.failure_count, 0);
    assert!(snapshot.code_slots.iter().all(Option::is_none));
    assert_eq!(snapshot.active_slot, Some(0));
}

#[test]
fn test_selecting_active_channel_is_noop() {
    let harness = Harness::phone(Channel::Totp, ScriptedVerifier::accepting());
    harness.engine.paste_code("12");

    harness.engine.select_channel(Channel::Totp).unwrap();

    assert_eq!(harness.engine.assembled_secret(), "12");
}

#[test]
fn test_flow_presets() {
    let settings = ChallengeSettings::default();

    let mfa = ChallengeConfig::for_flow(FlowKind::Mfa, &settings);
    assert!(!mfa.allowed_channels.contains(&Channel::Password));
    assert_eq!(mfa.max_attempts, settings.mfa.max_attempts);

    let reset = ChallengeConfig::for_flow(FlowKind::PasswordReset, &settings);
    assert!(reset.allowed_channels.iter().all(Channel::requires_delivery));

    let sign_in = ChallengeConfig::for_flow(FlowKind::SignIn, &settings);
    assert_eq!(sign_in.allowed_channels, Channel::ALL.to_vec());
}
