//! Unit tests for attempt counting and timed lockout

use crate::domain::entities::{ChallengePhase, Channel};
use crate::domain::value_objects::{NotificationKind, SubmitOutcome, VerifyResponse};
use crate::errors::ChallengeError;
use crate::services::challenge::ChallengeConfig;

use super::mocks::{Harness, ScriptedVerifier};

async fn reject_times(harness: &Harness, times: usize) {
    for _ in 0..times {
        harness.engine.paste_code("000000");
        let _ = harness.engine.submit().await;
    }
}

#[tokio::test]
async fn test_third_rejection_locks() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 2).await;

    harness.engine.paste_code("000000");
    let result = harness.engine.submit().await;

    assert_eq!(
        result,
        Err(ChallengeError::Rejected {
            channel: Channel::Sms,
            failure_count: 3,
            remaining_attempts: 0,
            locked_for_seconds: Some(30),
        })
    );
    assert_eq!(harness.engine.phase(), ChallengePhase::Locked);
    assert_eq!(harness.engine.lock_remaining_seconds(), Some(30));
    assert_eq!(harness.engine.assembled_secret(), "");

    let notification = harness.sink.last().unwrap();
    assert_eq!(notification.kind, NotificationKind::Error);
    assert_eq!(notification.message, "Too many attempts. Try again in 30 seconds");
}

#[tokio::test]
async fn test_locked_submit_never_reaches_verifier() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 3).await;
    assert_eq!(harness.verifier.call_count(), 3);

    harness.clock.advance(10);
    harness.engine.paste_code("123456");
    let result = harness.engine.submit().await;

    assert_eq!(
        result,
        Err(ChallengeError::Locked {
            retry_after_seconds: 20
        })
    );
    assert_eq!(harness.verifier.call_count(), 3);
    assert_eq!(harness.engine.failure_count(), 3);
    assert_eq!(harness.sink.last().unwrap().kind, NotificationKind::Warning);
}

#[tokio::test]
async fn test_lock_checked_before_local_guards() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 3).await;

    // Empty entry would otherwise fail as incomplete
    let result = harness.engine.submit().await;

    assert!(matches!(result, Err(ChallengeError::Locked { .. })));
}

#[tokio::test]
async fn test_lock_expires_and_resets_failures() {
    let harness = Harness::phone(
        Channel::Sms,
        ScriptedVerifier::scripted(
            [VerifyResponse::Reject, VerifyResponse::Reject, VerifyResponse::Reject],
            VerifyResponse::Accept,
        ),
    );
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 3).await;

    harness.tick_seconds(29);
    assert_eq!(harness.engine.phase(), ChallengePhase::Locked);
    assert_eq!(harness.engine.lock_remaining_seconds(), Some(1));

    harness.tick_seconds(1);
    assert_eq!(harness.engine.phase(), ChallengePhase::Entering);
    assert_eq!(harness.engine.failure_count(), 0);
    assert_eq!(harness.engine.lock_remaining_seconds(), None);

    harness.engine.paste_code("482913");
    let outcome = harness.engine.submit().await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Succeeded { trust_device: false });
}

#[tokio::test]
async fn test_lock_releases_on_submit_without_tick() {
    let harness = Harness::phone(
        Channel::Password,
        ScriptedVerifier::scripted(
            [VerifyResponse::Reject, VerifyResponse::Reject, VerifyResponse::Reject],
            VerifyResponse::Accept,
        ),
    );
    for _ in 0..3 {
        harness.engine.set_secret("wrong");
        let _ = harness.engine.submit().await;
    }

    harness.clock.advance(31);
    harness.engine.set_secret("right");

    assert!(harness.engine.submit().await.is_ok());
}

#[tokio::test]
async fn test_lock_survives_channel_switch() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 3).await;

    harness.engine.select_channel(Channel::Password).unwrap();
    harness.engine.set_secret("guess");
    let result = harness.engine.submit().await;

    assert!(matches!(result, Err(ChallengeError::Locked { .. })));
    assert_eq!(harness.engine.phase(), ChallengePhase::Locked);

    harness.engine.reset().unwrap();
    assert_eq!(harness.engine.phase(), ChallengePhase::Locked);
}

#[tokio::test]
async fn test_sends_allowed_while_locked() {
    let harness = Harness::phone(Channel::Sms, ScriptedVerifier::rejecting());
    harness.engine.request_send().await.unwrap();
    reject_times(&harness, 3).await;

    harness.tick_seconds(5);
    harness.engine.select_channel(Channel::Whatsapp).unwrap();

    assert!(harness.engine.request_send().await.is_ok());
}

#[tokio::test]
async fn test_failures_below_threshold_without_lock() {
    let config = ChallengeConfig::default().with_max_attempts(5);
    let harness = Harness::new(config, "+256772123456", ScriptedVerifier::rejecting());
    harness.engine.select_channel(Channel::Totp).unwrap();

    for expected in 1..5u32 {
        harness.engine.paste_code("000000");
        let result = harness.engine.submit().await;
        match result {
            Err(ChallengeError::Rejected {
                failure_count,
                remaining_attempts,
                locked_for_seconds,
                ..
            }) => {
                assert_eq!(failure_count, expected);
                assert_eq!(remaining_attempts, 5 - expected);
                assert_eq!(locked_for_seconds, None);
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
        assert_eq!(harness.engine.phase(), ChallengePhase::Entering);
    }

    harness.engine.paste_code("000000");
    assert!(matches!(
        harness.engine.submit().await,
        Err(ChallengeError::Rejected {
            locked_for_seconds: Some(30),
            ..
        })
    ));
}

#[tokio::test]
async fn test_lock_rounds_partial_seconds_up() {
    let config = ChallengeConfig::default()
        .with_max_attempts(1)
        .with_lockout_duration_seconds(10);
    let harness = Harness::new(config, "jane@example.com", ScriptedVerifier::rejecting());
    harness.engine.set_secret("nope");
    let _ = harness.engine.submit().await;

    harness.clock.advance_millis(9_200);
    assert_eq!(harness.engine.lock_remaining_seconds(), Some(1));

    harness.clock.advance_millis(800);
    assert_eq!(harness.engine.lock_remaining_seconds(), None);
}

#[tokio::test]
async fn test_zero_lockout_restarts_the_count() {
    let config = ChallengeConfig::default()
        .with_max_attempts(2)
        .with_lockout_duration_seconds(0);
    let harness = Harness::new(config, "jane@example.com", ScriptedVerifier::rejecting());

    harness.engine.set_secret("nope");
    let _ = harness.engine.submit().await;
    harness.engine.set_secret("nope");
    let result = harness.engine.submit().await;

    assert_eq!(
        result,
        Err(ChallengeError::Rejected {
            channel: Channel::Password,
            failure_count: 0,
            remaining_attempts: 2,
            locked_for_seconds: None,
        })
    );
    assert_eq!(harness.engine.phase(), ChallengePhase::Entering);
    assert_eq!(harness.engine.locked_until(), None);
    assert_eq!(harness.engine.failure_count(), 0);
    assert_eq!(
        harness.sink.last().unwrap().message,
        "Incorrect password. 2 attempts remaining"
    );
    assert_eq!(harness.sink.count(NotificationKind::Error), 2);

    harness.engine.set_secret("again");
    assert!(matches!(
        harness.engine.submit().await,
        Err(ChallengeError::Rejected { failure_count: 1, .. })
    ));
    assert_eq!(harness.verifier.call_count(), 3);
}
