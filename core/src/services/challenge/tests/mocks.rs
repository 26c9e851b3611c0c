//! Mock implementations for testing the challenge engine

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::entities::Channel;
use crate::domain::value_objects::{Notification, NotificationKind, VerifyResponse};
use crate::services::challenge::{
    ChallengeConfig, ChallengeEngine, Clock, CredentialVerifierTrait, DeliveryGatewayTrait,
    NotificationSinkTrait,
};

pub type TestEngine = ChallengeEngine<MockDeliveryGateway, ScriptedVerifier, RecordingSink>;

// Mock delivery gateway for testing
#[derive(Default)]
pub struct MockDeliveryGateway {
    pub sent: Mutex<Vec<(Channel, String)>>,
    pub should_fail: AtomicBool,
}

impl MockDeliveryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let gateway = Self::default();
        gateway.should_fail.store(true, Ordering::SeqCst);
        gateway
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryGatewayTrait for MockDeliveryGateway {
    async fn request_delivery(&self, channel: Channel, identifier: &str) -> Result<String, String> {
        tokio::task::yield_now().await;
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("Gateway unavailable".to_string());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel, identifier.to_string()));
        Ok(format!("mock-msg-{}", sent.len()))
    }
}

// Verifier answering from a script, optionally held until released
pub struct ScriptedVerifier {
    responses: Mutex<VecDeque<VerifyResponse>>,
    fallback: VerifyResponse,
    pub calls: Mutex<Vec<(Channel, String, String)>>,
    gate: Option<Arc<Notify>>,
    pub started: Arc<Notify>,
    call_count: AtomicUsize,
}

impl ScriptedVerifier {
    pub fn new(fallback: VerifyResponse) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
            gate: None,
            started: Arc::new(Notify::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::new(VerifyResponse::Accept)
    }

    pub fn rejecting() -> Self {
        Self::new(VerifyResponse::Reject)
    }

    /// Answer with `responses` in order, then with the fallback
    pub fn scripted(
        responses: impl IntoIterator<Item = VerifyResponse>,
        fallback: VerifyResponse,
    ) -> Self {
        let verifier = Self::new(fallback);
        verifier.responses.lock().unwrap().extend(responses);
        verifier
    }

    /// Hold every answer until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_secret(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, _, secret)| secret.clone())
    }
}

#[async_trait]
impl CredentialVerifierTrait for ScriptedVerifier {
    async fn verify_secret(
        &self,
        channel: Channel,
        identifier: &str,
        secret: &str,
    ) -> VerifyResponse {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((channel, identifier.to_string(), secret.to_string()));
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

// Sink recording every notification
#[derive(Default)]
pub struct RecordingSink {
    pub notifications: Mutex<Vec<Notification>>,
    pub successes: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications.lock().unwrap().iter().map(|n| n.kind).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn successes(&self) -> Vec<bool> {
        self.successes.lock().unwrap().clone()
    }
}

impl NotificationSinkTrait for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn on_succeeded(&self, trust_device: bool) {
        self.successes.lock().unwrap().push(trust_device);
    }
}

// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(seconds);
    }

    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Engine plus handles on its collaborators
pub struct Harness {
    pub engine: TestEngine,
    pub gateway: Arc<MockDeliveryGateway>,
    pub verifier: Arc<ScriptedVerifier>,
    pub sink: Arc<RecordingSink>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(config: ChallengeConfig, identifier: &str, verifier: ScriptedVerifier) -> Self {
        Self::with_gateway(config, identifier, MockDeliveryGateway::new(), verifier)
    }

    pub fn with_gateway(
        config: ChallengeConfig,
        identifier: &str,
        gateway: MockDeliveryGateway,
        verifier: ScriptedVerifier,
    ) -> Self {
        let gateway = Arc::new(gateway);
        let verifier = Arc::new(verifier);
        let sink = Arc::new(RecordingSink::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ChallengeEngine::with_clock(
            config,
            identifier,
            gateway.clone(),
            verifier.clone(),
            sink.clone(),
            clock.clone(),
        )
        .expect("challenge should start");

        Self {
            engine,
            gateway,
            verifier,
            sink,
            clock,
        }
    }

    /// Phone-identified challenge with `channel` active
    pub fn phone(channel: Channel, verifier: ScriptedVerifier) -> Self {
        let harness = Self::new(ChallengeConfig::default(), "+256772123456", verifier);
        harness.engine.select_channel(channel).expect("channel available for phone");
        harness
    }

    /// Advance both the manual clock and the engine by `seconds` ticks
    pub fn tick_seconds(&self, seconds: u32) {
        for _ in 0..seconds {
            self.clock.advance(1);
            self.engine.tick();
        }
    }
}
