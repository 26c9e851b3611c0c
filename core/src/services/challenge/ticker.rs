//! Background 1 Hz tick driving the resend countdown and lock expiry

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::engine::ChallengeEngine;
use super::traits::{CredentialVerifierTrait, DeliveryGatewayTrait, NotificationSinkTrait};

/// Default tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawns the periodic tick for a challenge
pub struct ChallengeTicker;

impl ChallengeTicker {
    /// Start ticking `engine` once per second
    ///
    /// Must be called from within a tokio runtime. The task stops when the
    /// returned handle is stopped or dropped.
    pub fn start<D, V, N>(engine: ChallengeEngine<D, V, N>) -> TickerHandle
    where
        D: DeliveryGatewayTrait + 'static,
        V: CredentialVerifierTrait + 'static,
        N: NotificationSinkTrait + 'static,
    {
        Self::start_with_period(engine, TICK_PERIOD)
    }

    /// Start ticking `engine` every `period`
    pub fn start_with_period<D, V, N>(
        engine: ChallengeEngine<D, V, N>,
        period: Duration,
    ) -> TickerHandle
    where
        D: DeliveryGatewayTrait + 'static,
        V: CredentialVerifierTrait + 'static,
        N: NotificationSinkTrait + 'static,
    {
        let handle = tokio::spawn(async move {
            info!(
                flow_id = %engine.flow_id(),
                period_ms = period.as_millis() as u64,
                "Challenge ticker started"
            );

            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                engine.tick();
            }
        });

        TickerHandle {
            handle: Some(handle),
        }
    }
}

/// Owner of a running ticker task
#[derive(Debug)]
pub struct TickerHandle {
    handle: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop ticking; idempotent
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Challenge ticker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
