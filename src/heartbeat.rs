// src/heartbeat.rs
//
// Periodic heartbeat loop. One task owns the schedule and the completion
// channel; transmissions run on the delivery worker's runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::PulseConfig;
use crate::delivery::{Completion, DeliveryWorker, HttpTransport};
use crate::error::{PulseError, Result};
use crate::identity::InstanceIdentity;
use crate::metrics::{self, CollectOptions, MetricsSource};
use crate::token::SecretCredential;
use crate::types::{DeliveryResult, HeartbeatPayload};

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Not running (before spawn, after shutdown).
    Idle,
    /// Running, no cycle has fired yet.
    Scheduled,
    Collecting,
    /// The last cycle's payload is with the worker; waiting for the next tick.
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatStatus {
    pub state: DispatchState,
    pub cycles_triggered: u64,
    pub delivered: u64,
    pub failed: u64,
    pub last_cycle: Option<u64>,
    pub last_result: Option<DeliveryResult>,
}

impl Default for HeartbeatStatus {
    fn default() -> Self {
        Self {
            state: DispatchState::Idle,
            cycles_triggered: 0,
            delivered: 0,
            failed: 0,
            last_cycle: None,
            last_result: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeartbeatSettings {
    pub interval: Duration,
    pub initial_delay: Duration,
    pub send_software: bool,
    /// Log every payload's data at info instead of debug.
    pub debug: bool,
}

impl HeartbeatSettings {
    pub fn from_config(config: &PulseConfig) -> Self {
        Self {
            interval: config.interval(),
            initial_delay: DEFAULT_INITIAL_DELAY,
            send_software: config.send_software,
            debug: config.debug,
        }
    }
}

pub struct HeartbeatDispatcher {
    settings: HeartbeatSettings,
    secret: SecretCredential,
    source: Arc<dyn MetricsSource>,
    worker: DeliveryWorker,
    completions: mpsc::UnboundedReceiver<Completion>,
    status: watch::Sender<HeartbeatStatus>,
    next_cycle: u64,
}

impl HeartbeatDispatcher {
    pub fn new(
        settings: HeartbeatSettings,
        identity: &InstanceIdentity,
        source: Arc<dyn MetricsSource>,
        worker: DeliveryWorker,
        completions: mpsc::UnboundedReceiver<Completion>,
    ) -> Result<Self> {
        if settings.interval.is_zero() {
            return Err(PulseError::InvalidSetting {
                key: "interval",
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }
        let (status, _) = watch::channel(HeartbeatStatus::default());
        Ok(Self {
            settings,
            secret: identity.secret().clone(),
            source,
            worker,
            completions,
            status,
            next_cycle: 0,
        })
    }

    /// Validates `config` and wires an HTTP worker for `config.api_url` on
    /// the current runtime.
    pub fn from_config(
        config: &PulseConfig,
        identity: &InstanceIdentity,
        source: Arc<dyn MetricsSource>,
    ) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpTransport::new(config.timeout())?);
        let (worker, completions) = DeliveryWorker::new(config.api_url.as_str(), transport)?;
        Self::new(
            HeartbeatSettings::from_config(config),
            identity,
            source,
            worker,
            completions,
        )
    }

    /// Starts the loop on the current runtime. Dropping the returned handle
    /// without calling [`HeartbeatHandle::shutdown`] also stops it.
    #[must_use]
    pub fn spawn(self) -> HeartbeatHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let status = self.status.subscribe();
        let task = tokio::spawn(self.run(shutdown_rx));
        HeartbeatHandle {
            shutdown: shutdown_tx,
            status,
            task,
        }
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let start = Instant::now();
        let first = time::sleep_until(start + self.settings.initial_delay);
        tokio::pin!(first);
        let mut first_pending = true;

        let mut ticker = time::interval_at(start + self.settings.interval, self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.set_state(DispatchState::Scheduled);
        info!(
            interval_secs = self.settings.interval.as_secs(),
            url = self.worker.url(),
            "heartbeat scheduled"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                () = &mut first, if first_pending => {
                    first_pending = false;
                    self.cycle();
                }
                _ = ticker.tick() => self.cycle(),
                Some(done) = self.completions.recv() => self.complete(done),
            }
        }

        self.set_state(DispatchState::Idle);
        info!("heartbeat stopped");
    }

    /// One cycle: collect, wrap, submit, return. Never waits on the network.
    fn cycle(&mut self) {
        self.next_cycle += 1;
        let cycle = self.next_cycle;

        self.status.send_modify(|s| {
            s.state = DispatchState::Collecting;
            s.cycles_triggered += 1;
        });
        let data = metrics::collect(
            self.source.as_ref(),
            CollectOptions {
                send_software: self.settings.send_software,
                interval_secs: self.settings.interval.as_secs(),
            },
        );

        if self.settings.debug {
            info!(cycle, ?data, "heartbeat sent");
        } else {
            debug!(cycle, ?data, "heartbeat sent");
        }

        let payload = HeartbeatPayload {
            token: self.secret.clone(),
            data,
        };
        self.worker.submit(cycle, payload);
        self.set_state(DispatchState::Submitted);
    }

    fn complete(&mut self, done: Completion) {
        let Completion { cycle, result } = done;

        if result.success {
            debug!(cycle, "heartbeat delivered");
        } else {
            match result.code {
                Some(code) => warn!(cycle, code, "heartbeat failed with HTTP {code}"),
                None => warn!(cycle, "heartbeat failed, no HTTP response"),
            }
            if let Some(err) = result.error.as_deref().filter(|e| !e.is_empty()) {
                warn!(cycle, "heartbeat transport error: {err}");
            }
            if let Some(body) = result.body.as_deref() {
                debug!(cycle, body, "heartbeat response body");
            }
        }

        self.status.send_modify(|s| {
            if result.success {
                s.delivered += 1;
            } else {
                s.failed += 1;
            }
            s.last_cycle = Some(cycle);
            s.last_result = Some(result);
        });
    }

    fn set_state(&self, state: DispatchState) {
        self.status.send_modify(|s| s.state = state);
    }
}

/// Control side of a running dispatcher.
#[derive(Debug)]
pub struct HeartbeatHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<HeartbeatStatus>,
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    pub fn status(&self) -> HeartbeatStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HeartbeatStatus> {
        self.status.clone()
    }

    /// Stops scheduling and waits for the loop to exit. In-flight deliveries
    /// are left to finish on their own; their results are discarded.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("heartbeat task ended abnormally: {e}");
        }
    }
}
