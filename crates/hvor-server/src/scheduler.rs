//! Background refresh of the published page.
//!
//! The scheduler alternates between two phases:
//! - `Idle`: waiting for the next tick of a fixed-period timer
//! - `Refreshing`: fetch and classify in flight
//!
//! A failed refresh is logged and recorded; the previous snapshot stays
//! published and nothing is retried before the next tick. The loop runs
//! until its [`ShutdownSignal`] fires. A refresh already in flight is
//! allowed to finish first.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::signals::{ShutdownHandle, ShutdownSignal};

/// Default time between refreshes.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30 * 60);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between two refreshes.
    pub period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_REFRESH_PERIOD,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler config with the given period.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

/// What the scheduler is doing right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// A refresh is in flight.
    Refreshing,
}

/// Scheduler state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerState {
    /// Current phase.
    pub phase: SchedulerPhase,
    /// Number of consecutive refresh failures.
    pub consecutive_failures: u32,
    /// Last successful refresh time.
    pub last_success: Option<DateTime<Utc>>,
    /// Last refresh attempt time.
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl SchedulerState {
    /// Creates a new scheduler state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a refresh as started.
    pub fn record_start(&mut self) {
        self.phase = SchedulerPhase::Refreshing;
        self.last_attempt = Some(Utc::now());
    }

    /// Records a successful refresh.
    pub fn record_success(&mut self) {
        self.phase = SchedulerPhase::Idle;
        self.consecutive_failures = 0;
        self.last_success = Some(Utc::now());
        self.last_error = None;
    }

    /// Records a failed refresh.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.phase = SchedulerPhase::Idle;
        self.consecutive_failures += 1;
        self.last_error = Some(error.into());
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// Creates a new shared scheduler state.
pub fn new_scheduler_state() -> SharedSchedulerState {
    Arc::new(RwLock::new(SchedulerState::new()))
}

/// Control over a spawned scheduler loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: ShutdownHandle,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Asks the loop to stop. A refresh in flight completes first.
    pub fn stop(&self) {
        self.stop.trigger();
    }

    /// Waits for the loop to end.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

/// Runs a refresh function on a fixed period.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
}

impl Scheduler {
    /// Creates a new scheduler with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: new_scheduler_state(),
        }
    }

    /// Returns the shared state. Take it before [`Scheduler::run`] or
    /// [`Scheduler::spawn`] consume the scheduler.
    pub fn state(&self) -> SharedSchedulerState {
        self.state.clone()
    }

    /// Runs the scheduler loop until `shutdown` fires.
    ///
    /// The first refresh happens one period after the call; the initial
    /// refresh is the caller's job. Ticks missed while a refresh runs long
    /// are delayed, not bunched up.
    pub async fn run<F, Fut, E>(self, refresh_fn: F, shutdown: ShutdownSignal)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send,
        E: Display + Send,
    {
        self.run_until(refresh_fn, shutdown.wait()).await;
    }

    /// Spawns the loop on the runtime.
    ///
    /// The loop ends when `shutdown` fires or [`SchedulerHandle::stop`] is
    /// called, whichever comes first.
    pub fn spawn<F, Fut, E>(self, refresh_fn: F, shutdown: ShutdownSignal) -> SchedulerHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send,
        E: Display + Send,
    {
        let stop = ShutdownHandle::new();
        let stop_signal = stop.signal();

        let task = tokio::spawn(async move {
            let stopped = async move {
                tokio::select! {
                    _ = shutdown.wait() => {}
                    _ = stop_signal.wait() => {}
                }
            };
            self.run_until(refresh_fn, stopped).await;
        });

        SchedulerHandle { stop, task }
    }

    async fn run_until<F, Fut, E>(self, refresh_fn: F, stopped: impl Future<Output = ()>)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let period = self.config.period;
        info!(period_secs = period.as_secs(), "Scheduler started");

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(stopped);

        loop {
            tokio::select! {
                biased;
                _ = &mut stopped => {
                    info!("Scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.do_refresh(&refresh_fn).await;
                }
            }
        }
    }

    async fn do_refresh<F, Fut, E>(&self, refresh_fn: &F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        self.state.write().await.record_start();

        debug!("Starting refresh");
        match refresh_fn().await {
            Ok(()) => {
                debug!("Refresh completed");
                self.state.write().await.record_success();
            }
            Err(e) => {
                let mut state = self.state.write().await;
                state.record_failure(e.to_string());
                warn!(
                    error = %e,
                    failures = state.consecutive_failures,
                    "Failed to refresh calendar, keeping previous page"
                );
            }
        }
    }
}
