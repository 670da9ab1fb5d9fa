//! Daily schedule loop
//!
//! A background task wakes every `tick_interval`, asks the
//! [`ScheduleGate`] whether the configured minute has come for a date that
//! has not fired yet, and spawns the [`DailyJob`] without awaiting it. Job
//! failures and panics are logged by a watcher task and never end the loop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hoyosign_common::SystemClock;
//! use hoyosign_core::DailyJob;
//! use hoyosign_domain::ScheduleTime;
//! use hoyosign_infra::scheduling::{ScheduleEngine, SchedulerResult};
//!
//! # async fn example(job: Arc<dyn DailyJob>) -> SchedulerResult<()> {
//! let engine = ScheduleEngine::new(job, ScheduleTime::default(), Arc::new(SystemClock));
//! engine.start().await?;
//! // ... application runs ...
//! engine.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use hoyosign_common::Clock;
use hoyosign_core::{DailyJob, ScheduleGate};
use hoyosign_domain::config::PacingConfig;
use hoyosign_domain::constants::{DEFAULT_STOP_TIMEOUT_SECS, DEFAULT_TICK_INTERVAL_SECS};
use hoyosign_domain::ScheduleTime;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Timing for [`ScheduleEngine`]
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEngineConfig {
    /// How often the gate is asked
    pub tick_interval: Duration,
    /// Upper bound on waiting for the loop to exit in [`ScheduleEngine::stop`]
    pub stop_timeout: Duration,
}

impl Default for ScheduleEngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            stop_timeout: Duration::from_secs(DEFAULT_STOP_TIMEOUT_SECS),
        }
    }
}

impl From<&PacingConfig> for ScheduleEngineConfig {
    fn from(pacing: &PacingConfig) -> Self {
        Self { tick_interval: pacing.tick_interval(), stop_timeout: pacing.stop_timeout() }
    }
}

type SharedJob = Arc<RwLock<Arc<dyn DailyJob>>>;

/// Runs a [`DailyJob`] once per local date at the configured time.
///
/// All methods take `&self`; `stop` may be called from any task.
pub struct ScheduleEngine {
    gate: Arc<ScheduleGate>,
    job: SharedJob,
    clock: Arc<dyn Clock>,
    config: ScheduleEngineConfig,
    cancellation: Mutex<CancellationToken>,
    task_handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ScheduleEngine {
    pub fn new(job: Arc<dyn DailyJob>, time: ScheduleTime, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate: Arc::new(ScheduleGate::new(time)),
            job: Arc::new(RwLock::new(job)),
            clock,
            config: ScheduleEngineConfig::default(),
            cancellation: Mutex::new(CancellationToken::new()),
            task_handle: tokio::sync::Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: ScheduleEngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the tick loop.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] if the loop is active.
    #[instrument(skip(self), fields(time = %self.gate.time()))]
    pub async fn start(&self) -> SchedulerResult<()> {
        let mut slot = self.task_handle.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so the engine can restart after stop
        let cancel = CancellationToken::new();
        *self.cancellation.lock() = cancel.clone();

        let gate = Arc::clone(&self.gate);
        let job = Arc::clone(&self.job);
        let clock = Arc::clone(&self.clock);
        let tick_interval = self.config.tick_interval;

        gate.set_running(true);
        *slot = Some(tokio::spawn(async move {
            Self::tick_loop(gate, job, clock, tick_interval, cancel).await;
        }));

        info!(next_run = %self.next_run(), "Schedule engine started");
        Ok(())
    }

    /// Cancel the loop and wait for it to exit. Stopping a stopped engine is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Timeout`] if the loop does not exit within
    /// `stop_timeout`, [`SchedulerError::TaskJoinFailed`] if it panicked.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> SchedulerResult<()> {
        self.cancellation.lock().cancel();
        let handle = self.task_handle.lock().await.take();
        self.gate.set_running(false);

        let Some(handle) = handle else {
            debug!("Schedule engine already stopped");
            return Ok(());
        };

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;

        info!("Schedule engine stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    /// Takes effect on the next tick.
    pub fn set_time(&self, time: ScheduleTime) {
        self.gate.set_time(time);
        info!(%time, next_run = %self.next_run(), "Schedule time updated");
    }

    pub fn time(&self) -> ScheduleTime {
        self.gate.time()
    }

    /// Replace the job; takes effect on the next firing.
    pub fn set_job(&self, job: Arc<dyn DailyJob>) {
        *self.job.write() = job;
    }

    /// Run the job now, outside the schedule. The fired-today marker is not
    /// touched, so the scheduled run still happens today.
    pub fn run_now(&self) -> JoinHandle<()> {
        let job = self.job.read().clone();
        info!(job = job.name(), "Manual run requested");
        spawn_job(job)
    }

    /// One gate check at the current clock time. Returns the spawned job's
    /// watcher when the gate fired.
    pub fn tick(&self) -> Option<JoinHandle<()>> {
        Self::tick_once(&self.gate, &self.job, self.clock.as_ref())
    }

    /// Next local date-time the job is scheduled for.
    pub fn next_run(&self) -> NaiveDateTime {
        self.gate.next_run(self.clock.now_local())
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.gate.last_fired()
    }

    async fn tick_loop(
        gate: Arc<ScheduleGate>,
        job: SharedJob,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Schedule loop cancelled");
                    break;
                }
                () = tokio::time::sleep(tick_interval) => {
                    Self::tick_once(&gate, &job, clock.as_ref());
                }
            }
        }
    }

    fn tick_once(gate: &ScheduleGate, job: &SharedJob, clock: &dyn Clock) -> Option<JoinHandle<()>> {
        let now = clock.now_local();
        if !gate.try_fire(now) {
            return None;
        }
        let job = job.read().clone();
        info!(job = job.name(), %now, "Scheduled run firing");
        Some(spawn_job(job))
    }
}

impl Drop for ScheduleEngine {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ScheduleEngine dropped while running; cancelling loop");
            self.cancellation.lock().cancel();
        }
    }
}

/// Runs `job` on its own task; the returned watcher logs the outcome,
/// including panics.
fn spawn_job(job: Arc<dyn DailyJob>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = job.name().to_string();
        match tokio::spawn(async move { job.run().await }).await {
            Ok(Ok(())) => info!(job = %name, "Job finished"),
            Ok(Err(err)) => error!(job = %name, error = %err, "Job failed"),
            Err(err) => error!(job = %name, error = %err, "Job panicked"),
        }
    })
}
