//! Daily schedule decision
//!
//! [`ScheduleGate`] answers one question per tick: "is it the configured
//! minute, and have we not fired yet today?". The configured time, the
//! fired-date marker and the running flag live behind one lock.
//!
//! The timer loop that asks the question lives in the infra crate.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use hoyosign_domain::{Result, ScheduleTime};
use parking_lot::Mutex;

/// Work the scheduler triggers once per day.
#[async_trait]
pub trait DailyJob: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn run(&self) -> Result<()>;
}

#[derive(Debug)]
struct GateState {
    time: ScheduleTime,
    last_fired: Option<NaiveDate>,
    running: bool,
}

/// Fires at most once per local date at the configured time.
#[derive(Debug)]
pub struct ScheduleGate {
    state: Mutex<GateState>,
}

impl ScheduleGate {
    pub fn new(time: ScheduleTime) -> Self {
        Self { state: Mutex::new(GateState { time, last_fired: None, running: false }) }
    }

    /// Marks `now`'s date as fired and returns `true` when the tick should
    /// run the job.
    ///
    /// The marker only moves forward, so a clock stepping back across
    /// midnight cannot re-fire an earlier date.
    pub fn try_fire(&self, now: NaiveDateTime) -> bool {
        let mut state = self.state.lock();
        if !state.time.matches(now) {
            return false;
        }
        let today = now.date();
        if state.last_fired.is_some_and(|fired| fired >= today) {
            return false;
        }
        state.last_fired = Some(today);
        true
    }

    /// Takes effect on the next tick.
    pub fn set_time(&self, time: ScheduleTime) {
        self.state.lock().time = time;
    }

    pub fn time(&self) -> ScheduleTime {
        self.state.lock().time
    }

    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.state.lock().last_fired
    }

    /// Flips the running flag; returns the previous value.
    pub fn set_running(&self, running: bool) -> bool {
        std::mem::replace(&mut self.state.lock().running, running)
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Next local date-time the gate would fire at.
    pub fn next_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.state.lock().time.next_after(now)
    }
}

impl Default for ScheduleGate {
    fn default() -> Self {
        Self::new(ScheduleTime::default())
    }
}
