//! Scheduling infrastructure
//!
//! [`ScheduleEngine`] drives the core [`hoyosign_core::ScheduleGate`] from a
//! background tokio task:
//! - Explicit lifecycle management (start/stop)
//! - Join handle kept for the loop task
//! - Cancellation token support
//! - Bounded wait on stop

pub mod error;
pub mod schedule_engine;

pub use error::{SchedulerError, SchedulerResult};
pub use schedule_engine::{ScheduleEngine, ScheduleEngineConfig};
