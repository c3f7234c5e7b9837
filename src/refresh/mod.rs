pub mod scheduler;
pub mod worker;

pub use scheduler::{RefreshScheduler, SchedulerStatus, TickOutcome};
