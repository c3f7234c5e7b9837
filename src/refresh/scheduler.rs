use serde::Serialize;
use std::time::Duration;
use tokio::time::interval;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::dashboard::Event;
use crate::refresh::worker;

/// Relative-time displays are recomputed every this many ticks.
const RELATIVE_TIME_EVERY_TICKS: u64 = 30;

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub refresh: bool,
    pub update_relative_time: bool,
}

/// Countdown timer driving periodic refresh.
///
/// The scheduler holds no handles and performs no I/O: [`tick`](Self::tick)
/// is called once per second by [`run_refresh_loop`] (or by a test) and
/// reports whether a refresh is due.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    interval_secs: u32,
    countdown: u32,
    running: bool,
    ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SchedulerStatus {
    pub auto_refresh: bool,
    pub interval_seconds: u32,
    pub seconds_until_refresh: u32,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(interval_secs: u32, running: bool) -> Self {
        let interval_secs = interval_secs.max(1);
        Self {
            interval_secs,
            countdown: interval_secs,
            running,
            ticks: 0,
        }
    }

    /// Resume ticking with a full countdown.
    pub fn start(&mut self) {
        self.running = true;
        self.countdown = self.interval_secs;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Flip between running and paused. Returns the new running state.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
        self.running
    }

    /// Restart the countdown after an out-of-band refresh.
    pub fn reset(&mut self) {
        self.countdown = self.interval_secs;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::default();
        }

        self.ticks += 1;
        self.countdown = self.countdown.saturating_sub(1);

        let refresh = self.countdown == 0;
        if refresh {
            self.countdown = self.interval_secs;
        }

        TickOutcome {
            refresh,
            update_relative_time: self.ticks % RELATIVE_TIME_EVERY_TICKS == 0,
        }
    }

    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            auto_refresh: self.running,
            interval_seconds: self.interval_secs,
            seconds_until_refresh: self.countdown,
        }
    }
}

/// Drive the dashboard: load devices and data once, then tick every second.
///
/// Each due refresh runs as its own task. A slow cycle does not delay the
/// next one, and a failed cycle does not stop the timer.
pub async fn run_refresh_loop(state: AppState) {
    tracing::info!(
        interval_secs = state.config.refresh_interval_seconds,
        auto_refresh = state.config.auto_refresh_enabled,
        "Starting refresh scheduler"
    );

    worker::refresh_cycle(state.clone()).await;

    let mut ticker = interval(Duration::from_secs(1));

    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let outcome = state.scheduler.lock().await.tick();

        if outcome.update_relative_time {
            state.update(Event::Ticked(chrono::Utc::now())).await;
        }

        if outcome.refresh {
            tracing::debug!("Refresh due");
            tokio::spawn(worker::refresh_cycle(state.clone()));
        }
    }
}
