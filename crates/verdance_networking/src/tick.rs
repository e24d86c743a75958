//! # Simulation Tick Loop
//!
//! Fixed-period driver for the ecology simulation.
//!
//! ## Design
//!
//! - One loop per server, on a `tokio::time::interval`
//! - Missed periods are skipped, never replayed in a burst
//! - Each step is short and synchronous; the world lock is never held
//!   across an await

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use verdance_ecology::TickReport;

/// Fixed-period tick driver.
#[derive(Clone, Debug)]
pub struct TickLoop {
    /// Target tick period.
    tick_duration: Duration,
    /// Log a status line every this many ticks. Zero disables it.
    stats_every: u64,
    /// Total ticks executed.
    tick_count: u64,
    /// Step time statistics.
    stats: TickStats,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum step duration observed.
    pub min_tick_us: u64,
    /// Maximum step duration observed.
    pub max_tick_us: u64,
    /// Average step duration (rolling).
    pub avg_tick_us: u64,
    /// Steps that took longer than the period.
    pub late_ticks: u64,
    /// Total steps measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn new(period: Duration) -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: micros(period),
            late_ticks: 0,
            total_ticks: 0,
        }
    }
}

impl TickLoop {
    /// Creates a loop with the given period. A zero period is raised to 1 ms.
    #[must_use]
    pub fn new(tick_duration: Duration) -> Self {
        let tick_duration = tick_duration.max(Duration::from_millis(1));
        Self {
            tick_duration,
            stats_every: 0,
            tick_count: 0,
            stats: TickStats::new(tick_duration),
        }
    }

    /// Sets how often a status line is logged.
    #[must_use]
    pub const fn with_stats_every(mut self, stats_every: u64) -> Self {
        self.stats_every = stats_every;
        self
    }

    /// Records one step of the given duration.
    pub fn record(&mut self, duration: Duration) {
        let duration_us = micros(duration);
        self.tick_count += 1;

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Runs `step` once per period, `max_ticks` times or forever.
    pub async fn run<F>(&mut self, max_ticks: Option<u64>, mut step: F)
    where
        F: FnMut() -> TickReport,
    {
        let mut interval = tokio::time::interval(self.tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut remaining = max_ticks;
        while remaining != Some(0) {
            interval.tick().await;

            let start = Instant::now();
            let report = step();
            self.record(start.elapsed());

            if self.stats_every > 0 && self.tick_count % self.stats_every == 0 {
                tracing::info!(
                    tick = report.tick,
                    vegetated = report.vegetated,
                    frontier = report.frontier,
                    avg_us = self.stats.avg_tick_us,
                    max_us = self.stats.max_tick_us,
                    late = self.stats.late_ticks,
                    "simulation status"
                );
            }
            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
        }
    }

    /// Returns the current tick count.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target tick period.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Resets statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::new(self.tick_duration);
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_loop_creation() {
        let tick_loop = TickLoop::new(Duration::from_millis(125));
        assert_eq!(tick_loop.tick_count(), 0);
        assert_eq!(tick_loop.tick_duration(), Duration::from_millis(125));
        assert_eq!(tick_loop.stats().avg_tick_us, 125_000);
    }

    #[test]
    fn test_zero_period_clamped() {
        assert_eq!(
            TickLoop::new(Duration::ZERO).tick_duration(),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn test_stats_tracking() {
        let mut tick_loop = TickLoop::new(Duration::from_millis(10));
        tick_loop.record(Duration::from_millis(2));
        tick_loop.record(Duration::from_millis(20));
        tick_loop.record(Duration::from_millis(5));

        let stats = tick_loop.stats();
        assert_eq!(stats.total_ticks, 3);
        assert_eq!(stats.min_tick_us, 2_000);
        assert_eq!(stats.max_tick_us, 20_000);
        assert_eq!(stats.late_ticks, 1);
        assert_eq!(tick_loop.tick_count(), 3);

        tick_loop.reset_stats();
        assert_eq!(tick_loop.stats().total_ticks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_bounded() {
        let mut tick_loop = TickLoop::new(Duration::from_millis(125)).with_stats_every(2);
        let mut calls = 0;
        tick_loop
            .run(Some(5), || {
                calls += 1;
                TickReport {
                    tick: calls,
                    ..TickReport::default()
                }
            })
            .await;

        assert_eq!(calls, 5);
        assert_eq!(tick_loop.tick_count(), 5);
    }
}
