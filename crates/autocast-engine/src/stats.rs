//! Run counters and cycle-duration bookkeeping.

use std::{fmt, time::Duration};

use parking_lot::Mutex;
use tokio::time::Instant;

/// Raw counters, mutated only under the aggregator's lock.
#[derive(Debug, Clone, Default)]
struct Stats {
    /// Completed reels, event-driven or forced.
    reels: u64,
    /// Hook waits that ran out.
    timeouts: u64,
    /// Catches confirmed by a container save.
    confirmed_catches: u64,
    /// Start of the current run.
    run_started_at: Option<Instant>,
    /// Start of the cycle in progress.
    cycle_started_at: Option<Instant>,
    /// Completed cycles.
    cycles: u64,
    /// Length of the last completed cycle.
    last_cycle: Option<Duration>,
    /// Sum of completed cycle lengths.
    total_cycle: Duration,
}

/// Point-in-time copy of the counters, safe to hand to a presenter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Completed reels.
    pub reels: u64,
    /// Hook-wait timeouts.
    pub timeouts: u64,
    /// Catches confirmed by a save line. Rest-only mode never confirms one.
    pub confirmed_catches: u64,
    /// Time since start, zero when stopped.
    pub runtime: Duration,
    /// Completed cycles.
    pub cycles: u64,
    /// Last cycle length.
    pub last_cycle: Option<Duration>,
    /// Mean cycle length.
    pub mean_cycle: Option<Duration>,
}

/// Format a runtime the way the status line shows it: `42s` or `1.5min`.
pub fn format_runtime(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{:.1}min", secs / 60.0)
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reels={} timeouts={} catches={} runtime={}",
            self.reels,
            self.timeouts,
            self.confirmed_catches,
            format_runtime(self.runtime)
        )?;
        if let Some(mean) = self.mean_cycle {
            write!(f, " cycles={} mean_cycle={:.1}s", self.cycles, mean.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Thread-safe stats. The lock is held only for a read or a single update.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    /// Guarded counters.
    inner: Mutex<Stats>,
}

impl StatsAggregator {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter. `started` marks the beginning of a new run.
    pub fn reset(&self, started: Option<Instant>) {
        *self.inner.lock() = Stats {
            run_started_at: started,
            ..Stats::default()
        };
    }

    /// Count a finished reel.
    pub fn record_reel(&self) {
        self.inner.lock().reels += 1;
    }

    /// Count an expired hook wait.
    pub fn record_timeout(&self) {
        self.inner.lock().timeouts += 1;
    }

    /// Count a confirmed catch.
    pub fn record_catch(&self) {
        self.inner.lock().confirmed_catches += 1;
    }

    /// Mark the start of a cycle, closing the previous one.
    pub fn mark_cycle(&self, now: Instant) {
        let mut s = self.inner.lock();
        if let Some(prev) = s.cycle_started_at.replace(now) {
            let len = now.saturating_duration_since(prev);
            s.cycles += 1;
            s.last_cycle = Some(len);
            s.total_cycle += len;
        }
    }

    /// Copy the counters.
    pub fn snapshot(&self, now: Instant) -> StatsSnapshot {
        let s = self.inner.lock();
        let mean_cycle = u32::try_from(s.cycles)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| s.total_cycle / n);
        StatsSnapshot {
            reels: s.reels,
            timeouts: s.timeouts,
            confirmed_catches: s.confirmed_catches,
            runtime: s
                .run_started_at
                .map(|t| now.saturating_duration_since(t))
                .unwrap_or_default(),
            cycles: s.cycles,
            last_cycle: s.last_cycle,
            mean_cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_display() {
        assert_eq!(format_runtime(Duration::from_secs(42)), "42s");
        assert_eq!(format_runtime(Duration::from_secs(90)), "1.5min");
        assert_eq!(format_runtime(Duration::ZERO), "0s");
    }

    #[test]
    fn cycles_and_reset() {
        let s = StatsAggregator::new();
        let t0 = Instant::now();
        s.reset(Some(t0));
        s.mark_cycle(t0);
        s.mark_cycle(t0 + Duration::from_secs(10));
        s.mark_cycle(t0 + Duration::from_secs(30));
        s.record_reel();
        s.record_timeout();
        let snap = s.snapshot(t0 + Duration::from_secs(30));
        assert_eq!(snap.cycles, 2);
        assert_eq!(snap.last_cycle, Some(Duration::from_secs(20)));
        assert_eq!(snap.mean_cycle, Some(Duration::from_secs(15)));
        assert_eq!((snap.reels, snap.timeouts), (1, 1));
        s.reset(None);
        assert_eq!(s.snapshot(t0), StatsSnapshot::default());
    }
}
