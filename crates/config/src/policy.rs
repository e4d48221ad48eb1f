//! Admission windows, settle times, and recovery budgets.
//!
//! These values were tuned against one application's logging cadence. They are
//! exposed as configuration so that a different event source can be matched
//! without code changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    defaults::*,
    settings::{clamp_or, secs},
};

/// Timing policy for event admission, reel completion, and bucket recovery.
///
/// All durations are stored in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Minimum gap between the end of one reel and the next admitted bite.
    pub cycle_cooldown: f64,
    /// Minimum time spent waiting for a bite before one may be admitted.
    pub hook_min_wait: f64,
    /// How far before the wait start an event timestamp may lie.
    pub wait_start_tolerance: f64,
    /// Bites closer than this to the previous admitted bite are duplicates.
    pub saved_data_cluster: f64,
    /// Bites closer than this to the last confirmed save are echoes of it.
    pub bucket_event_cooldown: f64,
    /// Budget for a save signal to follow a confirmed catch.
    pub bucket_save_timeout: f64,
    /// Corrective pulses issued before a pending save is abandoned.
    pub bucket_recovery_max_retry: u32,
    /// Hold time of a corrective pulse.
    pub bucket_recovery_hold: f64,
    /// Hold after pickup confirmation before the reel completes.
    pub pickup_settle: f64,
    /// Reel-timeout: longest an event-path reel waits for pickup.
    pub max_reel_time: f64,
    /// Press hold for a forced (timeout) reel.
    pub timeout_reel_hold: f64,
    /// Rest after a forced reel.
    pub force_reel_rest: f64,
    /// Pause between stop and start during a restart.
    pub restart_pause: f64,
    /// Wake interval while waiting for pickup.
    pub pickup_poll_interval: f64,
    /// Wake interval while waiting for the bucket save.
    pub bucket_poll_interval: f64,
    /// Interval between log file reads.
    pub log_poll_interval: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            cycle_cooldown: CYCLE_COOLDOWN,
            hook_min_wait: HOOK_MIN_WAIT,
            wait_start_tolerance: WAIT_START_TOLERANCE,
            saved_data_cluster: SAVED_DATA_CLUSTER,
            bucket_event_cooldown: BUCKET_EVENT_COOLDOWN,
            bucket_save_timeout: BUCKET_SAVE_TIMEOUT,
            bucket_recovery_max_retry: BUCKET_RECOVERY_MAX_RETRY,
            bucket_recovery_hold: BUCKET_RECOVERY_HOLD,
            pickup_settle: PICKUP_SETTLE,
            max_reel_time: MAX_REEL_TIME,
            timeout_reel_hold: TIMEOUT_REEL_HOLD,
            force_reel_rest: FORCE_REEL_REST,
            restart_pause: RESTART_PAUSE,
            pickup_poll_interval: PICKUP_POLL_INTERVAL,
            bucket_poll_interval: BUCKET_POLL_INTERVAL,
            log_poll_interval: LOG_POLL_INTERVAL,
        }
    }
}

/// Upper bound applied to every policy window.
const POLICY_MAX_SECS: f64 = 600.0;
/// Lower bound for poll intervals so a bad file cannot spin a loop.
const POLL_MIN_SECS: f64 = 0.01;

impl Policy {
    /// Return a copy clamped into range, with non-finite values replaced by defaults.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let window = |v: f64, fallback: f64| clamp_or(v, fallback, 0.0, POLICY_MAX_SECS);
        let poll = |v: f64, fallback: f64| clamp_or(v, fallback, POLL_MIN_SECS, POLICY_MAX_SECS);
        Self {
            cycle_cooldown: window(self.cycle_cooldown, d.cycle_cooldown),
            hook_min_wait: window(self.hook_min_wait, d.hook_min_wait),
            wait_start_tolerance: window(self.wait_start_tolerance, d.wait_start_tolerance),
            saved_data_cluster: window(self.saved_data_cluster, d.saved_data_cluster),
            bucket_event_cooldown: window(self.bucket_event_cooldown, d.bucket_event_cooldown),
            bucket_save_timeout: window(self.bucket_save_timeout, d.bucket_save_timeout),
            bucket_recovery_max_retry: self.bucket_recovery_max_retry,
            bucket_recovery_hold: window(self.bucket_recovery_hold, d.bucket_recovery_hold),
            pickup_settle: window(self.pickup_settle, d.pickup_settle),
            max_reel_time: window(self.max_reel_time, d.max_reel_time),
            timeout_reel_hold: window(self.timeout_reel_hold, d.timeout_reel_hold),
            force_reel_rest: window(self.force_reel_rest, d.force_reel_rest),
            restart_pause: window(self.restart_pause, d.restart_pause),
            pickup_poll_interval: poll(self.pickup_poll_interval, d.pickup_poll_interval),
            bucket_poll_interval: poll(self.bucket_poll_interval, d.bucket_poll_interval),
            log_poll_interval: poll(self.log_poll_interval, d.log_poll_interval),
        }
    }

    pub fn cycle_cooldown(&self) -> Duration {
        secs(self.cycle_cooldown)
    }
    pub fn hook_min_wait(&self) -> Duration {
        secs(self.hook_min_wait)
    }
    pub fn wait_start_tolerance(&self) -> Duration {
        secs(self.wait_start_tolerance)
    }
    pub fn saved_data_cluster(&self) -> Duration {
        secs(self.saved_data_cluster)
    }
    pub fn bucket_event_cooldown(&self) -> Duration {
        secs(self.bucket_event_cooldown)
    }
    pub fn bucket_save_timeout(&self) -> Duration {
        secs(self.bucket_save_timeout)
    }
    pub fn bucket_recovery_hold(&self) -> Duration {
        secs(self.bucket_recovery_hold)
    }
    pub fn pickup_settle(&self) -> Duration {
        secs(self.pickup_settle)
    }
    pub fn max_reel_time(&self) -> Duration {
        secs(self.max_reel_time)
    }
    pub fn timeout_reel_hold(&self) -> Duration {
        secs(self.timeout_reel_hold)
    }
    pub fn force_reel_rest(&self) -> Duration {
        secs(self.force_reel_rest)
    }
    pub fn restart_pause(&self) -> Duration {
        secs(self.restart_pause)
    }
    pub fn pickup_poll_interval(&self) -> Duration {
        secs(self.pickup_poll_interval)
    }
    pub fn bucket_poll_interval(&self) -> Duration {
        secs(self.bucket_poll_interval)
    }
    pub fn log_poll_interval(&self) -> Duration {
        secs(self.log_poll_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_policy_keeps_other_defaults() {
        let p: Policy = serde_json::from_str(r#"{ "hookMinWait": 1.5 }"#).expect("parse");
        assert_eq!(p.hook_min_wait(), Duration::from_millis(1500));
        assert_eq!(p.saved_data_cluster, SAVED_DATA_CLUSTER);
        assert_eq!(p.bucket_recovery_max_retry, BUCKET_RECOVERY_MAX_RETRY);
    }

    #[test]
    fn sanitize_rejects_negative_and_zero_poll() {
        let p = Policy {
            cycle_cooldown: -1.0,
            pickup_poll_interval: 0.0,
            ..Policy::default()
        }
        .sanitized();
        assert_eq!(p.cycle_cooldown, 0.0);
        assert_eq!(p.pickup_poll_interval, POLL_MIN_SECS);
    }
}
