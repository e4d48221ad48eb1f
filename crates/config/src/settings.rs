//! User-facing settings persisted as a flat JSON record.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Policy,
    defaults::{self, *},
};

/// Cycle timing and mode settings, plus the non-core collaborator sections.
///
/// Field names serialize in camelCase so files written by earlier releases
/// (`castTime`, `restTime`, `timeoutLimit`, ...) load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Fixed cast hold, in seconds.
    #[serde(default = "default_cast_time")]
    pub cast_time: f64,
    /// Rest after each reel, in seconds.
    #[serde(default = "default_rest_time")]
    pub rest_time: f64,
    /// Hook-wait limit, in minutes.
    #[serde(default = "default_timeout_minutes", rename = "timeoutLimit")]
    pub hook_wait_limit: f64,
    /// Rest directly after a reel instead of waiting for the bucket save.
    #[serde(default)]
    pub rest_enabled: bool,
    /// Draw each cast duration uniformly from `[MIN_CAST_TIME, random_cast_max]`.
    #[serde(default)]
    pub random_cast_enabled: bool,
    /// Upper bound for randomized cast durations, in seconds.
    #[serde(default = "default_random_cast_max")]
    pub random_cast_max: f64,
    /// Skip the cast press entirely; casting happens outside this program.
    #[serde(default)]
    pub no_cast_mode: bool,
    /// Where actuator messages are sent.
    #[serde(default)]
    pub osc: OscTarget,
    /// Override for the directory holding `output_log_*.txt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Substrings that classify log lines into signals.
    #[serde(default)]
    pub patterns: Patterns,
    /// Admission windows and recovery budgets.
    #[serde(default)]
    pub policy: Policy,
}

/// UDP destination and address for the press/release messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OscTarget {
    /// Destination host.
    #[serde(default = "default_osc_host")]
    pub host: String,
    /// Destination port.
    #[serde(default = "default_osc_port")]
    pub port: u16,
    /// OSC address path carrying the 1/0 argument.
    #[serde(default = "default_osc_address")]
    pub address: String,
}

/// Line patterns for the three recognized signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patterns {
    /// Marks a bite (and, after a catch, the container save).
    #[serde(default = "default_hook_pattern")]
    pub hook: String,
    /// Marks the catch being attached to the rod.
    #[serde(default = "default_pickup_pattern")]
    pub pickup: String,
    /// Marks an explicit save-to-container line.
    #[serde(default = "default_save_pattern")]
    pub save: String,
}

impl Default for OscTarget {
    fn default() -> Self {
        Self {
            host: default_osc_host(),
            port: default_osc_port(),
            address: default_osc_address(),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            hook: default_hook_pattern(),
            pickup: default_pickup_pattern(),
            save: default_save_pattern(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cast_time: CAST_TIME,
            rest_time: REST_TIME,
            hook_wait_limit: TIMEOUT_MINUTES,
            rest_enabled: false,
            random_cast_enabled: false,
            random_cast_max: RANDOM_CAST_MAX,
            no_cast_mode: false,
            osc: OscTarget::default(),
            log_dir: None,
            patterns: Patterns::default(),
            policy: Policy::default(),
        }
    }
}

/// Shortest cast the random draw may produce.
pub const MIN_CAST_TIME: f64 = defaults::MIN_CAST_TIME;

impl Settings {
    /// Return a copy with every numeric field clamped into its supported range.
    ///
    /// Non-finite values fall back to the field default.
    pub fn sanitized(&self) -> Self {
        let mut s = self.clone();
        s.cast_time = clamp_or(s.cast_time, CAST_TIME, MIN_CAST_TIME, MAX_CAST_TIME);
        s.rest_time = clamp_or(s.rest_time, REST_TIME, MIN_REST_TIME, MAX_REST_TIME);
        s.hook_wait_limit = clamp_or(
            s.hook_wait_limit,
            TIMEOUT_MINUTES,
            MIN_TIMEOUT_MINUTES,
            MAX_TIMEOUT_MINUTES,
        );
        s.random_cast_max = clamp_or(
            s.random_cast_max,
            RANDOM_CAST_MAX,
            MIN_RANDOM_CAST_MAX,
            MAX_CAST_TIME,
        );
        s.policy = s.policy.sanitized();
        s
    }

    /// Fixed cast hold.
    pub fn cast_duration(&self) -> Duration {
        secs(self.cast_time)
    }

    /// Rest after a reel.
    pub fn rest_duration(&self) -> Duration {
        secs(self.rest_time)
    }

    /// Hook-wait limit converted from minutes.
    pub fn hook_wait_duration(&self) -> Duration {
        secs(self.hook_wait_limit * 60.0)
    }

    /// Inclusive bounds for a randomized cast.
    pub fn random_cast_bounds(&self) -> (Duration, Duration) {
        let max = self.random_cast_max.max(MIN_CAST_TIME);
        (secs(MIN_CAST_TIME), secs(max))
    }

    /// Apply a single `key value` pair using the persisted key names.
    ///
    /// Used by interactive front ends; the value is clamped like a loaded file.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), Error> {
        fn num(field: &'static str, v: &str) -> Result<f64, Error> {
            let n: f64 = v.trim().parse().map_err(|_| Error::Invalid {
                field,
                message: format!("expected a number, got {v:?}"),
            })?;
            if !n.is_finite() {
                return Err(Error::Invalid {
                    field,
                    message: "value must be finite".to_string(),
                });
            }
            Ok(n)
        }
        fn flag(field: &'static str, v: &str) -> Result<bool, Error> {
            match v.trim() {
                "1" | "true" | "on" | "yes" => Ok(true),
                "0" | "false" | "off" | "no" => Ok(false),
                other => Err(Error::Invalid {
                    field,
                    message: format!("expected a boolean, got {other:?}"),
                }),
            }
        }
        match key {
            "castTime" => self.cast_time = num("castTime", value)?,
            "restTime" => self.rest_time = num("restTime", value)?,
            "timeoutLimit" => self.hook_wait_limit = num("timeoutLimit", value)?,
            "randomCastMax" => self.random_cast_max = num("randomCastMax", value)?,
            "restEnabled" => self.rest_enabled = flag("restEnabled", value)?,
            "randomCastEnabled" => self.random_cast_enabled = flag("randomCastEnabled", value)?,
            "noCastMode" => self.no_cast_mode = flag("noCastMode", value)?,
            _ => {
                return Err(Error::Invalid {
                    field: "key",
                    message: format!("unknown setting {key:?}"),
                });
            }
        }
        *self = self.sanitized();
        Ok(())
    }
}

/// Clamp `v` into `[lo, hi]`, substituting `fallback` for non-finite input.
pub(crate) fn clamp_or(v: f64, fallback: f64, lo: f64, hi: f64) -> f64 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

/// Seconds to `Duration`, saturating negatives to zero.
pub(crate) fn secs(v: f64) -> Duration {
    Duration::try_from_secs_f64(v.max(0.0)).unwrap_or(Duration::ZERO)
}
