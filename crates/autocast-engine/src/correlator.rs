//! Admissibility checks for log-derived signals.
//!
//! The log is a lagging, bursty artifact: one real-world action can produce
//! several matching lines, lines from the previous cycle can still be flushing,
//! and a rotation can replay old lines. No single rule handles all of that, so
//! a bite must clear a stack of windows before it may drive a transition.

use std::time::Duration;

use config::Policy;
use time::{Duration as WallDuration, PrimitiveDateTime};
use tokio::time::Instant;

use crate::{clock::Stamp, state::CycleState};

/// Controller state an event is judged against, read once per event.
#[derive(Debug, Clone, Copy)]
pub struct Phase {
    /// Run flag.
    pub running: bool,
    /// Whether a reel currently holds the guard.
    pub busy: bool,
    /// Current state.
    pub state: CycleState,
    /// Start of the current hook wait.
    pub wait_started: Option<Stamp>,
    /// End of the previous reel.
    pub last_cycle_ended: Option<Instant>,
    /// Monotonic time of evaluation.
    pub now: Instant,
}

/// Why a signal was not admitted. Rejections are expected noise, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The controller is not running.
    NotRunning,
    /// A reel already holds the guard.
    Busy,
    /// The controller is not in the phase this signal belongs to.
    WrongState(CycleState),
    /// No wait window has been opened this run.
    NoWaitWindow,
    /// Too soon after the previous reel ended.
    CycleCooldown {
        /// Time since the previous reel ended.
        elapsed: Duration,
    },
    /// Too soon after the wait phase opened.
    MinWait {
        /// Time spent waiting so far.
        elapsed: Duration,
    },
    /// Timestamped before the wait phase opened.
    BeforeWaitStart,
    /// Echo of the last confirmed container save.
    AfterBucketSave,
    /// Duplicate of the last admitted bite.
    Clustered,
}

/// Convert a std duration into a signed wall-clock span.
fn span(d: Duration) -> WallDuration {
    WallDuration::try_from(d).unwrap_or(WallDuration::MAX)
}

/// Whether `ts` lies before the wait start, less the tolerance.
fn predates(ts: PrimitiveDateTime, wait: &Stamp, tolerance: Duration) -> bool {
    match wait.wall.checked_sub(span(tolerance)) {
        Some(floor) => ts < floor,
        None => false,
    }
}

/// Remembers the wall times that later signals are measured against.
#[derive(Debug, Default)]
pub struct EventCorrelator {
    /// Timestamp of the last admitted bite.
    last_hook: Option<PrimitiveDateTime>,
    /// Timestamp of the last confirmed container save.
    last_bucket_save: Option<PrimitiveDateTime>,
}

impl EventCorrelator {
    /// Fresh correlator with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Judge a bite and, on admission, make it the new cluster anchor.
    pub fn admit_hook(
        &mut self,
        ts: PrimitiveDateTime,
        phase: &Phase,
        policy: &Policy,
    ) -> Result<(), Rejection> {
        self.check_hook(ts, phase, policy)?;
        self.commit_hook(ts);
        Ok(())
    }

    /// Judge a bite without touching history. Callers that may still lose a
    /// race after this check call [`commit_hook`](Self::commit_hook) once the
    /// bite actually drives a reel.
    pub fn check_hook(
        &self,
        ts: PrimitiveDateTime,
        phase: &Phase,
        policy: &Policy,
    ) -> Result<(), Rejection> {
        if !phase.running {
            return Err(Rejection::NotRunning);
        }
        if phase.busy {
            return Err(Rejection::Busy);
        }
        if phase.state != CycleState::WaitingHook {
            return Err(Rejection::WrongState(phase.state));
        }
        let wait = phase.wait_started.ok_or(Rejection::NoWaitWindow)?;
        if let Some(ended) = phase.last_cycle_ended {
            let elapsed = phase.now.saturating_duration_since(ended);
            if elapsed < policy.cycle_cooldown() {
                return Err(Rejection::CycleCooldown { elapsed });
            }
        }
        let waited = phase.now.saturating_duration_since(wait.at);
        if waited < policy.hook_min_wait() {
            return Err(Rejection::MinWait { elapsed: waited });
        }
        if predates(ts, &wait, policy.wait_start_tolerance()) {
            return Err(Rejection::BeforeWaitStart);
        }
        if let Some(saved) = self.last_bucket_save
            && ts - saved <= span(policy.bucket_event_cooldown())
        {
            return Err(Rejection::AfterBucketSave);
        }
        if let Some(prev) = self.last_hook
            && ts - prev <= span(policy.saved_data_cluster())
        {
            return Err(Rejection::Clustered);
        }
        Ok(())
    }

    /// Anchor the duplicate window on a bite that started a reel.
    pub fn commit_hook(&mut self, ts: PrimitiveDateTime) {
        self.last_hook = Some(ts);
    }

    /// Judge a pickup confirmation. Pickups never change correlator history.
    pub fn admit_pickup(
        &self,
        ts: PrimitiveDateTime,
        phase: &Phase,
        policy: &Policy,
    ) -> Result<(), Rejection> {
        if !phase.running {
            return Err(Rejection::NotRunning);
        }
        if phase.state != CycleState::Reeling {
            return Err(Rejection::WrongState(phase.state));
        }
        let wait = phase.wait_started.ok_or(Rejection::NoWaitWindow)?;
        if predates(ts, &wait, policy.wait_start_tolerance()) {
            return Err(Rejection::BeforeWaitStart);
        }
        Ok(())
    }

    /// Note a confirmed container save.
    pub fn record_bucket_save(&mut self, ts: PrimitiveDateTime) {
        self.last_bucket_save = Some(ts);
    }

    /// Timestamp of the last admitted bite.
    pub fn last_hook(&self) -> Option<PrimitiveDateTime> {
        self.last_hook
    }
}
