//! Deferred confirmation that a catch reached the container.
//!
//! After a confirmed catch, the external process should log a save. If that
//! line never shows up the catch is probably stuck on the rod, and a short
//! press/release pulse usually frees it. The check is evaluated once per cycle
//! (at cast start) rather than on its own timer.

use config::Policy;
use time::PrimitiveDateTime;
use tokio::time::Instant;

use crate::generation::{Generation, GenerationToken};

/// The single outstanding save expectation.
#[derive(Debug, Clone)]
pub struct PendingBucket {
    /// Cycle whose catch is pending.
    pub cycle_id: u64,
    /// Earliest log timestamp accepted as the save.
    pub min_event_time: PrimitiveDateTime,
    /// When the current wait budget started.
    pub started_at: Instant,
    /// Corrective pulses issued so far.
    pub retry_count: u32,
    /// Record validity; stale once superseded or cleared.
    token: GenerationToken,
}

/// What the per-cycle check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing is pending.
    Idle,
    /// Pending, still inside the budget.
    Waiting,
    /// Budget spent: issue a corrective pulse. `attempt` counts from 1.
    Pulse {
        /// Pulse number within this record.
        attempt: u32,
    },
    /// Retries exhausted; the record was dropped.
    GaveUp {
        /// Pulses issued before giving up.
        retries: u32,
    },
}

/// Holds at most one [`PendingBucket`].
#[derive(Debug)]
pub struct BucketTracker {
    /// Shared with the controller so a stop invalidates the record.
    generation: Generation,
    /// Current record, if any.
    pending: Option<PendingBucket>,
}

impl BucketTracker {
    /// Tracker whose records are validated against `generation`.
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            pending: None,
        }
    }

    /// Start tracking a catch, replacing any earlier record.
    pub fn track(&mut self, cycle_id: u64, min_event_time: PrimitiveDateTime, now: Instant) {
        self.pending = Some(PendingBucket {
            cycle_id,
            min_event_time,
            started_at: now,
            retry_count: 0,
            token: self.generation.issue(),
        });
    }

    /// Live record, if any.
    pub fn pending(&self) -> Option<&PendingBucket> {
        self.pending.as_ref().filter(|p| p.token.is_live())
    }

    /// Offer a log line's timestamp. Returns true if it confirmed the save.
    pub fn offer(&mut self, ts: PrimitiveDateTime) -> bool {
        let Some(p) = self.pending() else {
            self.pending = None;
            return false;
        };
        if ts < p.min_event_time {
            return false;
        }
        self.pending = None;
        true
    }

    /// Evaluate the budget at the start of a cycle.
    pub fn check(&mut self, now: Instant, policy: &Policy) -> Recovery {
        if self.pending().is_none() {
            self.pending = None;
            return Recovery::Idle;
        }
        let Some(p) = self.pending.as_mut() else {
            return Recovery::Idle;
        };
        if now.saturating_duration_since(p.started_at) < policy.bucket_save_timeout() {
            return Recovery::Waiting;
        }
        if p.retry_count >= policy.bucket_recovery_max_retry {
            let retries = p.retry_count;
            self.clear();
            return Recovery::GaveUp { retries };
        }
        p.retry_count += 1;
        p.started_at = now;
        Recovery::Pulse {
            attempt: p.retry_count,
        }
    }

    /// Drop the record and invalidate anything still holding its token.
    pub fn clear(&mut self) {
        self.pending = None;
        self.generation.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::datetime;

    use super::*;

    const HOOK_TS: PrimitiveDateTime = datetime!(2025-07-03 21:00:05);

    fn tracker() -> (BucketTracker, Instant) {
        let mut t = BucketTracker::new(Generation::new());
        let now = Instant::now();
        t.track(1, HOOK_TS, now);
        (t, now)
    }

    #[test]
    fn save_at_or_after_min_time_confirms() {
        let (mut t, _) = tracker();
        assert!(!t.offer(datetime!(2025-07-03 21:00:04)));
        assert!(t.pending().is_some());
        assert!(t.offer(HOOK_TS));
        assert!(t.pending().is_none());
        assert!(!t.offer(datetime!(2025-07-03 21:00:09)));
    }

    #[test]
    fn bounded_retries_then_give_up() {
        let (mut t, start) = tracker();
        let policy = Policy::default();
        let step = policy.bucket_save_timeout();
        assert_eq!(t.check(start, &policy), Recovery::Waiting);
        assert_eq!(t.check(start + step, &policy), Recovery::Pulse { attempt: 1 });
        assert_eq!(
            t.check(start + step + Duration::from_secs(1), &policy),
            Recovery::Waiting
        );
        assert_eq!(t.check(start + step * 2, &policy), Recovery::Pulse { attempt: 2 });
        assert_eq!(
            t.check(start + step * 3, &policy),
            Recovery::GaveUp { retries: 2 }
        );
        assert_eq!(t.check(start + step * 4, &policy), Recovery::Idle);
    }

    #[test]
    fn new_catch_replaces_record() {
        let (mut t, start) = tracker();
        let policy = Policy::default();
        t.check(start + policy.bucket_save_timeout(), &policy);
        let later = datetime!(2025-07-03 21:01:00);
        t.track(2, later, start);
        let p = t.pending().expect("pending");
        assert_eq!((p.cycle_id, p.retry_count, p.min_event_time), (2, 0, later));
    }

    #[test]
    fn invalidated_record_is_ignored() {
        let generation = Generation::new();
        let mut t = BucketTracker::new(generation.clone());
        t.track(1, HOOK_TS, Instant::now());
        generation.invalidate();
        assert!(t.pending().is_none());
        assert!(!t.offer(HOOK_TS));
        assert_eq!(t.check(Instant::now(), &Policy::default()), Recovery::Idle);
    }
}
