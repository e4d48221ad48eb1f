//! Generation counters: the only cancellation primitive for timers and trackers.
//!
//! A [`Generation`] is a shared monotonic counter. Issuing a token advances the
//! counter and captures the new value; any later advance (another issue or an
//! explicit [`Generation::invalidate`]) makes every earlier token stale. Nothing
//! is ever cancelled directly; stale work notices on its own and does nothing.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Shared monotonic counter for one family of deferred work.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    /// New counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return a token for the new value.
    pub fn issue(&self) -> GenerationToken {
        let value = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationToken {
            counter: self.clone(),
            value,
        }
    }

    /// Advance the counter, making every outstanding token stale.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Live value.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Token for the live value without advancing.
    pub fn capture(&self) -> GenerationToken {
        GenerationToken {
            counter: self.clone(),
            value: self.current(),
        }
    }
}

/// A captured generation value, checked against its counter on use.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    /// Counter this token was issued from.
    counter: Generation,
    /// Value at issue time.
    value: u64,
}

impl GenerationToken {
    /// True while no newer generation has been issued or invalidated.
    pub fn is_live(&self) -> bool {
        self.counter.current() == self.value
    }

    /// Captured value.
    pub fn value(&self) -> u64 {
        self.value
    }
}

/// The four families of deferred work owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFamily {
    /// One cast/wait/reel/rest chain.
    CastCycle,
    /// Hook-wait backstop.
    HookTimeout,
    /// Reel backstop while waiting for pickup.
    ReelTimeout,
    /// Pending bucket record and its recovery pulses.
    BucketRecovery,
}

impl fmt::Display for TimerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CastCycle => "cast_cycle",
            Self::HookTimeout => "hook_timeout",
            Self::ReelTimeout => "reel_timeout",
            Self::BucketRecovery => "bucket_recovery",
        })
    }
}

/// One counter per [`TimerFamily`].
#[derive(Debug, Clone, Default)]
pub struct Generations {
    /// Cycle chain counter.
    pub cast_cycle: Generation,
    /// Hook timeout counter.
    pub hook_timeout: Generation,
    /// Reel timeout counter.
    pub reel_timeout: Generation,
    /// Bucket recovery counter.
    pub bucket_recovery: Generation,
}

impl Generations {
    /// Counter for `family`.
    pub fn get(&self, family: TimerFamily) -> &Generation {
        match family {
            TimerFamily::CastCycle => &self.cast_cycle,
            TimerFamily::HookTimeout => &self.hook_timeout,
            TimerFamily::ReelTimeout => &self.reel_timeout,
            TimerFamily::BucketRecovery => &self.bucket_recovery,
        }
    }

    /// Advance every counter. Values only ever grow, so a token issued before a
    /// stop can never match again after a restart.
    pub fn invalidate_all(&self) {
        for family in [
            TimerFamily::CastCycle,
            TimerFamily::HookTimeout,
            TimerFamily::ReelTimeout,
            TimerFamily::BucketRecovery,
        ] {
            self.get(family).invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn issue_supersedes_previous_token() {
        let g = Generation::new();
        let a = g.issue();
        assert!(a.is_live());
        let b = g.issue();
        assert!(!a.is_live());
        assert!(b.is_live());
        assert!(b.value() > a.value());
    }

    #[test]
    fn capture_does_not_advance() {
        let g = Generation::new();
        let a = g.issue();
        let c = g.capture();
        assert!(a.is_live());
        assert_eq!(a.value(), c.value());
    }

    #[test]
    fn invalidate_all_touches_every_family() {
        let gens = Generations::default();
        let toks: Vec<_> = [
            TimerFamily::CastCycle,
            TimerFamily::HookTimeout,
            TimerFamily::ReelTimeout,
            TimerFamily::BucketRecovery,
        ]
        .into_iter()
        .map(|f| gens.get(f).issue())
        .collect();
        gens.invalidate_all();
        assert!(toks.iter().all(|t| !t.is_live()));
    }

    proptest! {
        // A token stays live exactly as long as nothing advanced its counter.
        #[test]
        fn stale_tokens_never_match(ops in proptest::collection::vec(any::<bool>(), 1..64), pick in any::<prop::sample::Index>()) {
            let g = Generation::new();
            let mut tokens = Vec::new();
            for issue in &ops {
                if *issue {
                    tokens.push(g.issue());
                } else {
                    g.invalidate();
                }
            }
            prop_assume!(!tokens.is_empty());
            let t = pick.get(&tokens);
            let newest = tokens.last().map(|t| t.value()).unwrap_or_default();
            let advanced_after = t.value() != newest || !ops.last().copied().unwrap_or(false);
            prop_assert_eq!(t.is_live(), !advanced_after);
        }
    }
}
