//! Delayed callbacks gated by generation tokens.
//!
//! Each armed timer is a tokio task that sleeps, then checks its token and a
//! caller-supplied gate before running. All tasks share one cancellation scope
//! so teardown can wake every sleeper at once; ordinary supersession never
//! cancels anything and relies on the token check instead.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::generation::{GenerationToken, TimerFamily};

/// Cheap, cloneable timer scheduler.
#[derive(Clone, Default)]
pub struct Timers {
    /// Cancellation scope shared by every timer armed since the last reset.
    scope: Arc<Mutex<CancellationToken>>,
    /// Timers whose effect ran.
    fired: Arc<AtomicU64>,
    /// Timers that woke with a stale token or a closed gate.
    discarded: Arc<AtomicU64>,
}

impl Timers {
    /// New scheduler with a fresh scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cancellation scope. Sleeps elsewhere in the controller select
    /// on this so a stop wakes them immediately.
    pub fn scope(&self) -> CancellationToken {
        self.scope.lock().clone()
    }

    /// Cancel every sleeper and start a new scope.
    pub fn reset(&self) {
        let old = std::mem::take(&mut *self.scope.lock());
        old.cancel();
        trace!("timers_reset");
    }

    /// Arm `on_fire` to run after `delay` if `token` is still live and `gate`
    /// returns true at expiry.
    pub fn arm<G, F, Fut>(
        &self,
        family: TimerFamily,
        token: GenerationToken,
        delay: Duration,
        gate: G,
        on_fire: F,
    ) where
        G: FnOnce() -> bool + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.scope();
        let fired = self.fired.clone();
        let discarded = self.discarded.clone();
        trace!(timer = %family, generation = token.value(), delay_ms = delay.as_millis() as u64, "timer_armed");
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    trace!(timer = %family, "timer_cancelled");
                    return;
                }
            }
            if !token.is_live() || !gate() {
                discarded.fetch_add(1, Ordering::Relaxed);
                trace!(timer = %family, generation = token.value(), "timer_discarded");
                return;
            }
            fired.fetch_add(1, Ordering::Relaxed);
            trace!(timer = %family, generation = token.value(), "timer_fired");
            on_fire().await;
        });
    }

    /// Number of timers whose effect ran.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Number of timers that woke and were discarded.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::generation::Generation;

    fn flag() -> (Arc<AtomicBool>, impl FnOnce() -> std::future::Ready<()> + Send + 'static) {
        let hit = Arc::new(AtomicBool::new(false));
        let h = hit.clone();
        (hit, move || {
            h.store(true, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn live_token_fires() {
        let timers = Timers::new();
        let g = Generation::new();
        let (hit, f) = flag();
        timers.arm(TimerFamily::HookTimeout, g.issue(), Duration::from_secs(1), || true, f);
        time::sleep(Duration::from_millis(1100)).await;
        assert!(hit.load(Ordering::SeqCst));
        assert_eq!(timers.fired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidated_token_is_a_noop() {
        let timers = Timers::new();
        let g = Generation::new();
        let (hit, f) = flag();
        timers.arm(TimerFamily::HookTimeout, g.issue(), Duration::from_secs(1), || true, f);
        g.invalidate();
        time::sleep(Duration::from_secs(2)).await;
        assert!(!hit.load(Ordering::SeqCst));
        assert_eq!(timers.discarded(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_gate_is_a_noop() {
        let timers = Timers::new();
        let g = Generation::new();
        let (hit, f) = flag();
        timers.arm(TimerFamily::ReelTimeout, g.issue(), Duration::from_secs(1), || false, f);
        time::sleep(Duration::from_secs(2)).await;
        assert!(!hit.load(Ordering::SeqCst));
        assert_eq!(timers.discarded(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_sleepers() {
        let timers = Timers::new();
        let g = Generation::new();
        let (hit, f) = flag();
        timers.arm(TimerFamily::CastCycle, g.issue(), Duration::from_secs(5), || true, f);
        let scope = timers.scope();
        timers.reset();
        assert!(scope.is_cancelled());
        assert!(!timers.scope().is_cancelled());
        time::sleep(Duration::from_secs(6)).await;
        assert!(!hit.load(Ordering::SeqCst));
        assert_eq!(timers.fired() + timers.discarded(), 0);
    }
}
