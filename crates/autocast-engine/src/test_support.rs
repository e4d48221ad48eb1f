//! Test support utilities for autocast-engine unit and integration tests.
//! These helpers are public to avoid dead_code warnings and are lightweight.
//! They are intended for use by the test suite only.

use std::{sync::Arc, time::Duration};

use logtail::{LogEvent, SignalKind};
use parking_lot::Mutex;
use time::{PrimitiveDateTime, macros::datetime};
use tokio::time::{Instant, sleep};

use crate::{Actuator, AnchoredClock, Clock, Controller};

/// Wall time the test clock starts at.
pub const TEST_EPOCH: PrimitiveDateTime = datetime!(2025-07-03 21:00:00);

/// One recorded actuator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `press()`
    Press,
    /// `release()`
    Release,
}

/// Actuator that records calls with their monotonic time.
#[derive(Debug, Default)]
pub struct MockActuator {
    /// Calls in order.
    log: Mutex<Vec<(Action, Instant)>>,
}

impl MockActuator {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<(Action, Instant)> {
        self.log.lock().clone()
    }

    /// Number of presses.
    pub fn presses(&self) -> usize {
        self.log.lock().iter().filter(|(a, _)| *a == Action::Press).count()
    }

    /// Whether the last call was a press.
    pub fn is_pressed(&self) -> bool {
        matches!(self.log.lock().last(), Some((Action::Press, _)))
    }

    /// Hold durations of each press that was followed by a release.
    pub fn holds(&self) -> Vec<Duration> {
        let log = self.log.lock();
        let mut out = Vec::new();
        let mut down = None;
        for (action, at) in log.iter() {
            match action {
                Action::Press => down = Some(*at),
                Action::Release => {
                    if let Some(start) = down.take() {
                        out.push(at.saturating_duration_since(start));
                    }
                }
            }
        }
        out
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl Actuator for MockActuator {
    fn press(&self) {
        self.log.lock().push((Action::Press, Instant::now()));
    }
    fn release(&self) {
        self.log.lock().push((Action::Release, Instant::now()));
    }
}

/// Controller wired to a [`MockActuator`] and an [`AnchoredClock`].
pub struct Harness {
    /// Controller under test.
    pub controller: Controller,
    /// Recorded actuator calls.
    pub actuator: Arc<MockActuator>,
    /// Wall clock in lockstep with tokio time.
    pub clock: Arc<AnchoredClock>,
}

impl Harness {
    /// Build with `settings`. Call from inside a (paused) runtime.
    pub fn new(settings: config::Settings) -> Self {
        let actuator = Arc::new(MockActuator::new());
        let clock = Arc::new(AnchoredClock::new(TEST_EPOCH));
        let controller = Controller::new(actuator.clone(), clock.clone(), settings);
        Self {
            controller,
            actuator,
            clock,
        }
    }

    /// Current wall time.
    pub fn wall(&self) -> PrimitiveDateTime {
        self.clock.wall()
    }

    /// Deliver a bite stamped now.
    pub fn hook_now(&self) {
        self.controller.handle_event(&hook_at(self.wall()));
    }

    /// Deliver a pickup stamped now.
    pub fn pickup_now(&self) {
        self.controller.handle_event(&pickup_at(self.wall()));
    }
}

/// Build an event of `kind` at `timestamp`.
pub fn event_at(kind: SignalKind, timestamp: PrimitiveDateTime) -> LogEvent {
    LogEvent {
        kind,
        timestamp,
        raw_line: format!("{timestamp} test {kind}"),
        stamped_on_read: false,
    }
}

/// Bite event.
pub fn hook_at(timestamp: PrimitiveDateTime) -> LogEvent {
    event_at(SignalKind::Hook, timestamp)
}

/// Pickup event.
pub fn pickup_at(timestamp: PrimitiveDateTime) -> LogEvent {
    event_at(SignalKind::Pickup, timestamp)
}

/// Save event.
pub fn save_at(timestamp: PrimitiveDateTime) -> LogEvent {
    event_at(SignalKind::Save, timestamp)
}

/// Poll `pred` every 10ms of (virtual) time until it holds or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut pred: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if pred() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(10)).await;
    }
}
