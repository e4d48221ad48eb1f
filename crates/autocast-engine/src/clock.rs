//! Monotonic and wall-clock time sources.
//!
//! Elapsed-time checks always use `tokio::time::Instant` so paused-clock tests
//! drive them. Log timestamps are naive local wall time, so the controller
//! also needs a wall clock to stamp wait phases.

use time::{Duration as WallDuration, PrimitiveDateTime, UtcOffset};
use tokio::time::Instant;

/// Source of wall-clock readings.
pub trait Clock: Send + Sync {
    /// Current wall time in the same frame as log timestamps.
    fn wall(&self) -> PrimitiveDateTime;

    /// Current monotonic time.
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reads the system clock in a fixed UTC offset.
///
/// The offset is resolved once at startup, before any threads exist.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// Local offset.
    offset: UtcOffset,
}

impl SystemClock {
    /// Clock reporting wall time in `offset`.
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn wall(&self) -> PrimitiveDateTime {
        logtail::wall_now(self.offset)
    }
}

/// Wall clock that advances with `tokio::time`, anchored at a fixed date.
///
/// Under a paused runtime this keeps wall and monotonic readings in lockstep.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    /// Wall time at `base`.
    wall: PrimitiveDateTime,
    /// Monotonic anchor.
    base: Instant,
}

impl AnchoredClock {
    /// Anchor `wall` at the current monotonic instant.
    pub fn new(wall: PrimitiveDateTime) -> Self {
        Self {
            wall,
            base: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn wall(&self) -> PrimitiveDateTime {
        let elapsed = WallDuration::try_from(self.base.elapsed()).unwrap_or(WallDuration::ZERO);
        self.wall.checked_add(elapsed).unwrap_or(self.wall)
    }
}

/// A monotonic reading paired with the wall time at the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Monotonic reading.
    pub at: Instant,
    /// Wall reading.
    pub wall: PrimitiveDateTime,
}

impl Stamp {
    /// Read both clocks.
    pub fn now(clock: &dyn Clock) -> Self {
        Self {
            at: clock.now(),
            wall: clock.wall(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::datetime;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn anchored_clock_tracks_virtual_time() {
        let c = AnchoredClock::new(datetime!(2025-07-03 21:00));
        tokio::time::advance(Duration::from_millis(4200)).await;
        assert_eq!(c.wall(), datetime!(2025-07-03 21:00:04.2));
    }
}
