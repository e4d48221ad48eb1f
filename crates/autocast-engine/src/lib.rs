//! Autocast Engine
//!
//! The engine runs the fishing cycle: cast, wait for a bite, reel, rest.
//! Two independent sources race to drive each step: wall-clock timeouts and
//! timestamped signals tailed from an external log. The engine decides exactly
//! once per cycle which trigger wins and discards everything stale.
//!
//! The public surface is small:
//! - [`Controller`]: start/stop/restart, settings, event intake, snapshots
//! - [`Actuator`]: the press/release sink the controller drives
//! - [`Clock`]: wall-clock source used to judge log timestamps
//!
//! The building blocks are public so they can be tested on their own:
//! [`Generation`] tokens, [`Timers`], [`EventCorrelator`], [`BucketTracker`]
//! and [`StatsAggregator`].

mod bucket;
mod clock;
mod controller;
mod correlator;
mod deps;
mod error;
mod generation;
mod state;
mod stats;
pub mod test_support;
mod timers;

pub use bucket::{BucketTracker, PendingBucket, Recovery};
pub use clock::{AnchoredClock, Clock, Stamp, SystemClock};
pub use controller::{Controller, CycleWindow, Snapshot};
pub use correlator::{EventCorrelator, Phase, Rejection};
pub use deps::Actuator;
pub use error::{Error, Result};
pub use generation::{Generation, GenerationToken, Generations, TimerFamily};
pub use state::CycleState;
pub use stats::{StatsAggregator, StatsSnapshot, format_runtime};
pub use timers::Timers;
