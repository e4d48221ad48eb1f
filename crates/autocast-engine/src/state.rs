use std::fmt;

/// Phase of the fishing cycle. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CycleState {
    /// Never started.
    #[default]
    Idle,
    /// Start accepted; the first cast has not begun.
    Starting,
    /// Holding the cast press.
    Casting,
    /// Listening for a bite.
    WaitingHook,
    /// Reel in progress after an admitted bite.
    Reeling,
    /// Catch confirmed; waiting for the container save.
    WaitingBucket,
    /// Pausing between cycles.
    Resting,
    /// Forced reel after the hook wait ran out.
    TimeoutReel,
    /// Stopped by command.
    Stopped,
}

impl CycleState {
    /// Whether this state belongs to an active run.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::Stopped)
    }

    /// Short lowercase label used in logs and status lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Casting => "casting",
            Self::WaitingHook => "waiting_hook",
            Self::Reeling => "reeling",
            Self::WaitingBucket => "waiting_bucket",
            Self::Resting => "resting",
            Self::TimeoutReel => "timeout_reel",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
