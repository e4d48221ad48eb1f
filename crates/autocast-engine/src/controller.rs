//! The cycle controller.
//!
//! Three kinds of execution context touch the shared state: the cycle chain
//! (cast, reel, rest), armed timers, and the event pump. They never block each
//! other for long. Ordering comes from three primitives:
//! - the `running` flag, re-read at every wake;
//! - generation tokens, so superseded work becomes a no-op;
//! - the busy guard, so the event path and the timeout path cannot both reel.
//!
//! Every state change goes through [`Inner::transition`], which re-checks the
//! run flag and the cycle token under the state lock. A stop takes the same lock
//! to invalidate tokens, so no stale chain can write a state after it.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use config::Settings;
use logtail::{LogEvent, SignalKind};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use time::PrimitiveDateTime;
use tokio::{
    sync::mpsc::UnboundedReceiver,
    task::JoinHandle,
    time::{Instant, sleep},
};
use tracing::{debug, info, trace};

use crate::{
    Error, Result,
    bucket::{BucketTracker, Recovery},
    clock::{Clock, Stamp},
    correlator::{EventCorrelator, Phase},
    deps::Actuator,
    generation::{GenerationToken, Generations, TimerFamily},
    state::CycleState,
    stats::{StatsAggregator, StatsSnapshot},
    timers::Timers,
};

/// Per-cycle timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleWindow {
    /// When the current cast began.
    pub cast_started: Option<Stamp>,
    /// When the current hook wait began.
    pub wait_started: Option<Stamp>,
    /// When the previous reel finished.
    pub last_cycle_ended: Option<Instant>,
}

/// Read-only view for presenters.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Current state.
    pub state: CycleState,
    /// Run flag.
    pub running: bool,
    /// Whether a reel holds the guard.
    pub busy: bool,
    /// Whether a container save is still expected.
    pub bucket_pending: bool,
    /// Counters.
    pub stats: StatsSnapshot,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state={} {}", self.state, self.stats)?;
        if self.bucket_pending {
            f.write_str(" bucket=pending")?;
        }
        Ok(())
    }
}

/// How a reel's wait for pickup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReelOutcome {
    /// Pickup confirmed at the given instant.
    Caught(Instant),
    /// Reel timeout fired first.
    TimedOut,
    /// Run stopped or cycle superseded.
    Abandoned,
}

/// RAII hold on the reel guard.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    /// Take the guard if free. Never blocks.
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Draw this cycle's cast hold.
fn cast_hold(cfg: &Settings) -> Duration {
    if cfg.random_cast_enabled {
        let (lo, hi) = cfg.random_cast_bounds();
        rand::thread_rng().gen_range(lo..=hi)
    } else {
        cfg.cast_duration()
    }
}

/// Reject non-finite setter input before it reaches clamping.
fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidSetting { name, value })
    }
}

/// Shared controller state.
struct Inner {
    /// Press/release sink.
    actuator: Arc<dyn Actuator>,
    /// Wall-clock source.
    clock: Arc<dyn Clock>,
    /// Settings as last set; read at the start of each cycle.
    settings: RwLock<Settings>,
    /// Settings frozen for the cycle in progress.
    cycle_settings: RwLock<Arc<Settings>>,
    /// Run flag.
    running: AtomicBool,
    /// Authoritative state.
    state: Mutex<CycleState>,
    /// Generation counters.
    generations: Generations,
    /// Reel guard.
    busy: Arc<AtomicBool>,
    /// Cycle timestamps.
    window: Mutex<CycleWindow>,
    /// Signal admission history.
    correlator: Mutex<EventCorrelator>,
    /// Pending container save.
    bucket: Mutex<BucketTracker>,
    /// When the current reel's pickup was confirmed.
    pickup: Mutex<Option<Instant>>,
    /// Counters.
    stats: StatsAggregator,
    /// Timer scheduler.
    timers: Timers,
}

impl Inner {
    /// Current state.
    fn state(&self) -> CycleState {
        *self.state.lock()
    }

    /// Run flag.
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Settings of the cycle in progress.
    fn config(&self) -> Arc<Settings> {
        self.cycle_settings.read().clone()
    }

    /// Move to `to` if running, `cycle` is live, and (when given) the current
    /// state is `from`. `effect` runs under the state lock on success.
    fn transition(
        &self,
        cycle: &GenerationToken,
        from: Option<CycleState>,
        to: CycleState,
        effect: impl FnOnce(),
    ) -> bool {
        let mut state = self.state.lock();
        if !self.is_running() || !cycle.is_live() {
            return false;
        }
        if from.is_some_and(|f| f != *state) {
            return false;
        }
        let prev = *state;
        if prev != to {
            debug!(from = %prev, to = %to, cycle = cycle.value(), "transition");
        }
        *state = to;
        effect();
        true
    }

    /// Unconditional transition within a live cycle.
    fn advance(&self, cycle: &GenerationToken, to: CycleState) -> bool {
        self.transition(cycle, None, to, || {})
    }

    /// Whether `cycle` may still act.
    fn live(&self, cycle: &GenerationToken) -> bool {
        self.is_running() && cycle.is_live()
    }

    /// Press only if `cycle` is live. The check and the press share the state
    /// lock with `stop`, so a press can never land after a stop's release.
    fn press_if_live(&self, cycle: &GenerationToken) -> bool {
        let _state = self.state.lock();
        if !self.live(cycle) {
            return false;
        }
        self.actuator.press();
        true
    }

    /// Sleep for `d`, waking early on stop. Returns whether the cycle is still live.
    async fn pause(&self, d: Duration, cycle: &GenerationToken) -> bool {
        if !d.is_zero() {
            // Take the scope before the liveness check: a stop that lands after
            // the check cancels this scope.
            let scope = self.timers.scope();
            if !self.live(cycle) {
                return false;
            }
            tokio::select! {
                _ = sleep(d) => {}
                _ = scope.cancelled() => {}
            }
        }
        self.live(cycle)
    }

    /// Gate for a timer armed in `expect` during `cycle`.
    fn gate(
        self: &Arc<Self>,
        cycle: GenerationToken,
        expect: CycleState,
    ) -> impl FnOnce() -> bool + Send + use<> {
        let this = self.clone();
        move || this.is_running() && cycle.is_live() && this.state() == expect
    }

    /// Controller state for event admission.
    fn phase(&self) -> Phase {
        let state = self.state();
        let window = *self.window.lock();
        Phase {
            running: self.is_running(),
            busy: self.busy.load(Ordering::Acquire),
            state,
            wait_started: window.wait_started,
            last_cycle_ended: window.last_cycle_ended,
            now: self.clock.now(),
        }
    }

    /// Issue the next cycle token if `prev` is still the live one.
    fn next_cycle(&self, prev: &GenerationToken) -> Option<GenerationToken> {
        let _state = self.state.lock();
        (self.is_running() && prev.is_live()).then(|| self.generations.cast_cycle.issue())
    }

    /// Run the next cycle on its own task.
    fn spawn_cycle(self: &Arc<Self>, prev: GenerationToken) {
        let this = self.clone();
        tokio::spawn(async move { this.run_cycle(prev).await });
    }

    /// Bucket check, then cast, then open the hook wait.
    async fn run_cycle(self: Arc<Self>, prev: GenerationToken) {
        if !self.is_running() || !prev.is_live() {
            return;
        }
        let cfg = Arc::new(self.settings.read().clone());
        *self.cycle_settings.write() = cfg.clone();

        self.recover_bucket(&cfg, &prev).await;
        let Some(cycle) = self.next_cycle(&prev) else {
            return;
        };
        self.stats.mark_cycle(self.clock.now());

        if cfg.no_cast_mode {
            self.enter_wait_hook(&cfg, &cycle);
            return;
        }
        let stamp = Stamp::now(&*self.clock);
        if !self.advance(&cycle, CycleState::Casting) {
            return;
        }
        self.window.lock().cast_started = Some(stamp);
        let hold = cast_hold(&cfg);
        debug!(cycle = cycle.value(), hold_ms = hold.as_millis() as u64, "cast");
        if !self.press_if_live(&cycle) {
            return;
        }
        let live = self.pause(hold, &cycle).await;
        self.actuator.release();
        if live {
            self.enter_wait_hook(&cfg, &cycle);
        }
    }

    /// Corrective pulse for a save that never showed up.
    async fn recover_bucket(&self, cfg: &Settings, cycle: &GenerationToken) {
        let decision = self.bucket.lock().check(self.clock.now(), &cfg.policy);
        match decision {
            Recovery::Idle | Recovery::Waiting => {}
            Recovery::Pulse { attempt } => {
                info!(attempt, "bucket_recovery_pulse");
                if self.press_if_live(cycle) {
                    self.pause(cfg.policy.bucket_recovery_hold(), cycle).await;
                    self.actuator.release();
                }
            }
            Recovery::GaveUp { retries } => {
                info!(retries, "bucket_recovery_gave_up");
            }
        }
    }

    /// Open the hook wait and arm its backstop.
    fn enter_wait_hook(self: &Arc<Self>, cfg: &Settings, cycle: &GenerationToken) {
        let stamp = Stamp::now(&*self.clock);
        if !self.transition(cycle, None, CycleState::WaitingHook, || {
            self.window.lock().wait_started = Some(stamp);
        }) {
            return;
        }
        let token = self.generations.hook_timeout.issue();
        let gate = self.gate(cycle.clone(), CycleState::WaitingHook);
        let this = self.clone();
        let cycle = cycle.clone();
        self.timers.arm(
            TimerFamily::HookTimeout,
            token,
            cfg.hook_wait_duration(),
            gate,
            move || this.on_hook_timeout(cycle),
        );
    }

    /// Hook wait ran out: force a reel.
    async fn on_hook_timeout(self: Arc<Self>, cycle: GenerationToken) {
        let Some(guard) = BusyGuard::try_acquire(&self.busy) else {
            trace!(cycle = cycle.value(), "hook_timeout_guard_held");
            return;
        };
        let cfg = self.config();
        if !self.transition(
            &cycle,
            Some(CycleState::WaitingHook),
            CycleState::TimeoutReel,
            || self.stats.record_timeout(),
        ) {
            return;
        }
        info!(cycle = cycle.value(), "hook_wait_timeout");
        if !self.press_if_live(&cycle) {
            return;
        }
        let live = self.pause(cfg.policy.timeout_reel_hold(), &cycle).await;
        self.actuator.release();
        if !live || !self.finish_reel(&cycle, CycleState::TimeoutReel, CycleState::Resting, || {}) {
            return;
        }
        drop(guard);
        self.rest_then_cast(cycle, cfg.policy.force_reel_rest()).await;
    }

    /// Record the end of a reel and move on.
    fn finish_reel(
        &self,
        cycle: &GenerationToken,
        from: CycleState,
        to: CycleState,
        effect: impl FnOnce(),
    ) -> bool {
        let now = self.clock.now();
        self.transition(cycle, Some(from), to, || {
            self.stats.record_reel();
            self.window.lock().last_cycle_ended = Some(now);
            effect();
        })
    }

    /// Rest, then start the next cycle.
    async fn rest_then_cast(self: Arc<Self>, cycle: GenerationToken, rest: Duration) {
        if !self.advance(&cycle, CycleState::Resting) {
            return;
        }
        if self.pause(rest, &cycle).await {
            self.spawn_cycle(cycle);
        }
    }

    /// Route one log event.
    fn handle_event(self: &Arc<Self>, ev: &LogEvent) {
        match ev.kind {
            SignalKind::Hook | SignalKind::Save => {
                if self.bucket.lock().offer(ev.timestamp) {
                    self.stats.record_catch();
                    self.correlator.lock().record_bucket_save(ev.timestamp);
                    info!(ts = %ev.timestamp, kind = %ev.kind, "catch_confirmed");
                    return;
                }
                if ev.kind == SignalKind::Hook {
                    self.on_hook(ev);
                } else {
                    trace!(ts = %ev.timestamp, "save_without_pending_catch");
                }
            }
            SignalKind::Pickup => self.on_pickup(ev),
        }
    }

    /// Admit a bite and hand the reel to a worker task.
    fn on_hook(self: &Arc<Self>, ev: &LogEvent) {
        let cfg = self.config();
        let phase = self.phase();
        let admitted = self
            .correlator
            .lock()
            .check_hook(ev.timestamp, &phase, &cfg.policy);
        if let Err(reason) = admitted {
            trace!(?reason, ts = %ev.timestamp, "hook_rejected");
            return;
        }
        let Some(guard) = BusyGuard::try_acquire(&self.busy) else {
            trace!(ts = %ev.timestamp, "hook_guard_held");
            return;
        };
        let cycle = self.generations.cast_cycle.capture();
        if !self.transition(&cycle, Some(CycleState::WaitingHook), CycleState::Reeling, || {
            self.correlator.lock().commit_hook(ev.timestamp);
            self.generations.hook_timeout.invalidate();
            *self.pickup.lock() = None;
        }) {
            return;
        }
        let waited = phase
            .wait_started
            .map(|w| phase.now.saturating_duration_since(w.at))
            .unwrap_or_default();
        info!(
            cycle = cycle.value(),
            ts = %ev.timestamp,
            waited_ms = waited.as_millis() as u64,
            "hook_admitted"
        );
        let this = self.clone();
        let hook_ts = ev.timestamp;
        tokio::spawn(async move { this.reel(cycle, hook_ts, guard).await });
    }

    /// Record the first admissible pickup of the current reel.
    fn on_pickup(&self, ev: &LogEvent) {
        let cfg = self.config();
        let phase = self.phase();
        if let Err(reason) = self
            .correlator
            .lock()
            .admit_pickup(ev.timestamp, &phase, &cfg.policy)
        {
            trace!(?reason, ts = %ev.timestamp, "pickup_rejected");
            return;
        }
        let mut pickup = self.pickup.lock();
        if pickup.is_none() {
            *pickup = Some(phase.now);
            debug!(ts = %ev.timestamp, "pickup_confirmed");
        }
    }

    /// Event-path reel: hold until pickup settles or the reel times out.
    async fn reel(self: Arc<Self>, cycle: GenerationToken, hook_ts: PrimitiveDateTime, guard: BusyGuard) {
        let cfg = self.config();
        let policy = &cfg.policy;
        if !self.press_if_live(&cycle) {
            debug!(cycle = cycle.value(), "reel_abandoned");
            return;
        }

        let expired = Arc::new(AtomicBool::new(false));
        let flag = expired.clone();
        self.timers.arm(
            TimerFamily::ReelTimeout,
            self.generations.reel_timeout.issue(),
            policy.max_reel_time(),
            self.gate(cycle.clone(), CycleState::Reeling),
            move || async move { flag.store(true, Ordering::SeqCst) },
        );

        let outcome = self
            .await_pickup(&cycle, &expired, policy.pickup_poll_interval())
            .await;
        if let ReelOutcome::Caught(at) = outcome {
            let held = self.clock.now().saturating_duration_since(at);
            self.pause(policy.pickup_settle().saturating_sub(held), &cycle)
                .await;
        }
        self.actuator.release();
        self.generations.reel_timeout.invalidate();

        let caught = match outcome {
            ReelOutcome::Abandoned => {
                debug!(cycle = cycle.value(), "reel_abandoned");
                return;
            }
            ReelOutcome::TimedOut => false,
            ReelOutcome::Caught(_) => true,
        };
        let wait_bucket = caught && !cfg.rest_enabled;
        let next = if wait_bucket {
            CycleState::WaitingBucket
        } else {
            CycleState::Resting
        };
        let now = self.clock.now();
        if !self.finish_reel(&cycle, CycleState::Reeling, next, || {
            if wait_bucket {
                self.bucket.lock().track(cycle.value(), hook_ts, now);
            }
        }) {
            return;
        }
        if caught {
            info!(cycle = cycle.value(), "reel_caught");
        } else {
            info!(cycle = cycle.value(), "reel_timeout");
        }
        if wait_bucket {
            self.await_bucket(&cycle, &cfg).await;
        }
        drop(guard);
        self.rest_then_cast(cycle, cfg.rest_duration()).await;
    }

    /// Poll for pickup, expiry, or stop.
    async fn await_pickup(
        &self,
        cycle: &GenerationToken,
        expired: &AtomicBool,
        poll: Duration,
    ) -> ReelOutcome {
        loop {
            if !self.is_running() || !cycle.is_live() {
                return ReelOutcome::Abandoned;
            }
            let picked = *self.pickup.lock();
            if let Some(at) = picked {
                return ReelOutcome::Caught(at);
            }
            if expired.load(Ordering::SeqCst) {
                return ReelOutcome::TimedOut;
            }
            self.pause(poll, cycle).await;
        }
    }

    /// Wait up to the save budget for the tracker to consume a save line.
    async fn await_bucket(&self, cycle: &GenerationToken, cfg: &Settings) {
        let deadline = self.clock.now() + cfg.policy.bucket_save_timeout();
        loop {
            if self.bucket.lock().pending().is_none() {
                debug!(cycle = cycle.value(), "bucket_saved");
                return;
            }
            let now = self.clock.now();
            if now >= deadline {
                debug!(cycle = cycle.value(), "bucket_save_deferred");
                return;
            }
            let step = cfg.policy.bucket_poll_interval().min(deadline - now);
            if !self.pause(step, cycle).await {
                return;
            }
        }
    }
}

/// Drives the cast/wait/reel/rest cycle against an [`Actuator`] and a stream
/// of [`LogEvent`]s.
///
/// Cheap to clone; all clones share one controller. Methods that start work
/// spawn tokio tasks and must be called from within a runtime.
#[derive(Clone)]
pub struct Controller {
    /// Shared state.
    inner: Arc<Inner>,
}

impl Controller {
    /// Build an idle controller.
    pub fn new(actuator: Arc<dyn Actuator>, clock: Arc<dyn Clock>, settings: Settings) -> Self {
        let settings = settings.sanitized();
        let generations = Generations::default();
        let bucket = BucketTracker::new(generations.bucket_recovery.clone());
        Self {
            inner: Arc::new(Inner {
                actuator,
                clock,
                cycle_settings: RwLock::new(Arc::new(settings.clone())),
                settings: RwLock::new(settings),
                running: AtomicBool::new(false),
                state: Mutex::new(CycleState::Idle),
                generations,
                busy: Arc::new(AtomicBool::new(false)),
                window: Mutex::new(CycleWindow::default()),
                correlator: Mutex::new(EventCorrelator::new()),
                bucket: Mutex::new(bucket),
                pickup: Mutex::new(None),
                stats: StatsAggregator::new(),
                timers: Timers::new(),
            }),
        }
    }

    /// Begin cycling. Returns false if already running.
    pub fn start(&self) -> bool {
        let inner = &self.inner;
        let token = {
            let mut state = inner.state.lock();
            if inner.running.swap(true, Ordering::SeqCst) {
                return false;
            }
            inner.generations.invalidate_all();
            *state = CycleState::Starting;
            inner.generations.cast_cycle.issue()
        };
        inner.stats.reset(Some(inner.clock.now()));
        inner.bucket.lock().clear();
        inner.correlator.lock().reset();
        *inner.window.lock() = CycleWindow::default();
        *inner.pickup.lock() = None;
        info!("started");
        inner.spawn_cycle(token);
        true
    }

    /// Stop cycling and release the actuator. Returns false if not running.
    ///
    /// Safe in any state. An in-flight press is released by its own task as
    /// well; nothing scheduled after this call will act.
    pub fn stop(&self) -> bool {
        let inner = &self.inner;
        let was_running = {
            let mut state = inner.state.lock();
            let was = inner.running.swap(false, Ordering::SeqCst);
            inner.generations.invalidate_all();
            if was {
                *state = CycleState::Stopped;
            }
            was
        };
        inner.timers.reset();
        if !was_running {
            return false;
        }
        inner.bucket.lock().clear();
        *inner.pickup.lock() = None;
        inner.actuator.release();
        inner.stats.reset(None);
        info!("stopped");
        true
    }

    /// Stop, pause if a run was interrupted, then start.
    pub async fn restart(&self) {
        let pause = self.inner.settings.read().policy.restart_pause();
        if self.stop() {
            sleep(pause).await;
        }
        self.start();
    }

    /// Start if stopped, stop if running. Returns the new run flag.
    pub fn toggle(&self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    /// Run flag.
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Current state.
    pub fn state(&self) -> CycleState {
        self.inner.state()
    }

    /// Whether a reel holds the guard.
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// State and counters for display.
    pub fn snapshot(&self) -> Snapshot {
        let inner = &self.inner;
        Snapshot {
            state: inner.state(),
            running: inner.is_running(),
            busy: self.is_busy(),
            bucket_pending: inner.bucket.lock().pending().is_some(),
            stats: inner.stats.snapshot(inner.clock.now()),
        }
    }

    /// Timestamps of the current cycle.
    pub fn window(&self) -> CycleWindow {
        *self.inner.window.lock()
    }

    /// Timer counters: (fired, discarded).
    pub fn timer_counts(&self) -> (u64, u64) {
        (self.inner.timers.fired(), self.inner.timers.discarded())
    }

    /// Feed one event synchronously. Admission runs inline; any reel it
    /// triggers runs on a spawned task.
    pub fn handle_event(&self, ev: &LogEvent) {
        self.inner.handle_event(ev);
    }

    /// Consume events from `rx` until the channel closes.
    pub fn spawn_event_pump(&self, mut rx: UnboundedReceiver<LogEvent>) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                inner.handle_event(&ev);
            }
            debug!("event_pump_closed");
        })
    }

    /// Current settings, including changes not yet picked up by a cycle.
    pub fn settings(&self) -> Settings {
        self.inner.settings.read().clone()
    }

    /// Replace all settings. Applies from the next cycle.
    pub fn replace_settings(&self, settings: &Settings) {
        *self.inner.settings.write() = settings.sanitized();
    }

    /// Apply a change and re-clamp.
    fn update(&self, f: impl FnOnce(&mut Settings)) {
        let mut s = self.inner.settings.write();
        f(&mut s);
        *s = s.sanitized();
    }

    /// Fixed cast hold, in seconds.
    pub fn set_cast_time(&self, secs: f64) -> Result<()> {
        let v = finite("castTime", secs)?;
        self.update(|s| s.cast_time = v);
        Ok(())
    }

    /// Rest after a reel, in seconds.
    pub fn set_rest_time(&self, secs: f64) -> Result<()> {
        let v = finite("restTime", secs)?;
        self.update(|s| s.rest_time = v);
        Ok(())
    }

    /// Hook-wait limit, in minutes.
    pub fn set_hook_wait_limit(&self, minutes: f64) -> Result<()> {
        let v = finite("timeoutLimit", minutes)?;
        self.update(|s| s.hook_wait_limit = v);
        Ok(())
    }

    /// Randomized cast toggle and upper bound, in seconds.
    pub fn set_random_cast(&self, enabled: bool, max_secs: f64) -> Result<()> {
        let v = finite("randomCastMax", max_secs)?;
        self.update(|s| {
            s.random_cast_enabled = enabled;
            s.random_cast_max = v;
        });
        Ok(())
    }

    /// Skip the cast press.
    pub fn set_no_cast_mode(&self, on: bool) {
        self.update(|s| s.no_cast_mode = on);
    }

    /// Rest directly after a reel instead of waiting for the save.
    pub fn set_rest_enabled(&self, on: bool) {
        self.update(|s| s.rest_enabled = on);
    }

    /// Apply a `key value` pair using persisted key names.
    pub fn set_field(&self, key: &str, value: &str) -> Result<()> {
        self.inner.settings.write().set_field(key, value)?;
        Ok(())
    }
}
