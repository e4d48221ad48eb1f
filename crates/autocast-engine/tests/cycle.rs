use std::time::Duration;

use autocast_engine::{
    CycleState, Error,
    test_support::{Action, Harness, hook_at, wait_until},
};
use config::Settings;
use time::Duration as WallDuration;
use tokio::{sync::mpsc, time::sleep};

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn near(d: Duration, want: f64) -> bool {
    (d.as_secs_f64() - want).abs() < 0.05
}

async fn started_and_waiting(settings: Settings) -> Harness {
    let h = Harness::new(settings);
    assert!(h.controller.start());
    assert!(
        wait_until(secs(5.0), || h.controller.state() == CycleState::WaitingHook).await,
        "never reached waiting_hook"
    );
    h
}

#[tokio::test(start_paused = true)]
async fn hook_after_min_wait_reels_once_and_releases_guard() {
    let h = started_and_waiting(Settings::default()).await;
    assert!(near(h.actuator.holds()[0], 0.5));

    sleep(secs(4.2)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Reeling);
    assert!(h.controller.is_busy());

    sleep(secs(1.0)).await;
    h.pickup_now();
    assert!(
        wait_until(secs(5.0), || !h.actuator.is_pressed()).await,
        "reel never released"
    );
    let holds = h.actuator.holds();
    assert_eq!(holds.len(), 2);
    assert!(near(holds[1], 3.0), "reel held {:?}", holds[1]);
    assert_eq!(h.controller.snapshot().stats.reels, 1);
    assert_eq!(h.controller.state(), CycleState::WaitingBucket);

    assert!(wait_until(secs(10.0), || !h.controller.is_busy()).await);
    assert!(
        wait_until(secs(10.0), || h.controller.state() == CycleState::WaitingHook).await,
        "cycle did not resume"
    );
    let snap = h.controller.snapshot();
    assert_eq!((snap.stats.reels, snap.stats.timeouts), (1, 0));
}

#[tokio::test(start_paused = true)]
async fn superseded_hook_timer_is_discarded() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(4.5)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Reeling);

    // The hook timer armed for this wait was due at ~60.5s; let it wake.
    sleep(secs(57.0)).await;
    let (_, discarded) = h.controller.timer_counts();
    assert!(discarded >= 1);
    assert_eq!(h.controller.snapshot().stats.timeouts, 0);
}

#[tokio::test(start_paused = true)]
async fn hook_wait_timeout_forces_reel_then_casts() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(60.1)).await;
    assert_eq!(h.controller.state(), CycleState::TimeoutReel);
    assert_eq!(h.controller.snapshot().stats.timeouts, 1);
    assert!(h.actuator.is_pressed());

    assert!(
        wait_until(secs(15.0), || h.controller.state() == CycleState::WaitingHook).await,
        "did not resume after forced reel"
    );
    let holds = h.actuator.holds();
    assert!(near(holds[1], 10.0), "forced reel held {:?}", holds[1]);
    assert!(near(holds[2], 0.5));
    let snap = h.controller.snapshot();
    assert_eq!((snap.stats.reels, snap.stats.timeouts), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn hooks_outside_waiting_hook_never_reel() {
    let h = Harness::new(Settings::default());
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Idle);

    h.controller.start();
    assert!(wait_until(secs(1.0), || h.controller.state() == CycleState::Casting).await);
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Casting);

    assert!(wait_until(secs(1.0), || h.controller.state() == CycleState::WaitingHook).await);
    // Under the minimum wait.
    sleep(secs(1.0)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::WaitingHook);
    assert_eq!(h.actuator.presses(), 1);
}

#[tokio::test(start_paused = true)]
async fn hook_stamped_before_wait_start_is_rejected() {
    let h = started_and_waiting(Settings::default()).await;
    let wait_wall = h.controller.window().wait_started.map(|w| w.wall);
    let wait_wall = wait_wall.expect("wait window");
    sleep(secs(5.0)).await;
    h.controller
        .handle_event(&hook_at(wait_wall - WallDuration::milliseconds(300)));
    assert_eq!(h.controller.state(), CycleState::WaitingHook);
    h.controller
        .handle_event(&hook_at(wait_wall - WallDuration::milliseconds(100)));
    assert_eq!(h.controller.state(), CycleState::Reeling);
}

#[tokio::test(start_paused = true)]
async fn clustered_duplicate_hooks_reel_once() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(4.5)).await;
    let ts = h.wall();
    h.controller.handle_event(&hook_at(ts));
    h.controller.handle_event(&hook_at(ts + WallDuration::seconds(1)));
    h.controller.handle_event(&hook_at(ts));
    sleep(secs(0.1)).await;
    // One cast press, one reel press.
    assert_eq!(h.actuator.presses(), 2);
}

#[tokio::test(start_paused = true)]
async fn stop_mid_reel_releases_and_goes_quiet() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(4.5)).await;
    h.hook_now();
    sleep(secs(0.5)).await;
    assert!(h.actuator.is_pressed());

    assert!(h.controller.stop());
    assert_eq!(h.controller.state(), CycleState::Stopped);
    assert!(!h.actuator.is_pressed());
    let presses = h.actuator.presses();

    sleep(secs(0.1)).await;
    let calls = h.actuator.calls();
    assert_eq!(calls.last().map(|c| c.0), Some(Action::Release));
    assert!(!h.controller.is_busy());

    sleep(secs(120.0)).await;
    assert_eq!(h.actuator.presses(), presses);
    assert_eq!(h.controller.state(), CycleState::Stopped);
    let snap = h.controller.snapshot();
    assert_eq!(snap.stats.reels + snap.stats.timeouts, 0);
    assert!(!h.controller.stop());
}

#[tokio::test(start_paused = true)]
async fn stop_right_after_admitted_hook_never_presses() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(4.5)).await;
    let before = h.actuator.calls().len();
    // No yield between admission and stop: the reel task has not run yet.
    h.hook_now();
    assert!(h.controller.stop());
    sleep(secs(1.0)).await;

    let calls = h.actuator.calls();
    let after: Vec<Action> = calls[before..].iter().map(|c| c.0).collect();
    assert!(!after.contains(&Action::Press), "actions after stop: {after:?}");
    assert!(!h.actuator.is_pressed());
    assert!(!h.controller.is_busy());
    assert_eq!(h.controller.state(), CycleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn reel_without_pickup_times_out_then_casts() {
    let h = started_and_waiting(Settings::default()).await;
    sleep(secs(4.5)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Reeling);

    sleep(secs(31.0)).await;
    assert!(
        wait_until(secs(5.0), || h.actuator.holds().len() >= 3).await,
        "next cast never finished"
    );
    let reel = h.actuator.holds()[1].as_secs_f64();
    assert!((29.95..=30.55).contains(&reel), "reel held {reel}s");

    let snap = h.controller.snapshot();
    assert_eq!(snap.stats.reels, 1);
    assert_eq!(snap.stats.timeouts, 0);
    assert_eq!(snap.stats.confirmed_catches, 0);
    assert!(!snap.bucket_pending);
    assert!(h.controller.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_in_every_reachable_state_ends_stopped_with_zero_stats() {
    for at in [0.1, 0.6, 5.0, 61.0] {
        let h = Harness::new(Settings::default());
        h.controller.start();
        sleep(secs(at)).await;
        if at == 5.0 {
            h.hook_now();
        }
        h.controller.stop();
        assert_eq!(h.controller.state(), CycleState::Stopped);
        assert!(!h.actuator.is_pressed());
        h.controller.start();
        let snap = h.controller.snapshot();
        assert_eq!(
            (
                snap.stats.reels,
                snap.stats.timeouts,
                snap.stats.confirmed_catches
            ),
            (0, 0, 0)
        );
        h.controller.stop();
    }
}

#[tokio::test(start_paused = true)]
async fn restart_pauses_then_runs_again() {
    let h = started_and_waiting(Settings::default()).await;
    let before = tokio::time::Instant::now();
    h.controller.restart().await;
    assert!(before.elapsed() >= secs(2.5));
    assert!(h.controller.is_running());
    assert!(wait_until(secs(2.0), || h.controller.state() == CycleState::WaitingHook).await);
    // The first run's hook timer must not fire into the second run.
    sleep(secs(58.0)).await;
    assert_eq!(h.controller.snapshot().stats.timeouts, 0);
}

#[tokio::test(start_paused = true)]
async fn toggle_flips_run_state() {
    let h = Harness::new(Settings::default());
    assert!(h.controller.toggle());
    assert!(!h.controller.toggle());
    assert_eq!(h.controller.state(), CycleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn no_cast_mode_skips_the_press() {
    let settings = Settings {
        no_cast_mode: true,
        ..Settings::default()
    };
    let h = started_and_waiting(settings).await;
    assert_eq!(h.actuator.presses(), 0);
}

#[tokio::test(start_paused = true)]
async fn random_cast_stays_in_bounds() {
    let settings = Settings {
        random_cast_enabled: true,
        random_cast_max: 1.2,
        ..Settings::default()
    };
    let h = started_and_waiting(settings).await;
    let hold = h.actuator.holds()[0];
    assert!(hold >= secs(0.19) && hold <= secs(1.21), "cast held {hold:?}");
}

#[tokio::test(start_paused = true)]
async fn setters_apply_from_next_cycle() {
    let h = started_and_waiting(Settings::default()).await;
    h.controller.set_cast_time(1.5).expect("finite");
    assert!(matches!(
        h.controller.set_cast_time(f64::NAN),
        Err(Error::InvalidSetting { name: "castTime", .. })
    ));
    h.controller.set_field("restTime", "0.1").expect("known key");
    assert!(h.controller.set_field("nope", "1").is_err());
    assert!(near(h.actuator.holds()[0], 0.5));

    // Timeout path: forced reel, rest, then the next cast uses the new hold.
    sleep(secs(60.1)).await;
    assert!(
        wait_until(secs(15.0), || h.actuator.holds().len() >= 3).await,
        "next cast never finished"
    );
    assert!(near(h.actuator.holds()[2], 1.5));
    assert_eq!(h.controller.settings().rest_time, 0.1);
}

#[tokio::test(start_paused = true)]
async fn event_pump_delivers_to_controller() {
    let h = started_and_waiting(Settings::default()).await;
    let (tx, rx) = mpsc::unbounded_channel();
    let pump = h.controller.spawn_event_pump(rx);
    sleep(secs(4.5)).await;
    tx.send(hook_at(h.wall())).expect("send");
    assert!(wait_until(secs(1.0), || h.controller.state() == CycleState::Reeling).await);
    drop(tx);
    pump.await.expect("pump exits when the channel closes");
}
