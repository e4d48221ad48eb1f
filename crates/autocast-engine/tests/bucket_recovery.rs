use std::time::Duration;

use autocast_engine::{
    CycleState,
    test_support::{Harness, save_at, wait_until},
};
use config::Settings;
use tokio::time::sleep;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

/// Presses that look like recovery pulses (0.2s hold).
fn pulses(h: &Harness) -> usize {
    h.actuator
        .holds()
        .iter()
        .filter(|d| (d.as_secs_f64() - 0.2).abs() < 0.05)
        .count()
}

/// Run one event-path catch and return once the reel has released.
async fn catch_one(h: &Harness) {
    assert!(wait_until(secs(120.0), || h.controller.state() == CycleState::WaitingHook).await);
    sleep(secs(4.5)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Reeling);
    sleep(secs(1.0)).await;
    h.pickup_now();
    assert!(wait_until(secs(5.0), || !h.actuator.is_pressed()).await);
}

#[tokio::test(start_paused = true)]
async fn missing_save_gets_bounded_pulses_then_clears() {
    let h = Harness::new(Settings::default());
    h.controller.start();
    catch_one(&h).await;
    assert_eq!(h.controller.state(), CycleState::WaitingBucket);
    assert!(h.controller.snapshot().bucket_pending);

    // Two timeout cycles later the third cast start gives up.
    assert!(
        wait_until(secs(400.0), || !h.controller.snapshot().bucket_pending).await,
        "pending bucket never cleared"
    );
    assert_eq!(pulses(&h), 2);
    assert_eq!(h.controller.snapshot().stats.confirmed_catches, 0);

    // No further pulses once given up.
    sleep(secs(200.0)).await;
    assert_eq!(pulses(&h), 2);
}

#[tokio::test(start_paused = true)]
async fn save_line_confirms_catch() {
    let h = Harness::new(Settings::default());
    h.controller.start();
    catch_one(&h).await;
    assert_eq!(h.controller.state(), CycleState::WaitingBucket);

    sleep(secs(1.0)).await;
    h.controller.handle_event(&save_at(h.wall()));
    let snap = h.controller.snapshot();
    assert_eq!(snap.stats.confirmed_catches, 1);
    assert!(!snap.bucket_pending);

    assert!(wait_until(secs(2.0), || h.controller.state() == CycleState::WaitingHook).await);
    assert_eq!(pulses(&h), 0);
}

#[tokio::test(start_paused = true)]
async fn hook_line_after_catch_counts_as_the_save() {
    let h = Harness::new(Settings::default());
    h.controller.start();
    catch_one(&h).await;
    h.hook_now();
    assert_eq!(h.controller.snapshot().stats.confirmed_catches, 1);
    assert_eq!(h.controller.state(), CycleState::WaitingBucket);
}

#[tokio::test(start_paused = true)]
async fn rest_mode_skips_bucket_tracking() {
    let settings = Settings {
        rest_enabled: true,
        ..Settings::default()
    };
    let h = Harness::new(settings);
    h.controller.start();
    catch_one(&h).await;
    let snap = h.controller.snapshot();
    assert_eq!(snap.state, CycleState::Resting);
    assert!(!snap.bucket_pending);
    // Only a save line confirms a catch, and rest mode never waits for one.
    assert_eq!(snap.stats.confirmed_catches, 0);
    assert_eq!(snap.stats.reels, 1);
}

#[tokio::test(start_paused = true)]
async fn stop_clears_pending_bucket() {
    let h = Harness::new(Settings::default());
    h.controller.start();
    catch_one(&h).await;
    assert!(h.controller.snapshot().bucket_pending);
    h.controller.stop();
    assert!(!h.controller.snapshot().bucket_pending);

    h.controller.start();
    sleep(secs(20.0)).await;
    assert_eq!(pulses(&h), 0);
}

#[tokio::test(start_paused = true)]
async fn deferred_save_in_next_wait_is_consumed_not_reeled() {
    let h = Harness::new(Settings::default());
    h.controller.start();
    catch_one(&h).await;
    // The save budget runs out, so the next cast starts with one pulse.
    assert!(wait_until(secs(20.0), || h.controller.state() == CycleState::WaitingHook).await);
    assert_eq!(pulses(&h), 1);

    sleep(secs(4.5)).await;
    h.hook_now();
    let snap = h.controller.snapshot();
    assert_eq!(snap.stats.confirmed_catches, 1);
    assert!(!snap.bucket_pending);
    assert_eq!(snap.state, CycleState::WaitingHook);

    // Inside the save cooldown the next bite is still an echo.
    sleep(secs(2.0)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::WaitingHook);
    sleep(secs(1.5)).await;
    h.hook_now();
    assert_eq!(h.controller.state(), CycleState::Reeling);
}
