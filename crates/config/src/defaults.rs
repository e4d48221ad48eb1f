// Defaults, clamp bounds, and serde default functions for settings

// Cast
pub(crate) const CAST_TIME: f64 = 0.5;
pub(crate) const MIN_CAST_TIME: f64 = 0.2;
pub(crate) const MAX_CAST_TIME: f64 = 2.0;
pub(crate) const RANDOM_CAST_MAX: f64 = 1.0;
pub(crate) const MIN_RANDOM_CAST_MAX: f64 = 0.3;

// Rest
pub(crate) const REST_TIME: f64 = 0.5;
pub(crate) const MIN_REST_TIME: f64 = 0.1;
pub(crate) const MAX_REST_TIME: f64 = 10.0;

// Hook wait limit (minutes)
pub(crate) const TIMEOUT_MINUTES: f64 = 1.0;
pub(crate) const MIN_TIMEOUT_MINUTES: f64 = 0.5;
pub(crate) const MAX_TIMEOUT_MINUTES: f64 = 15.0;

// OSC target
pub(crate) const OSC_HOST: &str = "127.0.0.1";
pub(crate) const OSC_PORT: u16 = 9000;
pub(crate) const OSC_ADDRESS: &str = "/input/UseRight";

// Log signal patterns
pub(crate) const HOOK_PATTERN: &str = "SAVED DATA";
pub(crate) const PICKUP_PATTERN: &str = "Fish Pickup attached to rod Toggles(True)";
pub(crate) const SAVE_PATTERN: &str = "Attempt saving";

// Admission and recovery policy (seconds unless noted)
pub(crate) const CYCLE_COOLDOWN: f64 = 2.0;
pub(crate) const HOOK_MIN_WAIT: f64 = 4.0;
pub(crate) const WAIT_START_TOLERANCE: f64 = 0.2;
pub(crate) const SAVED_DATA_CLUSTER: f64 = 7.0;
pub(crate) const BUCKET_EVENT_COOLDOWN: f64 = 3.0;
pub(crate) const BUCKET_SAVE_TIMEOUT: f64 = 5.0;
pub(crate) const BUCKET_RECOVERY_MAX_RETRY: u32 = 2;
pub(crate) const BUCKET_RECOVERY_HOLD: f64 = 0.2;
pub(crate) const PICKUP_SETTLE: f64 = 2.0;
pub(crate) const MAX_REEL_TIME: f64 = 30.0;
pub(crate) const TIMEOUT_REEL_HOLD: f64 = 10.0;
pub(crate) const FORCE_REEL_REST: f64 = 1.0;
pub(crate) const RESTART_PAUSE: f64 = 2.5;
pub(crate) const PICKUP_POLL_INTERVAL: f64 = 0.5;
pub(crate) const BUCKET_POLL_INTERVAL: f64 = 0.5;
pub(crate) const LOG_POLL_INTERVAL: f64 = 0.25;

// Serde default functions
pub(crate) const fn default_cast_time() -> f64 {
    CAST_TIME
}
pub(crate) const fn default_rest_time() -> f64 {
    REST_TIME
}
pub(crate) const fn default_timeout_minutes() -> f64 {
    TIMEOUT_MINUTES
}
pub(crate) const fn default_random_cast_max() -> f64 {
    RANDOM_CAST_MAX
}
pub(crate) fn default_osc_host() -> String {
    OSC_HOST.to_string()
}
pub(crate) const fn default_osc_port() -> u16 {
    OSC_PORT
}
pub(crate) fn default_osc_address() -> String {
    OSC_ADDRESS.to_string()
}
pub(crate) fn default_hook_pattern() -> String {
    HOOK_PATTERN.to_string()
}
pub(crate) fn default_pickup_pattern() -> String {
    PICKUP_PATTERN.to_string()
}
pub(crate) fn default_save_pattern() -> String {
    SAVE_PATTERN.to_string()
}
