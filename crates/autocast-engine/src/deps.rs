use oscpress::OscPress;

// ---- Actuator abstraction ----

/// The single press/release sink driven by the controller.
///
/// Calls are fire-and-forget. Implementations swallow their own transport
/// failures; the controller never learns whether an action landed.
pub trait Actuator: Send + Sync {
    /// Begin holding the action.
    fn press(&self);
    /// Stop holding the action.
    fn release(&self);
}

impl Actuator for OscPress {
    fn press(&self) {
        Self::press(self);
    }
    fn release(&self) {
        Self::release(self);
    }
}
