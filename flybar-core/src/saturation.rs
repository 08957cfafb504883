//! Servo rate/acceleration envelope tracker for tail anti-windup.
//!
//! The tracker follows the fastest trajectory a physical servo could fly
//! towards the requested signal and reports when the request leaves that
//! envelope. It never clamps the real output; it only tells the tail loop
//! to stop winding up its integral.

/// Degrees of servo throw per unit of normalized command (90 deg = [-1, 1]).
pub const DEGREES_PER_UNIT: f32 = 45.0;

/// Bounded trajectory state, persisted across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateAccelTracker {
    value: f32,
    rate: f32,
}

impl RateAccelTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: 0.0,
            rate: 0.0,
        }
    }

    /// Restart the trajectory at rest on `value`.
    pub fn reset_to(&mut self, value: f32) {
        self.value = value;
        self.rate = 0.0;
    }

    /// Value of the achievable trajectory after the last update.
    #[inline]
    #[must_use]
    pub fn bounded_value(&self) -> f32 {
        self.value
    }

    /// Rate of the achievable trajectory after the last update.
    #[inline]
    #[must_use]
    pub fn bounded_rate(&self) -> f32 {
        self.rate
    }

    /// Advance one tick towards `x` and report whether `x` left the
    /// envelope.
    ///
    /// `rate_limit` and `accel_limit` are in deg/s and deg/s^2 of servo
    /// throw. `dt` must be positive.
    pub fn update(&mut self, x: f32, dt: f32, rate_limit: f32, accel_limit: f32) -> bool {
        let max_rate = rate_limit / DEGREES_PER_UNIT;
        let max_accel = accel_limit / DEGREES_PER_UNIT;
        let mut detected = false;

        let mut rate = (x - self.value) / dt;
        if rate.abs() > max_rate {
            rate = rate.clamp(-max_rate, max_rate);
            detected = true;
        }

        let mut accel = (rate - self.rate) / dt;
        // Only a speeding-up servo is capped; slowing down cannot wind up.
        if rate.abs() > self.rate.abs() && accel.abs() > max_accel {
            accel = accel.clamp(-max_accel, max_accel);
            detected = true;
        }

        self.rate += accel * dt;
        self.value += self.rate * dt;

        if !(self.value.is_finite() && self.rate.is_finite()) {
            warn!("servo tracker not finite, restarting at rest");
            self.reset_to(0.0);
        }

        detected
    }
}
