//! Stateful PID primitive shared by every loop in this crate.
//!
//! The integral is accumulated already multiplied by `ki`, so scaling the
//! integral gain to zero freezes growth without dropping what has been
//! accumulated.

use core::f32::consts::PI;

use crate::settings::PidGains;

/// Per-term multipliers applied on top of the configured gains for a single
/// evaluation. Recomputed every tick, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainScaler {
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

impl GainScaler {
    pub const UNITY: Self = Self::uniform(1.0);

    /// Same scale on all three terms.
    #[inline]
    #[must_use]
    pub const fn uniform(scale: f32) -> Self {
        Self {
            p: scale,
            i: scale,
            d: scale,
        }
    }
}

/// Time constants below this are treated as "no filter".
const MIN_TAU: f32 = 1.0e-6;

/// First-order low-pass coefficient for time constant `tau` at step `dt`.
///
/// Returns 1.0 (pass-through) for a near-zero `tau`.
#[inline]
#[must_use]
pub fn tau_to_alpha(tau: f32, dt: f32) -> f32 {
    if tau < MIN_TAU {
        1.0
    } else {
        dt / (dt + tau)
    }
}

/// Integral, derivative history and gains for one loop.
#[derive(Clone, Debug, PartialEq)]
pub struct PidState {
    kp: f32,
    ki: f32,
    kd: f32,
    i_limit: f32,
    d_tau: f32,
    integral: f32,
    last_err: f32,
    last_der: f32,
}

impl PidState {
    /// A zeroed loop with all gains at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            i_limit: 0.0,
            d_tau: 0.0,
            integral: 0.0,
            last_err: 0.0,
            last_der: 0.0,
        }
    }

    /// Clear the integral and the derivative history. Gains are kept.
    pub fn zero(&mut self) {
        self.integral = 0.0;
        self.last_err = 0.0;
        self.last_der = 0.0;
    }

    /// Set the gains. `i_limit == 0.0` leaves the integral unbounded.
    pub fn configure(&mut self, kp: f32, ki: f32, kd: f32, i_limit: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
        self.i_limit = i_limit;
    }

    /// Set the derivative low-pass cut-off. `0.0` disables the filter.
    pub fn set_d_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.d_tau = if cutoff_hz > 0.0 {
            1.0 / (2.0 * PI * cutoff_hz)
        } else {
            0.0
        };
    }

    /// Load gains and derivative cut-off from a settings block.
    pub fn configure_gains(&mut self, gains: &PidGains) {
        self.configure(gains.kp, gains.ki, gains.kd, gains.i_limit);
        self.set_d_cutoff_hz(gains.d_cutoff_hz);
    }

    /// Accumulated integral term (already multiplied by `ki`).
    #[inline]
    #[must_use]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Multiply the integral by `factor`, clamped to `[0, 1]`.
    pub fn decay_integral(&mut self, factor: f32) {
        self.integral *= factor.clamp(0.0, 1.0);
        self.sanitize();
    }

    /// Run one step against `setpoint` and return the control output.
    ///
    /// `dt` must be positive; the caller is responsible for skipping ticks
    /// that violate this.
    pub fn apply_setpoint(
        &mut self,
        scaler: &GainScaler,
        setpoint: f32,
        measurement: f32,
        dt: f32,
        derivative_enabled: bool,
    ) -> f32 {
        let err = setpoint - measurement;

        self.integral += err * scaler.i * self.ki * dt;
        if self.i_limit > 0.0 {
            self.integral = self.integral.clamp(-self.i_limit, self.i_limit);
        }

        let mut dterm = 0.0;
        if derivative_enabled && self.kd != 0.0 && dt > 0.0 {
            let raw = scaler.d * self.kd * (err - self.last_err) / dt;
            dterm = self.last_der + tau_to_alpha(self.d_tau, dt) * (raw - self.last_der);
            self.last_der = dterm;
        }
        self.last_err = err;

        let output = err * scaler.p * self.kp + self.integral + dterm;
        self.sanitize();
        if output.is_finite() {
            output
        } else {
            warn!("pid output not finite, forcing 0");
            0.0
        }
    }

    /// Reset any non-finite history to zero so it cannot reach an actuator.
    fn sanitize(&mut self) {
        if !(self.integral.is_finite() && self.last_err.is_finite() && self.last_der.is_finite()) {
            warn!("pid state not finite, zeroing");
            self.zero();
        }
    }
}

impl Default for PidState {
    fn default() -> Self {
        Self::new()
    }
}
