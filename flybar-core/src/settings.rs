//! Tuning snapshot consumed by the control law.
//!
//! The control law never caches settings across ticks: every evaluation is
//! handed a fresh [`Settings`] value by a [`SettingsProvider`]. Sequencing
//! writers against the control task is the provider's job.

use crate::axis::Axis;

/// PID gains for a single loop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Integral bound (absolute). `0.0` leaves the integral unbounded.
    pub i_limit: f32,
    /// Derivative low-pass cut-off in Hz. `0.0` disables the filter.
    pub d_cutoff_hz: f32,
}

impl PidGains {
    #[must_use]
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            i_limit: 0.0,
            d_cutoff_hz: 0.0,
        }
    }

    #[must_use]
    pub const fn with_i_limit(mut self, i_limit: f32) -> Self {
        self.i_limit = i_limit;
        self
    }

    #[must_use]
    pub const fn with_d_cutoff_hz(mut self, d_cutoff_hz: f32) -> Self {
        self.d_cutoff_hz = d_cutoff_hz;
        self
    }
}

/// Stick-to-rate scaling for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisRates {
    /// Rate (deg/s) commanded by a full stick deflection.
    pub manual_rate: f32,
    /// Hard bound (deg/s) on the rate setpoint.
    pub max_rate: f32,
    /// Inner rate-loop gains.
    pub pid: PidGains,
}

/// Roll/pitch tuning, shared by both cyclic axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CyclicSettings {
    /// Fraction of the raw command injected directly as feedforward.
    pub setpoint_weight: f32,
    /// Integral leak time constant in seconds.
    pub decay: f32,
    /// Amplitude suppression coefficient: gains scale by `1 - a * |command|`.
    pub a: f32,
}

/// Yaw tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TailSettings {
    pub setpoint_weight: f32,
    /// Integral leak time constant. Carried for tuning compatibility; the tail
    /// relies on saturation gating instead of a leak.
    pub decay: f32,
    /// Gain applied to `|collective|` to cancel main-rotor torque.
    pub collective_feedforward: f32,
    /// Gain applied to `|roll| + |pitch|`. Off (`0.0`) by default.
    pub cyclic_feedforward: f32,
    /// Servo rate limit in deg/s.
    pub servo_rate_limit: f32,
    /// Servo acceleration limit in deg/s^2.
    pub servo_accel_limit: f32,
    /// Proportional scale applied while the servo envelope is exceeded.
    pub stop_gain: f32,
}

/// Head-speed governor tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GovernorSettings {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Bound on the accumulated throttle correction. `0.0` leaves it unbounded.
    pub i_limit: f32,
    /// Desired rotor head speed in RPM. Below `1e-4` the governor is off.
    pub head_speed: f32,
    /// Sensor-shaft to rotor-head gear ratio.
    pub gear_ratio: f32,
    /// Pulses per sensor-shaft revolution.
    pub sensor_scale: f32,
}

/// Complete tuning snapshot for one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Indexed by [`Axis::index`].
    pub rates: [AxisRates; 3],
    pub cyclic: CyclicSettings,
    pub tail: TailSettings,
    pub governor: GovernorSettings,
}

/// Validation failure for a settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// A field is NaN or infinite.
    NotFinite,
    /// A rate, limit or time constant is negative.
    Negative,
    /// Gear ratio or sensor scale is zero while a head speed is set.
    ZeroGovernorScale,
}

impl Settings {
    /// Conservative defaults: governor off, no cross-feed, moderate rates.
    pub const DEFAULT: Self = Self {
        rates: [
            AxisRates {
                manual_rate: 220.0,
                max_rate: 300.0,
                pid: PidGains::new(0.003, 0.003, 0.00002).with_i_limit(0.3),
            },
            AxisRates {
                manual_rate: 220.0,
                max_rate: 300.0,
                pid: PidGains::new(0.003, 0.003, 0.00002).with_i_limit(0.3),
            },
            AxisRates {
                manual_rate: 300.0,
                max_rate: 500.0,
                pid: PidGains::new(0.004, 0.004, 0.00003).with_i_limit(0.5),
            },
        ],
        cyclic: CyclicSettings {
            setpoint_weight: 0.3,
            decay: 2.0,
            a: 0.2,
        },
        tail: TailSettings {
            setpoint_weight: 0.1,
            decay: 0.0,
            collective_feedforward: 0.15,
            cyclic_feedforward: 0.0,
            servo_rate_limit: 600.0,
            servo_accel_limit: 20_000.0,
            stop_gain: 0.5,
        },
        governor: GovernorSettings {
            kp: 0.0005,
            ki: 0.0002,
            kd: 0.0,
            i_limit: 0.2,
            head_speed: 0.0,
            gear_ratio: 1.0,
            sensor_scale: 1.0,
        },
    };

    /// Rates block for one axis.
    #[inline]
    #[must_use]
    pub fn rates(&self, axis: Axis) -> &AxisRates {
        &self.rates[axis.index()]
    }

    /// Check that the snapshot is safe to hand to the control law.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for rates in &self.rates {
            check_non_negative(&[rates.manual_rate, rates.max_rate])?;
            check_finite(&[rates.pid.kp, rates.pid.ki, rates.pid.kd])?;
            check_non_negative(&[rates.pid.i_limit, rates.pid.d_cutoff_hz])?;
        }

        check_finite(&[self.cyclic.setpoint_weight, self.cyclic.a])?;
        check_non_negative(&[self.cyclic.decay])?;

        let tail = &self.tail;
        check_finite(&[
            tail.setpoint_weight,
            tail.collective_feedforward,
            tail.cyclic_feedforward,
            tail.stop_gain,
        ])?;
        check_non_negative(&[tail.decay, tail.servo_rate_limit, tail.servo_accel_limit])?;

        let gov = &self.governor;
        check_finite(&[gov.kp, gov.ki, gov.kd])?;
        check_non_negative(&[gov.i_limit, gov.head_speed, gov.gear_ratio, gov.sensor_scale])?;
        if gov.head_speed > 0.0 && (gov.gear_ratio == 0.0 || gov.sensor_scale == 0.0) {
            return Err(SettingsError::ZeroGovernorScale);
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_finite(values: &[f32]) -> Result<(), SettingsError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SettingsError::NotFinite)
    }
}

fn check_non_negative(values: &[f32]) -> Result<(), SettingsError> {
    check_finite(values)?;
    if values.iter().all(|&v| v >= 0.0) {
        Ok(())
    } else {
        Err(SettingsError::Negative)
    }
}

/// Source of the settings snapshot, read once per control tick.
pub trait SettingsProvider {
    fn settings(&self) -> Settings;
}

impl SettingsProvider for Settings {
    #[inline]
    fn settings(&self) -> Settings {
        *self
    }
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for &P {
    #[inline]
    fn settings(&self) -> Settings {
        (**self).settings()
    }
}
