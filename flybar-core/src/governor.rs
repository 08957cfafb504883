//! Rotor head-speed governor.
//!
//! Trims the pilot's throttle to hold the configured head speed. Whether the
//! governor acts is decided from scratch every tick; there is no latched
//! mode.

use crate::pid::{GainScaler, PidState};
use crate::settings::GovernorSettings;

/// Desired head speeds below this mean "governor off".
pub const MIN_HEAD_SPEED: f32 = 1.0e-4;

/// Throttle below which the governor stays out of the way.
pub const ARMING_THROTTLE: f32 = 0.50;

/// The rotor must be at least this fraction of target speed before the
/// governor engages, so it never fights a spool-up.
pub const ENGAGE_SPEED_RATIO: f32 = 0.70;

/// Engaged output never drops below this.
pub const MIN_THROTTLE: f32 = 0.30;
pub const MAX_THROTTLE: f32 = 1.0;

/// Convert a sensor RPM reading to rotor head speed.
///
/// A zero gear ratio or sensor scale yields 0 (governor bypassed).
#[inline]
#[must_use]
pub fn head_speed(sensor_rpm: f32, settings: &GovernorSettings) -> f32 {
    let divisor = settings.gear_ratio * settings.sensor_scale;
    if divisor > 0.0 {
        sensor_rpm / divisor
    } else {
        0.0
    }
}

/// Engagement test for one tick.
#[inline]
#[must_use]
pub fn should_engage(throttle_command: f32, current: f32, desired: f32) -> bool {
    desired >= MIN_HEAD_SPEED
        && throttle_command >= ARMING_THROTTLE
        && current / desired >= ENGAGE_SPEED_RATIO
}

/// Result of one governor tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GovernorOutput {
    pub throttle: f32,
    pub head_speed: f32,
    pub engaged: bool,
}

/// Which end of the throttle range the last engaged tick was clamped to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Pinned {
    #[default]
    None,
    Low,
    High,
}

/// Governor loop state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Governor {
    pid: PidState,
    was_engaged: bool,
    pinned: Pinned,
}

impl Governor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pid: PidState::new(),
            was_engaged: false,
            pinned: Pinned::None,
        }
    }

    pub fn reset(&mut self) {
        self.pid.zero();
        self.pinned = Pinned::None;
    }

    #[inline]
    #[must_use]
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    /// Evaluate one tick from the pilot's throttle and the raw sensor RPM.
    /// `dt` must be positive.
    pub fn evaluate(
        &mut self,
        settings: &GovernorSettings,
        sensor_rpm: f32,
        throttle_command: f32,
        dt: f32,
    ) -> GovernorOutput {
        let current = head_speed(sensor_rpm, settings);
        let desired = settings.head_speed;
        let engaged = should_engage(throttle_command, current, desired);

        if engaged != self.was_engaged {
            debug!("governor engaged: {} at {} rpm", engaged, current);
            self.was_engaged = engaged;
        }

        if !engaged {
            self.pinned = Pinned::None;
            return GovernorOutput {
                throttle: throttle_command,
                head_speed: current,
                engaged,
            };
        }

        // No integration further into a clamp the output is already pinned at.
        let err = desired - current;
        let winding_up = match self.pinned {
            Pinned::High => err > 0.0,
            Pinned::Low => err < 0.0,
            Pinned::None => false,
        };
        let scaler = if winding_up {
            GainScaler {
                i: 0.0,
                ..GainScaler::UNITY
            }
        } else {
            GainScaler::UNITY
        };

        self.pid
            .configure(settings.kp, settings.ki, settings.kd, settings.i_limit);
        let adjustment = self.pid.apply_setpoint(&scaler, desired, current, dt, true);

        let raw = throttle_command + adjustment;
        self.pinned = if raw >= MAX_THROTTLE {
            Pinned::High
        } else if raw <= MIN_THROTTLE {
            Pinned::Low
        } else {
            Pinned::None
        };

        GovernorOutput {
            throttle: raw.clamp(MIN_THROTTLE, MAX_THROTTLE),
            head_speed: current,
            engaged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.0025;

    fn settings(head_speed: f32) -> GovernorSettings {
        GovernorSettings {
            kp: 0.001,
            ki: 0.0005,
            kd: 0.0,
            i_limit: 0.0,
            head_speed,
            gear_ratio: 1.0,
            sensor_scale: 1.0,
        }
    }

    #[test]
    fn test_bypass_when_unset() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(0.0), 1000.0, 0.8, DT);
        assert!(!out.engaged);
        assert_eq!(out.throttle, 0.8);
    }

    #[test]
    fn test_bypass_below_arming_throttle() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(1000.0), 900.0, 0.49, DT);
        assert!(!out.engaged);
        assert_eq!(out.throttle, 0.49);
    }

    #[test]
    fn test_engages_at_arming_throttle() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(1000.0), 900.0, 0.50, DT);
        assert!(out.engaged);
        assert!(out.throttle != 0.50);
        // 100 rpm short: positive correction.
        assert!(out.throttle > 0.50);
    }

    #[test]
    fn test_bypass_during_spool_up() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(1000.0), 699.0, 0.9, DT);
        assert!(!out.engaged);
        assert_eq!(out.throttle, 0.9);

        let out = gov.evaluate(&settings(1000.0), 700.0, 0.9, DT);
        assert!(out.engaged);
    }

    #[test]
    fn test_stale_rpm_disengages() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(1000.0), 0.0, 0.7, DT);
        assert!(!out.engaged);
        assert_eq!(out.throttle, 0.7);
    }

    #[test]
    fn test_output_floor() {
        let mut gov = Governor::new();
        // Massive overspeed drives a large negative correction.
        for throttle in [0.5, 0.6, 0.8, 1.0] {
            let out = gov.evaluate(&settings(1000.0), 50_000.0, throttle, DT);
            assert!(out.engaged);
            assert!(out.throttle >= MIN_THROTTLE);
            assert!(out.throttle <= MAX_THROTTLE);
        }
        assert_eq!(
            gov.evaluate(&settings(1000.0), 50_000.0, 0.5, DT).throttle,
            MIN_THROTTLE
        );
    }

    #[test]
    fn test_head_speed_conversion() {
        let mut s = settings(1000.0);
        s.gear_ratio = 10.0;
        s.sensor_scale = 2.0;
        assert_eq!(head_speed(40_000.0, &s), 2000.0);

        s.gear_ratio = 0.0;
        assert_eq!(head_speed(40_000.0, &s), 0.0);
    }

    #[test]
    fn test_on_speed_holds_throttle() {
        let mut gov = Governor::new();
        let out = gov.evaluate(&settings(1000.0), 1000.0, 0.7, DT);
        assert!(out.engaged);
        assert_eq!(out.throttle, 0.7);
    }

    #[test]
    fn test_reset_clears_integral() {
        let mut gov = Governor::new();
        for _ in 0..100 {
            gov.evaluate(&settings(1000.0), 900.0, 0.7, DT);
        }
        assert!(gov.integral() > 0.0);
        gov.reset();
        assert_eq!(gov.integral(), 0.0);
    }

    #[test]
    fn test_integral_bounded_by_i_limit() {
        let mut s = settings(1000.0);
        s.ki = 0.5;
        s.i_limit = 0.2;
        let mut gov = Governor::new();
        for _ in 0..200 {
            let out = gov.evaluate(&s, 990.0, 0.5, DT);
            assert!(out.throttle < MAX_THROTTLE);
        }
        assert_eq!(gov.integral(), 0.2);
    }

    #[test]
    fn test_no_windup_while_pinned_at_full_throttle() {
        let mut s = settings(1000.0);
        s.kp = 0.0005;
        s.ki = 0.0002;
        let mut gov = Governor::new();

        // Bogged rotor: output sits at full throttle for 20 s.
        for _ in 0..8000 {
            let out = gov.evaluate(&s, 750.0, 0.9, DT);
            assert_eq!(out.throttle, MAX_THROTTLE);
        }
        assert!(gov.integral() < 0.01);

        // 10% overspeed must pull throttle off the stop straight away.
        let out = gov.evaluate(&s, 1100.0, 0.9, DT);
        assert!(out.engaged);
        assert!(out.throttle < MAX_THROTTLE);
    }

    #[test]
    fn test_integral_unwinds_after_pinned_low() {
        let mut s = settings(1000.0);
        s.ki = 0.01;
        let mut gov = Governor::new();
        for _ in 0..100 {
            assert_eq!(gov.evaluate(&s, 5000.0, 0.5, DT).throttle, MIN_THROTTLE);
        }
        let frozen = gov.integral();
        // Back under speed: integration resumes upward.
        gov.evaluate(&s, 900.0, 0.5, DT);
        assert!(gov.integral() > frozen);
    }
}
