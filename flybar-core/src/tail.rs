//! Yaw: torque feedforward plus rate feedback whose integral is gated by the
//! servo envelope tracker.

use crate::input::ManualControlCommand;
use crate::pid::{GainScaler, PidState};
use crate::saturation::RateAccelTracker;
use crate::settings::{AxisRates, TailSettings};

/// The tail rotor loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TailAxis {
    pid: PidState,
    tracker: RateAccelTracker,
    saturated: bool,
}

impl TailAxis {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pid: PidState::new(),
            tracker: RateAccelTracker::new(),
            saturated: false,
        }
    }

    /// Zero the loop and restart the servo envelope at rest on `command`.
    pub fn reset(&mut self, command: f32) {
        self.pid.zero();
        self.tracker.reset_to(command);
        self.saturated = false;
    }

    #[inline]
    #[must_use]
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    /// Whether the last tick exceeded the servo envelope.
    #[inline]
    #[must_use]
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Scaler for the feedback loop given the envelope state.
    #[inline]
    #[must_use]
    pub fn scaler(saturated: bool, stop_gain: f32) -> GainScaler {
        if saturated {
            GainScaler {
                p: stop_gain,
                i: 0.0,
                d: 0.0,
            }
        } else {
            GainScaler::UNITY
        }
    }

    /// Feedforward from the pilot's collective and, when enabled, cyclic
    /// sticks plus the weighted yaw command.
    #[must_use]
    pub fn feedforward(tail: &TailSettings, manual: &ManualControlCommand, command: f32) -> f32 {
        let collective = manual.collective.abs() * tail.collective_feedforward;
        let cyclic = (manual.roll.abs() + manual.pitch.abs()) * tail.cyclic_feedforward;
        collective + cyclic + tail.setpoint_weight * command
    }

    /// Evaluate one tick. `dt` must be positive.
    pub fn evaluate(
        &mut self,
        rates: &AxisRates,
        tail: &TailSettings,
        manual: &ManualControlCommand,
        command: f32,
        gyro_rate: f32,
        dt: f32,
    ) -> f32 {
        self.saturated = self
            .tracker
            .update(command, dt, tail.servo_rate_limit, tail.servo_accel_limit);
        let scaler = Self::scaler(self.saturated, tail.stop_gain);

        self.pid.configure_gains(&rates.pid);
        let setpoint = (command * rates.manual_rate).clamp(-rates.max_rate, rates.max_rate);
        let feedback = self
            .pid
            .apply_setpoint(&scaler, setpoint, gyro_rate, dt, true);

        Self::feedforward(tail, manual, command) + feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PidGains, Settings};

    const DT: f32 = 0.0025;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-5 * (1.0 + a.abs().max(b.abs()))
    }

    fn tail() -> TailSettings {
        TailSettings {
            setpoint_weight: 0.2,
            decay: 0.0,
            collective_feedforward: 0.5,
            cyclic_feedforward: 0.0,
            servo_rate_limit: 600.0,
            servo_accel_limit: 20_000.0,
            stop_gain: 0.25,
        }
    }

    fn rates() -> AxisRates {
        AxisRates {
            manual_rate: 300.0,
            max_rate: 500.0,
            pid: PidGains::new(0.002, 0.01, 0.0),
        }
    }

    #[test]
    fn test_collective_feedforward_uses_magnitude() {
        let tail = tail();
        let up = ManualControlCommand {
            collective: 0.6,
            ..ManualControlCommand::NEUTRAL
        };
        let down = ManualControlCommand {
            collective: -0.6,
            ..ManualControlCommand::NEUTRAL
        };
        assert!(close(TailAxis::feedforward(&tail, &up, 0.0), 0.3));
        assert!(close(TailAxis::feedforward(&tail, &down, 0.0), 0.3));
        assert!(close(TailAxis::feedforward(&tail, &up, 0.5), 0.4));
    }

    #[test]
    fn test_cyclic_cross_feed_off_by_default() {
        let settings = Settings::DEFAULT;
        let manual = ManualControlCommand {
            roll: 1.0,
            pitch: -1.0,
            ..ManualControlCommand::NEUTRAL
        };
        assert_eq!(TailAxis::feedforward(&settings.tail, &manual, 0.0), 0.0);

        let mut tail = settings.tail;
        tail.cyclic_feedforward = 0.1;
        assert!(close(TailAxis::feedforward(&tail, &manual, 0.0), 0.2));
    }

    #[test]
    fn test_quiet_stick_runs_full_gains() {
        let mut axis = TailAxis::new();
        let manual = ManualControlCommand::NEUTRAL;
        for _ in 0..10 {
            axis.evaluate(&rates(), &tail(), &manual, 0.0, 10.0, DT);
            assert!(!axis.saturated());
        }
        // err = -10 deg/s for 10 ticks.
        assert!(close(axis.integral(), -10.0 * 0.01 * DT * 10.0));
    }

    #[test]
    fn test_stick_slam_freezes_integral() {
        let mut axis = TailAxis::new();
        let manual = ManualControlCommand::NEUTRAL;
        axis.evaluate(&rates(), &tail(), &manual, 0.0, 10.0, DT);
        let before = axis.integral();

        let out = axis.evaluate(&rates(), &tail(), &manual, 1.0, 0.0, DT);
        assert!(axis.saturated());
        assert_eq!(axis.integral(), before);

        // Proportional at stop gain, no integral growth, derivative off.
        let err = 300.0;
        let expected = 0.2 * 1.0 + err * 0.25 * 0.002 + before;
        assert!(close(out, expected), "{} != {}", out, expected);
    }

    #[test]
    fn test_integral_resumes_after_servo_catches_up() {
        let mut axis = TailAxis::new();
        let manual = ManualControlCommand::NEUTRAL;
        let mut saturated_ticks = 0;
        for _ in 0..200 {
            axis.evaluate(&rates(), &tail(), &manual, 1.0, 0.0, DT);
            if axis.saturated() {
                saturated_ticks += 1;
            }
        }
        assert!(saturated_ticks > 0);
        assert!(saturated_ticks < 200);
        assert!(!axis.saturated());
        assert!(axis.integral() > 0.0);
    }

    #[test]
    fn test_reset_seeds_tracker_at_command() {
        let mut axis = TailAxis::new();
        let manual = ManualControlCommand::NEUTRAL;
        axis.evaluate(&rates(), &tail(), &manual, 0.0, 10.0, DT);
        axis.reset(0.8);
        assert_eq!(axis.integral(), 0.0);
        // Holding the deflected stick right after reset is not a slam.
        axis.evaluate(&rates(), &tail(), &manual, 0.8, 0.0, DT);
        assert!(!axis.saturated());
    }
}
