//! Roll and pitch: feedforward plus amplitude-scheduled rate feedback with a
//! leaky integral.

use crate::pid::{GainScaler, PidState};
use crate::settings::{AxisRates, CyclicSettings};

/// Feedback gain scale for a command of the given amplitude.
///
/// Large stick inputs relax feedback authority in favour of the pilot.
#[inline]
#[must_use]
pub fn amplitude_suppression(command: f32, a: f32) -> f32 {
    (1.0 - a * command.abs()).clamp(0.0, 1.0)
}

/// Integral retention factor for one tick of a first-order leak with time
/// constant `decay` seconds.
#[inline]
#[must_use]
pub fn decay_factor(decay: f32, dt: f32) -> f32 {
    let denom = decay + dt;
    if denom > 0.0 {
        (decay / denom).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One cyclic axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CyclicAxis {
    pid: PidState,
}

impl CyclicAxis {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pid: PidState::new(),
        }
    }

    pub fn reset(&mut self) {
        self.pid.zero();
    }

    #[inline]
    #[must_use]
    pub fn integral(&self) -> f32 {
        self.pid.integral()
    }

    /// Evaluate one tick. `dt` must be positive.
    pub fn evaluate(
        &mut self,
        rates: &AxisRates,
        cyclic: &CyclicSettings,
        command: f32,
        gyro_rate: f32,
        dt: f32,
    ) -> f32 {
        let scaler = GainScaler::uniform(amplitude_suppression(command, cyclic.a));

        self.pid.configure_gains(&rates.pid);
        self.pid.decay_integral(decay_factor(cyclic.decay, dt));

        let feedforward = command * cyclic.setpoint_weight;

        let setpoint = (command * rates.manual_rate).clamp(-rates.max_rate, rates.max_rate);
        let feedback = self
            .pid
            .apply_setpoint(&scaler, setpoint, gyro_rate, dt, true);

        feedforward + feedback
    }
}
