//! Per-axis dispatch and the governor entry point.
//!
//! [`VirtualFlybar`] owns every piece of control state the virtual flybar
//! mode needs: two cyclic loops, the tail loop and the governor. Settings
//! and the pilot command are not cached; the caller passes a fresh
//! [`ControlView`] on every call.

use crate::axis::Axis;
use crate::cyclic::CyclicAxis;
use crate::governor::Governor;
use crate::input::ManualControlCommand;
use crate::settings::Settings;
use crate::status::{StatusReport, StatusSink};
use crate::tail::TailAxis;

/// Read-only inputs shared by all axes for one tick.
#[derive(Clone, Copy, Debug)]
pub struct ControlView<'a> {
    pub settings: &'a Settings,
    /// Pilot sticks, used for the tail feedforward.
    pub manual: ManualControlCommand,
}

impl<'a> ControlView<'a> {
    pub fn new(settings: &'a Settings, manual: ManualControlCommand) -> Self {
        Self { settings, manual }
    }
}

#[inline]
fn valid_dt(dt: f32) -> bool {
    dt > 0.0 && dt.is_finite()
}

/// The virtual flybar control law.
///
/// Ticks with a non-positive or non-finite `dt` are skipped and return the
/// previous output for that axis (or for the governor).
pub struct VirtualFlybar<S> {
    roll: CyclicAxis,
    pitch: CyclicAxis,
    yaw: TailAxis,
    governor: Governor,
    last_axes: [f32; 3],
    last_throttle: f32,
    status: S,
}

impl<S: StatusSink> VirtualFlybar<S> {
    pub const fn new(status: S) -> Self {
        Self {
            roll: CyclicAxis::new(),
            pitch: CyclicAxis::new(),
            yaw: TailAxis::new(),
            governor: Governor::new(),
            last_axes: [0.0; 3],
            last_throttle: 0.0,
            status,
        }
    }

    /// Evaluate one axis for one tick.
    ///
    /// With `reinit` set the axis's loop state is zeroed first; other axes
    /// are untouched.
    pub fn evaluate_axis(
        &mut self,
        view: &ControlView<'_>,
        axis: Axis,
        command: f32,
        gyro_rate: f32,
        dt: f32,
        reinit: bool,
    ) -> f32 {
        if reinit {
            self.reset_axis(axis, command);
        }
        if !valid_dt(dt) {
            warn!("{}: skipping tick with dt {}", axis, dt);
            return self.last_axes[axis.index()];
        }

        let settings = view.settings;
        let rates = settings.rates(axis);
        let output = match axis {
            Axis::Roll => self
                .roll
                .evaluate(rates, &settings.cyclic, command, gyro_rate, dt),
            Axis::Pitch => self
                .pitch
                .evaluate(rates, &settings.cyclic, command, gyro_rate, dt),
            Axis::Yaw => self.yaw.evaluate(
                rates,
                &settings.tail,
                &view.manual,
                command,
                gyro_rate,
                dt,
            ),
        };

        self.last_axes[axis.index()] = output;
        self.status.publish(&StatusReport::AxisIntegral {
            axis,
            integral: self.integral(axis),
        });
        output
    }

    /// [`evaluate_axis`](Self::evaluate_axis) by raw axis index. Indices
    /// outside roll/pitch/yaw return 0.
    pub fn evaluate_axis_index(
        &mut self,
        view: &ControlView<'_>,
        index: usize,
        command: f32,
        gyro_rate: f32,
        dt: f32,
        reinit: bool,
    ) -> f32 {
        match Axis::from_index(index) {
            Some(axis) => self.evaluate_axis(view, axis, command, gyro_rate, dt, reinit),
            None => {
                warn!("unknown axis index {}", index);
                0.0
            }
        }
    }

    /// Trim `throttle_command` to hold the configured head speed.
    ///
    /// `sensor_rpm` is the estimator reading polled for this tick. A reinit
    /// restarts from the pilot's throttle, which is also what a skipped
    /// reinit tick returns.
    pub fn evaluate_governor(
        &mut self,
        settings: &Settings,
        sensor_rpm: f32,
        throttle_command: f32,
        dt: f32,
        reinit: bool,
    ) -> f32 {
        if reinit {
            self.governor.reset();
            self.last_throttle = throttle_command;
        }
        if !valid_dt(dt) {
            warn!("governor: skipping tick with dt {}", dt);
            return self.last_throttle;
        }

        let out = self
            .governor
            .evaluate(&settings.governor, sensor_rpm, throttle_command, dt);

        self.last_throttle = out.throttle;
        self.status.publish(&StatusReport::Governor {
            head_speed: out.head_speed,
            integral: self.governor.integral(),
            engaged: out.engaged,
        });
        out.throttle
    }

    fn reset_axis(&mut self, axis: Axis, command: f32) {
        match axis {
            Axis::Roll => self.roll.reset(),
            Axis::Pitch => self.pitch.reset(),
            Axis::Yaw => self.yaw.reset(command),
        }
        self.last_axes[axis.index()] = 0.0;
    }

    /// Integral accumulator of one axis.
    #[must_use]
    pub fn integral(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Roll => self.roll.integral(),
            Axis::Pitch => self.pitch.integral(),
            Axis::Yaw => self.yaw.integral(),
        }
    }

    /// Output of the last evaluated tick of one axis.
    #[must_use]
    pub fn last_output(&self, axis: Axis) -> f32 {
        self.last_axes[axis.index()]
    }

    pub fn governor(&self) -> &Governor {
        &self.governor
    }

    pub fn tail(&self) -> &TailAxis {
        &self.yaw
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut S {
        &mut self.status
    }

    pub fn into_status(self) -> S {
        self.status
    }
}

impl<S: StatusSink + Default> Default for VirtualFlybar<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
