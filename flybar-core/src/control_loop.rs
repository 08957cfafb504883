//! FlybarLoop: paces the control law from a gyro source and forwards the
//! result to an actuator sink.

use crate::axis::Axis;
use crate::flybar::{ControlView, VirtualFlybar};
use crate::input::{InputError, ManualControlSource, RateGyroSource};
use crate::output::{ActuatorCommand, ActuatorSink, OutputError};
use crate::rpm::RpmEstimator;
use crate::settings::SettingsProvider;
use crate::status::StatusSink;

/// Seconds between two wrapping microsecond timestamps. Out-of-order samples
/// come out negative.
#[inline]
fn elapsed_seconds(from_us: u32, to_us: u32) -> f32 {
    to_us.wrapping_sub(from_us) as i32 as f32 * 1.0e-6
}

/// Runs one control tick per gyro sample.
///
/// Each tick reads a fresh settings snapshot and pilot command, polls the
/// RPM estimator at the sample timestamp, evaluates all three axes and the
/// governor, and sends the resulting [`ActuatorCommand`].
///
/// # Error Handling
///
/// A gyro error skips the tick: nothing is sent and the sink keeps the
/// previous command. A later sample is timed against the last good one.
pub struct FlybarLoop<'r, G, M, P, O, S> {
    gyro: G,
    manual: M,
    settings: P,
    output: O,
    rpm: &'r RpmEstimator,
    flybar: VirtualFlybar<S>,
    last_timestamp_us: Option<u32>,
    reinit_pending: bool,
}

impl<'r, G, M, P, O, S> FlybarLoop<'r, G, M, P, O, S>
where
    G: RateGyroSource,
    M: ManualControlSource,
    P: SettingsProvider,
    O: ActuatorSink,
    S: StatusSink,
{
    /// Create a new loop. The first tick reinitializes every axis.
    pub fn new(
        gyro: G,
        manual: M,
        settings: P,
        output: O,
        rpm: &'r RpmEstimator,
        status: S,
    ) -> Self {
        Self {
            gyro,
            manual,
            settings,
            output,
            rpm,
            flybar: VirtualFlybar::new(status),
            last_timestamp_us: None,
            reinit_pending: true,
        }
    }

    /// Run the loop indefinitely.
    ///
    /// This method never returns under normal operation.
    pub async fn run(&mut self) -> ! {
        loop {
            let _ = self.process_one().await;
        }
    }

    /// Zero all loop state on the next tick, e.g. on entering the mode or
    /// after the gyro link drops.
    ///
    /// The next sample only seeds the clock, like the first one, so a gap in
    /// the sample stream never becomes one long `dt`.
    pub fn request_reinit(&mut self) {
        self.reinit_pending = true;
        self.last_timestamp_us = None;
    }

    /// Wait for one gyro sample, run one tick and send the result.
    ///
    /// Returns the command that was sent.
    pub async fn process_one(&mut self) -> Result<ActuatorCommand, LoopError> {
        let sample = match self.gyro.receive().await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("gyro input error: {}", e);
                return Err(LoopError::Input(e));
            }
        };

        let dt = match self.last_timestamp_us {
            Some(prev) => elapsed_seconds(prev, sample.timestamp_us),
            None => 0.0,
        };
        self.last_timestamp_us = Some(sample.timestamp_us);
        let reinit = core::mem::take(&mut self.reinit_pending);

        let settings = self.settings.settings();
        let manual = self.manual.manual_control();
        let view = ControlView::new(&settings, manual);

        let mut command = ActuatorCommand::IDLE;
        for axis in Axis::ALL {
            command.axes[axis.index()] = self.flybar.evaluate_axis(
                &view,
                axis,
                manual.axis(axis),
                sample.rate(axis),
                dt,
                reinit,
            );
        }

        let rpm = self.rpm.rpm(sample.timestamp_us);
        command.throttle = self
            .flybar
            .evaluate_governor(&settings, rpm, manual.throttle, dt, reinit);

        self.output
            .send(&command)
            .await
            .map_err(LoopError::Output)?;
        Ok(command)
    }

    pub fn flybar(&self) -> &VirtualFlybar<S> {
        &self.flybar
    }

    pub fn gyro(&self) -> &G {
        &self.gyro
    }

    pub fn gyro_mut(&mut self) -> &mut G {
        &mut self.gyro
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the loop into its collaborators.
    pub fn into_parts(self) -> (G, M, P, O, S) {
        (
            self.gyro,
            self.manual,
            self.settings,
            self.output,
            self.flybar.into_status(),
        )
    }
}

/// Error type for one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopError {
    /// Error from the gyro source.
    Input(InputError),
    /// Error from the actuator sink.
    Output(OutputError),
}
