//! Status reports published once per tick for telemetry.
//!
//! Publishing is fire-and-forget: a sink that cannot deliver drops the
//! report and the control law carries on.

use crate::axis::Axis;

/// Telemetry emitted by the control law.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusReport {
    /// Integral accumulator of one axis after its tick.
    AxisIntegral { axis: Axis, integral: f32 },
    /// Governor measurement and integral after its tick.
    Governor {
        /// Measured rotor head speed in RPM.
        head_speed: f32,
        integral: f32,
        engaged: bool,
    },
}

/// Write-only telemetry sink.
pub trait StatusSink {
    fn publish(&mut self, report: &StatusReport);
}

/// Sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    #[inline]
    fn publish(&mut self, _report: &StatusReport) {}
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    #[inline]
    fn publish(&mut self, report: &StatusReport) {
        (**self).publish(report);
    }
}
