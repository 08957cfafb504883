//! Pilot command and rate-gyro input types, source traits and error types.

use core::future::Future;

use crate::axis::Axis;

/// Instantaneous pilot stick positions.
///
/// Roll, pitch, yaw and collective are normalized to `[-1, 1]`; throttle to
/// `[0, 1]`.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ManualControlCommand {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub collective: f32,
    pub throttle: f32,
}

impl ManualControlCommand {
    /// Sticks centered, collective at mid, throttle closed.
    pub const NEUTRAL: Self = Self {
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
        collective: 0.0,
        throttle: 0.0,
    };

    /// Stick command for one axis.
    #[inline]
    #[must_use]
    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
        }
    }
}

/// One rate-gyro measurement.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroSample {
    /// Body rates in deg/s, indexed by [`Axis::index`].
    pub rates: [f32; 3],
    /// Sample time in microseconds (wrapping).
    pub timestamp_us: u32,
}

impl GyroSample {
    #[inline]
    #[must_use]
    pub fn rate(&self, axis: Axis) -> f32 {
        self.rates[axis.index()]
    }
}

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// Protocol parsing error (invalid format).
    Parse,
    /// Checksum mismatch.
    Checksum,
    /// Connection lost / timeout.
    Disconnected,
}

/// Async source of rate-gyro samples. Each sample paces one control tick.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait RateGyroSource {
    /// Wait for and receive the next gyro sample.
    fn receive(&mut self) -> impl Future<Output = Result<GyroSample, InputError>>;

    /// Check if the source is connected/ready.
    fn is_connected(&self) -> bool;
}

/// Read-only view of the latest pilot command.
pub trait ManualControlSource {
    fn manual_control(&self) -> ManualControlCommand;
}

impl ManualControlSource for ManualControlCommand {
    #[inline]
    fn manual_control(&self) -> ManualControlCommand {
        *self
    }
}

impl<M: ManualControlSource + ?Sized> ManualControlSource for &M {
    #[inline]
    fn manual_control(&self) -> ManualControlCommand {
        (**self).manual_control()
    }
}
