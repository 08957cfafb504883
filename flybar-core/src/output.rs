//! Actuator command sink trait and error types.

use core::future::Future;

use crate::axis::Axis;

/// Per-axis commands handed to the (external) mixer after one tick.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorCommand {
    /// Indexed by [`Axis::index`].
    pub axes: [f32; 3],
    /// Throttle after the governor, `[0, 1]`.
    pub throttle: f32,
}

impl ActuatorCommand {
    /// All axes centered, throttle closed.
    pub const IDLE: Self = Self {
        axes: [0.0; 3],
        throttle: 0.0,
    };

    #[inline]
    #[must_use]
    pub fn axis(&self, axis: Axis) -> f32 {
        self.axes[axis.index()]
    }
}

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Consumer not ready.
    NotReady,
}

/// Async sink for actuator commands.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ActuatorSink {
    /// Send one tick's commands.
    fn send(&mut self, command: &ActuatorCommand) -> impl Future<Output = Result<(), OutputError>>;
}
