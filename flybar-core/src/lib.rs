//! Platform-agnostic control law for a helicopter "virtual flybar" mode.
//!
//! The crate turns pilot stick commands and rate-gyro measurements into
//! per-axis servo commands, emulating the damping and feedforward of a
//! mechanical flybar, and trims throttle to hold rotor head speed.
//!
//! # Overview
//!
//! - [`pid`]: the PID primitive with per-term gain scaling
//! - [`saturation`]: servo rate/acceleration envelope tracker (tail anti-windup)
//! - [`cyclic`]: roll/pitch loops with amplitude gain scheduling and integral leak
//! - [`tail`]: yaw loop with torque feedforward and saturation-gated integral
//! - [`governor`]: head-speed governor
//! - [`rpm`]: lock-free RPM estimate fed from a capture interrupt
//! - [`flybar`]: per-axis dispatch ([`VirtualFlybar`])
//! - [`control_loop`]: async orchestration ([`FlybarLoop`])
//! - [`settings`]: tuning snapshot and its provider trait
//!
//! # Example
//!
//! ```rust
//! use flybar_core::{Axis, ControlView, ManualControlCommand, NullStatusSink, Settings, VirtualFlybar};
//!
//! let settings = Settings::DEFAULT;
//! let view = ControlView::new(&settings, ManualControlCommand::NEUTRAL);
//! let mut flybar = VirtualFlybar::new(NullStatusSink);
//!
//! // Stick centered, no rotation: nothing to correct.
//! let out = flybar.evaluate_axis(&view, Axis::Roll, 0.0, 0.0, 0.0025, true);
//! assert_eq!(out, 0.0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod axis;
pub mod control_loop;
pub mod cyclic;
pub mod flybar;
pub mod governor;
pub mod input;
pub mod output;
pub mod pid;
pub mod rpm;
pub mod saturation;
pub mod settings;
pub mod status;
pub mod tail;

// Re-export main types at crate root
pub use axis::Axis;
pub use control_loop::{FlybarLoop, LoopError};
pub use flybar::{ControlView, VirtualFlybar};
pub use governor::{Governor, GovernorOutput};
pub use input::{GyroSample, InputError, ManualControlCommand, ManualControlSource, RateGyroSource};
pub use output::{ActuatorCommand, ActuatorSink, OutputError};
pub use pid::{GainScaler, PidState};
pub use rpm::{RpmEstimator, DEADTIME_US};
pub use settings::{
    AxisRates, CyclicSettings, GovernorSettings, PidGains, Settings, SettingsError, SettingsProvider,
    TailSettings,
};
pub use status::{NullStatusSink, StatusReport, StatusSink};
