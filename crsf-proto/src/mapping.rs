//! Channel-to-stick mapping configuration.
//!
//! CRSF provides 16 RC channels (0-15) with 11-bit resolution. Receivers
//! send 172..=1811 for a 988..=2012 µs stick throw, centered on 992. This
//! module maps those channels to the pilot's [`ManualControlCommand`].

use flybar_core::ManualControlCommand;

/// Channel mapping configuration for CRSF to pilot command conversion.
///
/// Customize this at compile-time by creating your own const.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMapping {
    /// Channel index for roll (aileron).
    pub roll: usize,
    /// Channel index for pitch (elevator).
    pub pitch: usize,
    /// Channel index for yaw (rudder / tail).
    pub yaw: usize,
    /// Channel index for collective pitch.
    pub collective: usize,
    /// Channel index for throttle.
    pub throttle: usize,
    pub invert_roll: bool,
    pub invert_pitch: bool,
    pub invert_yaw: bool,
    pub invert_collective: bool,
}

/// Default helicopter channel mapping (AETR order, collective on CH6).
///
/// - CH1 (Roll) -> roll
/// - CH2 (Pitch) -> pitch
/// - CH3 (Throttle) -> throttle
/// - CH4 (Yaw) -> yaw
/// - CH6 -> collective
pub const DEFAULT_MAPPING: ChannelMapping = ChannelMapping {
    roll: 0,       // CH1
    pitch: 1,      // CH2
    throttle: 2,   // CH3
    yaw: 3,        // CH4
    collective: 5, // CH6
    invert_roll: false,
    invert_pitch: false,
    invert_yaw: false,
    invert_collective: false,
};

/// CRSF channel center value (1500 µs).
pub const CRSF_CENTER: u16 = 992;

/// CRSF channel maximum value (2012 µs).
pub const CRSF_MAX: u16 = 1811;

/// CRSF channel minimum value (988 µs).
pub const CRSF_MIN: u16 = 172;

/// Half the stick throw in channel counts.
const HALF_SPAN: f32 = (CRSF_CENTER - CRSF_MIN) as f32;

/// Convert a CRSF channel value to a centered stick position in `[-1, 1]`.
#[inline]
#[must_use]
pub fn crsf_to_unit(val: u16, invert: bool) -> f32 {
    let scaled = ((val as f32 - CRSF_CENTER as f32) / HALF_SPAN).clamp(-1.0, 1.0);
    if invert { -scaled } else { scaled }
}

/// Convert a CRSF channel value to a throttle position in `[0, 1]`.
#[inline]
#[must_use]
pub fn crsf_to_throttle(val: u16) -> f32 {
    ((val as f32 - CRSF_MIN as f32) / (CRSF_MAX - CRSF_MIN) as f32).clamp(0.0, 1.0)
}

/// Map CRSF channel data to a pilot command using the provided mapping.
///
/// Mapped indices above 15 read as centered (throttle closed).
#[must_use]
pub fn channels_to_manual_control(
    channels: &[u16; 16],
    mapping: &ChannelMapping,
) -> ManualControlCommand {
    let read = |idx: usize| channels.get(idx).copied();

    ManualControlCommand {
        roll: read(mapping.roll).map_or(0.0, |v| crsf_to_unit(v, mapping.invert_roll)),
        pitch: read(mapping.pitch).map_or(0.0, |v| crsf_to_unit(v, mapping.invert_pitch)),
        yaw: read(mapping.yaw).map_or(0.0, |v| crsf_to_unit(v, mapping.invert_yaw)),
        collective: read(mapping.collective)
            .map_or(0.0, |v| crsf_to_unit(v, mapping.invert_collective)),
        throttle: read(mapping.throttle).map_or(0.0, crsf_to_throttle),
    }
}
