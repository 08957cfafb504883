//! Rotor speed estimate from reference-pulse capture timestamps.
//!
//! [`RpmEstimator::on_capture`] runs in interrupt context and is the only
//! writer. The control task polls [`RpmEstimator::rpm`]. The capture
//! timestamp and the filtered RPM are published together in one 64-bit word
//! so a reader can never pair a fresh timestamp with a stale value or the
//! other way round.

use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Microseconds per minute.
const US_PER_MINUTE: f32 = 60_000_000.0;

/// No capture for this long means the rotor is presumed stopped.
pub const DEADTIME_US: u32 = 1_000_000;

#[inline]
fn pack(timestamp_us: u32, rpm: f32) -> u64 {
    ((timestamp_us as u64) << 32) | rpm.to_bits() as u64
}

#[inline]
fn unpack(word: u64) -> (u32, f32) {
    ((word >> 32) as u32, f32::from_bits(word as u32))
}

/// Single-writer/single-reader RPM estimate.
///
/// Suitable for a `static`: every method takes `&self`.
pub struct RpmEstimator {
    /// Last capture timestamp (high half) and filtered RPM (low half).
    published: AtomicU64,
    last_period_us: AtomicU32,
    alpha_bits: AtomicU32,
    primed: AtomicBool,
}

impl RpmEstimator {
    /// A stopped rotor with no smoothing (alpha = 1.0).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            published: AtomicU64::new(0),
            last_period_us: AtomicU32::new(0),
            // 1.0f32
            alpha_bits: AtomicU32::new(0x3f80_0000),
            primed: AtomicBool::new(false),
        }
    }

    /// Record a rotor reference pulse captured at `now_us`.
    ///
    /// The first pulse only seeds the timestamp. A pulse with no elapsed
    /// time since the previous one is ignored.
    pub fn on_capture(&self, now_us: u32) {
        let (last_us, filtered) = unpack(self.published.load(Ordering::Relaxed));

        if !self.primed.swap(true, Ordering::Relaxed) {
            self.published.store(pack(now_us, 0.0), Ordering::Release);
            return;
        }

        let elapsed_us = now_us.wrapping_sub(last_us);
        if elapsed_us == 0 {
            return;
        }
        self.last_period_us.store(elapsed_us, Ordering::Relaxed);

        let alpha = self.smoothing_alpha();
        let instant = US_PER_MINUTE / elapsed_us as f32;
        let filtered = filtered * (1.0 - alpha) + instant * alpha;

        self.published.store(pack(now_us, filtered), Ordering::Release);
    }

    /// Filtered RPM as seen at `now_us`, or 0 once the last pulse is older
    /// than [`DEADTIME_US`].
    ///
    /// A pulse stamped after `now_us` (the capture preempted the caller
    /// between taking `now_us` and polling) counts as fresh.
    #[must_use]
    pub fn rpm(&self, now_us: u32) -> f32 {
        if !self.primed.load(Ordering::Acquire) {
            return 0.0;
        }
        let (last_us, filtered) = unpack(self.published.load(Ordering::Acquire));
        let age_us = now_us.wrapping_sub(last_us) as i32;
        if age_us < DEADTIME_US as i32 {
            filtered
        } else {
            0.0
        }
    }

    /// Set the smoothing factor. 1.0 passes every pulse through unfiltered;
    /// values are clamped to `[0, 1]` and non-finite values are ignored.
    pub fn set_smoothing_alpha(&self, alpha: f32) {
        if !alpha.is_finite() {
            return;
        }
        self.alpha_bits
            .store(alpha.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn smoothing_alpha(&self) -> f32 {
        f32::from_bits(self.alpha_bits.load(Ordering::Relaxed))
    }

    /// Timestamp of the most recent capture.
    #[inline]
    #[must_use]
    pub fn last_capture_timestamp_us(&self) -> u32 {
        unpack(self.published.load(Ordering::Acquire)).0
    }

    /// Interval between the two most recent captures.
    #[inline]
    #[must_use]
    pub fn last_period_us(&self) -> u32 {
        self.last_period_us.load(Ordering::Relaxed)
    }
}

impl Default for RpmEstimator {
    fn default() -> Self {
        Self::new()
    }
}
