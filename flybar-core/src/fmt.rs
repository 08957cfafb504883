//! Logging shims that forward to defmt when the `defmt` feature is on and
//! compile to nothing otherwise. Declared with `#[macro_use]` so the macros
//! are in textual scope for every module after it.

#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
    }};
}

macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
    }};
}
