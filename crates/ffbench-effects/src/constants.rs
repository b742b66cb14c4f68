//! Device-unit constants shared across the workbench

/// Hardware time units per second. Durations, periods, and envelope times
/// are all expressed in microseconds.
pub const MICROS_PER_SECOND: u32 = 1_000_000;

/// Nominal full-scale device unit for magnitudes, offsets, and coefficients.
pub const NOMINAL_MAX: i32 = 10_000;

/// Maximum effect gain in device units.
pub const GAIN_MAX: u32 = 10_000;

/// Largest periodic phase value, in hundredths of a degree.
pub const PHASE_MAX: u32 = 35_999;

/// Sample period value that asks the driver to use its own default rate.
pub const DEFAULT_SAMPLE_PERIOD_US: u32 = 0;

/// Duration substituted for a ramp force that would otherwise run forever.
/// A ramp interpolates between its endpoints over its duration, so an
/// infinite duration leaves it stuck at the start magnitude.
pub const RAMP_FALLBACK_DURATION_US: u32 = 2 * MICROS_PER_SECOND;

/// Most actuator axes an effect template will address.
pub const MAX_FEEDBACK_AXES: usize = 2;
