//! Fixed constants of the Annex G method and of the time-stepping loop.

/// Temperature offset between °C and K as used by the viscosity and aging correlations
pub const KELVIN_OFFSET: f64 = 273.0;

/// Reference hottest-spot temperature for insulation aging, K (110 °C + 273)
pub const AGING_REFERENCE_TEMP_K: f64 = 383.0;
/// Aging rate constant of thermally upgraded paper, K
pub const AGING_RATE_CONSTANT: f64 = 15_000.0;
/// Normal insulation life at the reference hottest-spot temperature, hours
pub const NORMAL_INSULATION_LIFE_HOURS: f64 = 180_000.0;

/// Convection exponent of the winding and hot-spot heat loss for
/// non-directed flow (G.6A / G.16A)
pub const CONVECTION_EXPONENT: f64 = 1.25;
/// Exponent applied to the viscosity ratio for non-directed flow
pub const VISCOSITY_EXPONENT: f64 = 0.25;

/// Initial integration step, minutes
pub const INITIAL_DELTA_T_MIN: f64 = 0.5;
/// Divisor of the winding time constant for the simplified stability bound
pub const INITIAL_STABILITY_DIVISOR: f64 = 9.0;
/// Smallest step the stability controller may impose, minutes
pub const MIN_DELTA_T_MIN: f64 = 1e-3;
/// Floor for the duration of a schedule segment when computing slopes, minutes
pub const SEGMENT_DURATION_FLOOR: f64 = 1e-12;
/// Tolerance for landing a sub-step on a breakpoint, minutes
pub const TIME_EPSILON_MIN: f64 = 1e-9;

pub const MINUTES_PER_HOUR: f64 = 60.0;
