//! Shared gesture thresholds.
//!
//! Values are in logical pixels and should be scaled by density on dense
//! touch screens.

/// Pointer travel before a press turns into a drag.
///
/// Matches the common platform touch slop of about 8dp.
pub const DRAG_THRESHOLD: f32 = 8.0;

/// Upper bound for release velocity in px/sec.
pub const MAX_FLING_VELOCITY: f32 = 8_000.0;

/// Flings at or below this speed (px/sec) are treated as noise and skipped.
///
/// The fling spline produces NaN for near-zero velocities.
pub const MIN_FLING_VELOCITY: f32 = 1.0;

/// Unconsumed delta (px) in a fling frame that counts as hitting a bound.
pub const BOUNDARY_EPSILON: f32 = 0.5;

/// Horizontal inset (dp) of the sheet when collapsed.
pub const CORNER_MARGIN_DP: f32 = 12.0;
