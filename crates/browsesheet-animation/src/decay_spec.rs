//! Decay curves for fling animations.
//!
//! [`SplineBasedDecaySpec`] follows the platform scroller's fling spline so a
//! flung sheet travels the same distance a flung list would.
//! [`ExponentialDecaySpec`] is a plain friction model whose velocity falls off
//! as `v0 * e^(friction * t)`.

use std::sync::LazyLock;

// ============================================================================
// Fling spline
// ============================================================================

const INFLECTION: f32 = 0.35;
const START_TENSION: f32 = 0.5;
const END_TENSION: f32 = 1.0;
const P1: f32 = START_TENSION * INFLECTION;
const P2: f32 = 1.0 - END_TENSION * (1.0 - INFLECTION);

const NB_SAMPLES: usize = 100;

/// Distance fraction travelled at each of the `NB_SAMPLES + 1` time samples.
static SPLINE_POSITIONS: LazyLock<[f32; NB_SAMPLES + 1]> = LazyLock::new(|| {
    let mut positions = [0.0f32; NB_SAMPLES + 1];
    let mut x_min = 0.0f32;

    for (i, position) in positions.iter_mut().enumerate().take(NB_SAMPLES) {
        let alpha = i as f32 / NB_SAMPLES as f32;
        let mut x_max = 1.0f32;
        // Bisect for the bezier parameter whose time coordinate equals alpha.
        let (x, coef) = loop {
            let x_mid = x_min + (x_max - x_min) / 2.0;
            let c = 3.0 * x_mid * (1.0 - x_mid);
            let tx = c * ((1.0 - x_mid) * P1 + x_mid * P2) + x_mid * x_mid * x_mid;
            if (tx - alpha).abs() < 1e-5 {
                break (x_mid, c);
            }
            if tx > alpha {
                x_max = x_mid;
            } else {
                x_min = x_mid;
            }
        };
        *position = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
    }

    positions[NB_SAMPLES] = 1.0;
    positions
});

/// Sampled point on the fling spline.
#[derive(Debug, Clone, Copy)]
pub struct FlingResult {
    /// Fraction of the total fling distance covered, `0.0..=1.0`.
    pub distance_coefficient: f32,
    /// Slope of the distance curve at this point.
    pub velocity_coefficient: f32,
}

pub struct FlingSpline;

impl FlingSpline {
    /// Samples the spline at normalized time `time` (`0.0..=1.0`).
    pub fn fling_position(time: f32) -> FlingResult {
        let clamped_time = time.clamp(0.0, 1.0);
        let index = (NB_SAMPLES as f32 * clamped_time) as usize;
        if index >= NB_SAMPLES {
            return FlingResult {
                distance_coefficient: 1.0,
                velocity_coefficient: 0.0,
            };
        }

        let t_inf = index as f32 / NB_SAMPLES as f32;
        let t_sup = (index + 1) as f32 / NB_SAMPLES as f32;
        let d_inf = SPLINE_POSITIONS[index];
        let d_sup = SPLINE_POSITIONS[index + 1];
        let velocity = (d_sup - d_inf) / (t_sup - t_inf);
        FlingResult {
            distance_coefficient: d_inf + (clamped_time - t_inf) * velocity,
            velocity_coefficient: velocity,
        }
    }

    /// Log of the spline deceleration for `velocity` under `friction`.
    pub fn deceleration(velocity: f32, friction: f32) -> f64 {
        (INFLECTION as f64 * velocity.abs() as f64 / friction as f64).ln()
    }
}

// ============================================================================
// Fling calculator
// ============================================================================

const GRAVITY_EARTH: f32 = 9.80665;
const INCHES_PER_METER: f32 = 39.37;
/// `ln(0.78) / ln(0.9)`
const DECELERATION_RATE: f32 = 2.358_201_6;

fn compute_deceleration(friction: f32, density: f32) -> f32 {
    GRAVITY_EARTH * INCHES_PER_METER * density * 160.0 * friction
}

/// Precomputed distance and duration of one fling.
#[derive(Debug, Clone, Copy)]
pub struct FlingInfo {
    /// Initial velocity in px/sec.
    pub initial_velocity: f32,
    /// Total unsigned distance in px.
    pub distance: f32,
    /// Total duration in milliseconds.
    pub duration: i64,
}

impl FlingInfo {
    fn progress(&self, time_ms: i64) -> f32 {
        if self.duration > 0 {
            time_ms as f32 / self.duration as f32
        } else {
            1.0
        }
    }

    /// Signed displacement at `time_ms`.
    pub fn position(&self, time_ms: i64) -> f32 {
        self.distance
            * self.initial_velocity.signum()
            * FlingSpline::fling_position(self.progress(time_ms)).distance_coefficient
    }

    /// Signed velocity in px/sec at `time_ms`.
    pub fn velocity(&self, time_ms: i64) -> f32 {
        if self.duration <= 0 {
            return 0.0;
        }
        FlingSpline::fling_position(self.progress(time_ms)).velocity_coefficient
            * self.initial_velocity.signum()
            * self.distance
            / self.duration as f32
            * 1000.0
    }

    pub fn is_finished(&self, time_ms: i64) -> bool {
        time_ms >= self.duration
    }
}

/// Turns an initial velocity into fling distance and duration using scroller
/// physics scaled by screen density.
#[derive(Debug, Clone, Copy)]
pub struct FlingCalculator {
    friction: f32,
    magic_physical_coefficient: f32,
}

impl FlingCalculator {
    /// Platform scroll friction.
    pub const DEFAULT_FRICTION: f32 = 0.015;

    pub fn new(friction: f32, density: f32) -> Self {
        Self {
            friction,
            magic_physical_coefficient: compute_deceleration(0.84, density),
        }
    }

    pub fn with_density(density: f32) -> Self {
        Self::new(Self::DEFAULT_FRICTION, density)
    }

    fn spline_deceleration(&self, velocity: f32) -> f64 {
        FlingSpline::deceleration(velocity, self.friction * self.magic_physical_coefficient)
    }

    /// Fling duration in milliseconds.
    pub fn fling_duration(&self, velocity: f32) -> i64 {
        let l = self.spline_deceleration(velocity);
        let decel_minus_one = DECELERATION_RATE as f64 - 1.0;
        (1000.0 * (l / decel_minus_one).exp()) as i64
    }

    /// Unsigned fling distance in pixels.
    pub fn fling_distance(&self, velocity: f32) -> f32 {
        let l = self.spline_deceleration(velocity);
        let decel_minus_one = DECELERATION_RATE as f64 - 1.0;
        self.friction
            * self.magic_physical_coefficient
            * (DECELERATION_RATE as f64 / decel_minus_one * l).exp() as f32
    }

    pub fn fling_info(&self, velocity: f32) -> FlingInfo {
        FlingInfo {
            initial_velocity: velocity,
            distance: self.fling_distance(velocity),
            duration: self.fling_duration(velocity),
        }
    }
}

// ============================================================================
// Decay specs
// ============================================================================

/// A decay animation has no target: it starts at a velocity and slows to a
/// stop. Implementations are pure functions of play time.
pub trait FloatDecayAnimationSpec {
    /// Speed below which the animation is considered finished.
    fn abs_velocity_threshold(&self) -> f32;

    fn get_value_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32;

    fn get_velocity_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32;

    fn get_duration_nanos(&self, initial_value: f32, initial_velocity: f32) -> i64;

    /// Where the animation comes to rest.
    fn get_target_value(&self, initial_value: f32, initial_velocity: f32) -> f32;
}

#[derive(Debug, Clone, Copy)]
pub struct SplineBasedDecaySpec {
    calculator: FlingCalculator,
}

impl SplineBasedDecaySpec {
    pub fn new(density: f32) -> Self {
        Self {
            calculator: FlingCalculator::with_density(density),
        }
    }

    pub fn with_calculator(calculator: FlingCalculator) -> Self {
        Self { calculator }
    }
}

impl FloatDecayAnimationSpec for SplineBasedDecaySpec {
    fn abs_velocity_threshold(&self) -> f32 {
        0.0
    }

    fn get_value_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let info = self.calculator.fling_info(initial_velocity);
        initial_value + info.position(play_time_nanos / 1_000_000)
    }

    fn get_velocity_from_nanos(
        &self,
        play_time_nanos: i64,
        _initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let info = self.calculator.fling_info(initial_velocity);
        info.velocity(play_time_nanos / 1_000_000)
    }

    fn get_duration_nanos(&self, _initial_value: f32, initial_velocity: f32) -> i64 {
        self.calculator.fling_duration(initial_velocity) * 1_000_000
    }

    fn get_target_value(&self, initial_value: f32, initial_velocity: f32) -> f32 {
        let distance = self.calculator.fling_distance(initial_velocity);
        initial_value + distance * initial_velocity.signum()
    }
}

/// Friction applied per unit of `friction_multiplier`.
const EXPONENTIAL_DECAY_FRICTION: f32 = -4.2;

#[derive(Debug, Clone, Copy)]
pub struct ExponentialDecaySpec {
    friction: f32,
    abs_velocity_threshold: f32,
}

impl ExponentialDecaySpec {
    /// `friction_multiplier` scales how quickly the fling slows; values are
    /// floored at a tiny positive number so the curve always terminates.
    pub fn new(friction_multiplier: f32, abs_velocity_threshold: f32) -> Self {
        Self {
            friction: EXPONENTIAL_DECAY_FRICTION * friction_multiplier.max(0.0001),
            abs_velocity_threshold: abs_velocity_threshold.abs().max(0.0001),
        }
    }

    fn play_time_seconds(play_time_nanos: i64) -> f32 {
        (play_time_nanos / 1_000_000) as f32 / 1000.0
    }
}

impl Default for ExponentialDecaySpec {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

impl FloatDecayAnimationSpec for ExponentialDecaySpec {
    fn abs_velocity_threshold(&self) -> f32 {
        self.abs_velocity_threshold
    }

    fn get_value_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let seconds = Self::play_time_seconds(play_time_nanos);
        initial_value
            + initial_velocity / self.friction * ((self.friction * seconds).exp() - 1.0)
    }

    fn get_velocity_from_nanos(
        &self,
        play_time_nanos: i64,
        _initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        initial_velocity * (Self::play_time_seconds(play_time_nanos) * self.friction).exp()
    }

    fn get_duration_nanos(&self, _initial_value: f32, initial_velocity: f32) -> i64 {
        if initial_velocity.abs() <= self.abs_velocity_threshold {
            return 0;
        }
        let seconds =
            (self.abs_velocity_threshold / initial_velocity.abs()).ln() / self.friction;
        (seconds * 1_000_000_000.0) as i64
    }

    fn get_target_value(&self, initial_value: f32, initial_velocity: f32) -> f32 {
        if initial_velocity.abs() <= self.abs_velocity_threshold {
            return initial_value;
        }
        let seconds =
            (self.abs_velocity_threshold / initial_velocity.abs()).ln() / self.friction;
        initial_value - initial_velocity / self.friction
            + initial_velocity / self.friction * (self.friction * seconds).exp()
    }
}

/// Decay curve selected by configuration.
#[derive(Debug, Clone, Copy)]
pub enum DecaySpec {
    Spline(SplineBasedDecaySpec),
    Exponential(ExponentialDecaySpec),
}

impl DecaySpec {
    pub fn spline(density: f32) -> Self {
        DecaySpec::Spline(SplineBasedDecaySpec::new(density))
    }

    pub fn exponential() -> Self {
        DecaySpec::Exponential(ExponentialDecaySpec::default())
    }

    fn as_spec(&self) -> &dyn FloatDecayAnimationSpec {
        match self {
            DecaySpec::Spline(spec) => spec,
            DecaySpec::Exponential(spec) => spec,
        }
    }
}

impl FloatDecayAnimationSpec for DecaySpec {
    fn abs_velocity_threshold(&self) -> f32 {
        self.as_spec().abs_velocity_threshold()
    }

    fn get_value_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        self.as_spec()
            .get_value_from_nanos(play_time_nanos, initial_value, initial_velocity)
    }

    fn get_velocity_from_nanos(
        &self,
        play_time_nanos: i64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        self.as_spec()
            .get_velocity_from_nanos(play_time_nanos, initial_value, initial_velocity)
    }

    fn get_duration_nanos(&self, initial_value: f32, initial_velocity: f32) -> i64 {
        self.as_spec()
            .get_duration_nanos(initial_value, initial_velocity)
    }

    fn get_target_value(&self, initial_value: f32, initial_velocity: f32) -> f32 {
        self.as_spec()
            .get_target_value(initial_value, initial_velocity)
    }
}
