/// Spring parameters.
///
/// Thresholds are in the animated value's own units (pixels for the sheet).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// Damping ratio. 1.0 = critically damped, < 1.0 = under-damped (bouncy), > 1.0 = over-damped.
    pub damping_ratio: f32,
    /// Stiffness constant. Higher values settle faster.
    pub stiffness: f32,
    /// Speed below which the spring may come to rest.
    pub velocity_threshold: f32,
    /// Distance from the target below which the spring may come to rest.
    pub position_threshold: f32,
}

pub const DAMPING_RATIO_NO_BOUNCY: f32 = 1.0;
pub const DAMPING_RATIO_MEDIUM_BOUNCY: f32 = 0.5;
pub const STIFFNESS_MEDIUM: f32 = 1500.0;
pub const STIFFNESS_HIGH: f32 = 10_000.0;

const DEFAULT_POSITION_THRESHOLD: f32 = 0.01;
const DEFAULT_VELOCITY_THRESHOLD: f32 = 0.5;

impl SpringSpec {
    pub const fn new(damping_ratio: f32, stiffness: f32) -> Self {
        Self {
            damping_ratio,
            stiffness,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            position_threshold: DEFAULT_POSITION_THRESHOLD,
        }
    }

    /// Critically damped, medium stiffness.
    pub const fn default_spring() -> Self {
        Self::new(DAMPING_RATIO_NO_BOUNCY, STIFFNESS_MEDIUM)
    }

    pub const fn bouncy() -> Self {
        Self::new(DAMPING_RATIO_MEDIUM_BOUNCY, STIFFNESS_MEDIUM)
    }

    pub const fn stiff() -> Self {
        Self::new(DAMPING_RATIO_NO_BOUNCY, STIFFNESS_HIGH)
    }

    pub fn with_thresholds(mut self, velocity_threshold: f32, position_threshold: f32) -> Self {
        self.velocity_threshold = velocity_threshold.abs();
        self.position_threshold = position_threshold.abs();
        self
    }

    pub(crate) fn is_at_rest(&self, value: f32, velocity: f32, target: f32) -> bool {
        (value - target).abs() < self.position_threshold
            && velocity.abs() < self.velocity_threshold
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::default_spring()
    }
}

/// Closed-form damped harmonic oscillator.
///
/// `advance` solves the spring equation exactly from the current state, so
/// frame length only affects sampling, never stability.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpringSimulation {
    natural_freq: f64,
    damping_ratio: f64,
}

impl SpringSimulation {
    pub(crate) fn new(spec: &SpringSpec) -> Self {
        Self {
            natural_freq: (spec.stiffness.max(f32::EPSILON) as f64).sqrt(),
            damping_ratio: spec.damping_ratio.max(0.0) as f64,
        }
    }

    /// Returns `(value, velocity)` after `dt_seconds`, starting at `value`
    /// moving at `velocity` towards `target`.
    pub(crate) fn advance(
        &self,
        value: f32,
        velocity: f32,
        target: f32,
        dt_seconds: f64,
    ) -> (f32, f32) {
        let x = (value - target) as f64;
        let v = velocity as f64;
        let t = dt_seconds;
        let omega = self.natural_freq;
        let zeta = self.damping_ratio;

        let (displacement, new_velocity) = if zeta > 1.0 {
            let root = (zeta * zeta - 1.0).sqrt();
            let gamma_plus = -zeta * omega + omega * root;
            let gamma_minus = -zeta * omega - omega * root;
            let coeff_b = (gamma_minus * x - v) / (gamma_minus - gamma_plus);
            let coeff_a = x - coeff_b;
            let e_minus = (gamma_minus * t).exp();
            let e_plus = (gamma_plus * t).exp();
            (
                coeff_a * e_minus + coeff_b * e_plus,
                coeff_a * gamma_minus * e_minus + coeff_b * gamma_plus * e_plus,
            )
        } else if zeta == 1.0 {
            let coeff_a = x;
            let coeff_b = v + omega * x;
            let decay = (-omega * t).exp();
            let displacement = (coeff_a + coeff_b * t) * decay;
            (displacement, displacement * -omega + coeff_b * decay)
        } else {
            let damped_freq = omega * (1.0 - zeta * zeta).sqrt();
            let cos_coeff = x;
            let sin_coeff = (zeta * omega * x + v) / damped_freq;
            let decay = (-zeta * omega * t).exp();
            let (sin, cos) = (damped_freq * t).sin_cos();
            let displacement = decay * (cos_coeff * cos + sin_coeff * sin);
            (
                displacement,
                displacement * -zeta * omega
                    + decay * (-damped_freq * cos_coeff * sin + damped_freq * sin_coeff * cos),
            )
        };

        ((displacement + target as f64) as f32, new_velocity as f32)
    }
}
