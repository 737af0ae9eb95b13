use browsesheet_animation::{DecaySpec, SpringSpec};
use browsesheet_ui_graphics::{Density, Dp};

use crate::error::SheetError;
use crate::gesture_constants::{
    BOUNDARY_EPSILON, CORNER_MARGIN_DP, DRAG_THRESHOLD, MAX_FLING_VELOCITY, MIN_FLING_VELOCITY,
};

/// Tunables for one sheet.
///
/// Anchor fractions are relative to the available height. All distances other
/// than `corner_margin` are in pixels.
#[derive(Debug, Clone, Copy)]
pub struct SheetConfig {
    /// Anchor where the sheet reaches full width, as a fraction of height.
    pub full_width_fraction: f32,
    /// Resting anchor, as a fraction of height.
    pub collapsed_fraction: f32,
    pub corner_margin: Dp,
    pub density: Density,
    pub fling_noise_floor: f32,
    pub boundary_epsilon: f32,
    pub spring: SpringSpec,
    pub decay: DecaySpec,
    pub max_fling_velocity: f32,
    pub touch_slop: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        let density = Density::default();
        Self {
            full_width_fraction: 0.2,
            collapsed_fraction: 0.3,
            corner_margin: Dp(CORNER_MARGIN_DP),
            density,
            fling_noise_floor: MIN_FLING_VELOCITY,
            boundary_epsilon: BOUNDARY_EPSILON,
            spring: SpringSpec::default(),
            decay: DecaySpec::spline(density.density),
            max_fling_velocity: MAX_FLING_VELOCITY,
            touch_slop: DRAG_THRESHOLD,
        }
    }
}

impl SheetConfig {
    /// Sets the density, rebuilding a spline decay curve for it.
    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        if let DecaySpec::Spline(_) = self.decay {
            self.decay = DecaySpec::spline(density.density);
        }
        self
    }

    pub fn with_fractions(mut self, full_width_fraction: f32, collapsed_fraction: f32) -> Self {
        self.full_width_fraction = full_width_fraction;
        self.collapsed_fraction = collapsed_fraction;
        self
    }

    pub fn with_corner_margin(mut self, corner_margin: Dp) -> Self {
        self.corner_margin = corner_margin;
        self
    }

    pub fn with_spring(mut self, spring: SpringSpec) -> Self {
        self.spring = spring;
        self
    }

    pub fn with_decay(mut self, decay: DecaySpec) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_fling_thresholds(mut self, noise_floor: f32, boundary_epsilon: f32) -> Self {
        self.fling_noise_floor = noise_floor;
        self.boundary_epsilon = boundary_epsilon;
        self
    }

    pub fn with_max_fling_velocity(mut self, max_fling_velocity: f32) -> Self {
        self.max_fling_velocity = max_fling_velocity;
        self
    }

    pub fn with_touch_slop(mut self, touch_slop: f32) -> Self {
        self.touch_slop = touch_slop;
        self
    }

    pub fn corner_margin_px(&self) -> f32 {
        self.density.dp_to_px(self.corner_margin)
    }

    pub fn validate(&self) -> Result<(), SheetError> {
        check_fraction("full_width_fraction", self.full_width_fraction)?;
        check_fraction("collapsed_fraction", self.collapsed_fraction)?;
        if self.full_width_fraction > self.collapsed_fraction {
            return Err(SheetError::UnorderedFractions {
                full_width: self.full_width_fraction,
                collapsed: self.collapsed_fraction,
            });
        }
        let density = self.density.density;
        if !density.is_finite() || density <= 0.0 {
            return Err(SheetError::InvalidDensity { density });
        }
        check_non_negative("corner_margin", self.corner_margin.0)?;
        check_non_negative("fling_noise_floor", self.fling_noise_floor)?;
        check_non_negative("boundary_epsilon", self.boundary_epsilon)?;
        check_non_negative("touch_slop", self.touch_slop)?;
        check_positive("max_fling_velocity", self.max_fling_velocity)?;
        check_positive("spring.damping_ratio", self.spring.damping_ratio)?;
        check_positive("spring.stiffness", self.spring.stiffness)?;
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f32) -> Result<(), SheetError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SheetError::FractionOutOfRange { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<(), SheetError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SheetError::InvalidParameter { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), SheetError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SheetError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SheetConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.corner_margin_px(), 12.0);
    }

    #[test]
    fn corner_margin_scales_with_density() {
        let config = SheetConfig::default().with_density(Density::new(3.0));
        assert_eq!(config.corner_margin_px(), 36.0);
    }

    #[test]
    fn rejects_swapped_fractions() {
        let config = SheetConfig::default().with_fractions(0.5, 0.3);
        assert_eq!(
            config.validate(),
            Err(SheetError::UnorderedFractions {
                full_width: 0.5,
                collapsed: 0.3
            })
        );
    }

    #[test]
    fn rejects_fraction_outside_unit_range() {
        let config = SheetConfig::default().with_fractions(0.2, 1.5);
        assert!(matches!(
            config.validate(),
            Err(SheetError::FractionOutOfRange {
                name: "collapsed_fraction",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_positive_density() {
        let config = SheetConfig::default().with_density(Density::new(0.0));
        assert_eq!(
            config.validate(),
            Err(SheetError::InvalidDensity { density: 0.0 })
        );
    }

    #[test]
    fn rejects_undamped_spring() {
        let config = SheetConfig::default().with_spring(SpringSpec::new(0.0, 1500.0));
        assert!(matches!(
            config.validate(),
            Err(SheetError::InvalidParameter {
                name: "spring.damping_ratio",
                ..
            })
        ));
    }
}
