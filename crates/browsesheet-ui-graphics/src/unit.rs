//! Unit types: Dp, Px and the density that converts between them

/// Density-independent pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Dp(pub f32);

impl Dp {
    pub const ZERO: Dp = Dp(0.0);

    pub fn to_px(&self, density: f32) -> f32 {
        self.0 * density
    }

    pub fn from_px(px: f32, density: f32) -> Self {
        Self(px / density)
    }
}

/// Raw pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Px(pub f32);

/// Screen density used to turn [`Dp`] values into pixels.
///
/// `1.0` corresponds to a baseline (mdpi) screen, `2.0` to xhdpi and so on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub density: f32,
}

impl Density {
    pub const fn new(density: f32) -> Self {
        Self { density }
    }

    pub fn dp_to_px(&self, dp: Dp) -> f32 {
        dp.to_px(self.density)
    }

    pub fn px_to_dp(&self, px: f32) -> Dp {
        Dp::from_px(px, self.density)
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::new(1.0)
    }
}
