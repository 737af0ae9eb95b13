//! Geometric primitives: Offset, Velocity, Size

use std::ops::{Add, Neg, Sub};

/// A 2D displacement in pixels.
///
/// The sheet is strictly vertical, so most call sites only look at `y`, but
/// nested scroll hosts hand over full offsets.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset along the vertical axis only.
    pub const fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

/// A 2D velocity in pixels per second.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Velocity along the vertical axis only.
    pub const fn vertical(y: f32) -> Self {
        Self { x: 0.0, y }
    }
}

impl Add for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Velocity) -> Velocity {
        Velocity::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Velocity {
    type Output = Velocity;

    fn sub(self, rhs: Velocity) -> Velocity {
        Velocity::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// True when either dimension is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_arithmetic() {
        let a = Offset::vertical(10.0);
        let b = Offset::new(1.0, -4.0);
        assert_eq!(a + b, Offset::new(1.0, 6.0));
        assert_eq!(a - b, Offset::new(-1.0, 14.0));
        assert_eq!(-a, Offset::vertical(-10.0));
    }

    #[test]
    fn velocity_difference_reports_remainder() {
        let available = Velocity::vertical(-1200.0);
        let leftover = Velocity::vertical(-200.0);
        assert_eq!(available - leftover, Velocity::vertical(-1000.0));
    }

    #[test]
    fn size_emptiness() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(f32::NAN, 10.0).is_empty());
        assert!(!Size::new(360.0, 640.0).is_empty());
    }
}
