//! Pure math/data for Browsesheet
//!
//! Geometry primitives and unit types shared by the runtime, the animation
//! system and the sheet itself. Nothing in here allocates or has side effects.

mod geometry;
mod unit;

pub use geometry::*;
pub use unit::*;

pub mod prelude {
    pub use crate::geometry::{Offset, Size, Velocity};
    pub use crate::unit::{Density, Dp, Px};
}
