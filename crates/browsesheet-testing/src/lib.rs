//! Testing utilities and harness for Browsesheet

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
