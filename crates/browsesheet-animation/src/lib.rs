//! Decay and spring animations driven by the Browsesheet frame clock.

mod animation;
pub mod decay_spec;
pub mod spring;

pub use animation::{
    animate, animate_decay, animate_spring, AnimationEndReason, AnimationFrame, AnimationResult,
    DecayAnimation, FrameAnimation, FrameControl, SpringAnimation,
};
pub use decay_spec::{
    DecaySpec, ExponentialDecaySpec, FlingCalculator, FloatDecayAnimationSpec,
    SplineBasedDecaySpec,
};
pub use spring::SpringSpec;
