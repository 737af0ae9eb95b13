#![doc = r"Frame-driven runtime pieces for Browsesheet: frame callbacks, a UI task executor and observable state."]

pub mod frame_clock;
pub mod platform;
pub mod runtime;
mod state;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, FrameCallbackId, Runtime, RuntimeHandle, TaskHandle};
pub use state::{batch_notifications, MutableState, State, StateSubscription};
