//! Fling physics for the sheet.
//!
//! A fling runs a decay curve starting at 0 with the release velocity and
//! feeds the per-frame change of that curve to a [`ScrollScope`]. The fling
//! stops as soon as the scope refuses a noticeable part of a delta, which is
//! how hitting an anchor bound ends it.

use browsesheet_animation::{animate_decay, DecaySpec, FrameControl};
use browsesheet_core::FrameClock;

use crate::config::SheetConfig;
use crate::gesture_constants::{BOUNDARY_EPSILON, MIN_FLING_VELOCITY};

/// Receiver of fling deltas.
pub trait ScrollScope {
    /// Applies `pixels` and returns how much was consumed.
    fn scroll_by(&mut self, pixels: f32) -> f32;

    /// False once the scope lost ownership of its target.
    fn is_active(&self) -> bool {
        true
    }
}

#[allow(async_fn_in_trait)]
pub trait FlingBehavior {
    /// Flings `scope` with `initial_velocity` (px/sec) and returns the
    /// velocity left over when the fling stopped.
    async fn perform_fling(&self, scope: &mut dyn ScrollScope, initial_velocity: f32) -> f32;
}

#[derive(Clone)]
pub struct DefaultFlingBehavior {
    clock: FrameClock,
    decay: DecaySpec,
    noise_floor: f32,
    boundary_epsilon: f32,
}

impl DefaultFlingBehavior {
    pub fn new(clock: FrameClock, decay: DecaySpec) -> Self {
        Self {
            clock,
            decay,
            noise_floor: MIN_FLING_VELOCITY,
            boundary_epsilon: BOUNDARY_EPSILON,
        }
    }

    pub fn from_config(clock: FrameClock, config: &SheetConfig) -> Self {
        Self {
            clock,
            decay: config.decay,
            noise_floor: config.fling_noise_floor,
            boundary_epsilon: config.boundary_epsilon,
        }
    }

    pub fn noise_floor(&self) -> f32 {
        self.noise_floor
    }
}

impl FlingBehavior for DefaultFlingBehavior {
    async fn perform_fling(&self, scope: &mut dyn ScrollScope, initial_velocity: f32) -> f32 {
        if !initial_velocity.is_finite() {
            log::warn!("ignoring fling with non-finite velocity {initial_velocity}");
            return 0.0;
        }
        // The spline yields NaN for velocities this small.
        if initial_velocity.abs() <= self.noise_floor {
            return initial_velocity;
        }

        log::debug!("fling start v={initial_velocity}");
        let mut last_value = 0.0f32;
        let mut velocity_left = initial_velocity;
        let boundary_epsilon = self.boundary_epsilon;
        let result = animate_decay(&self.clock, self.decay, 0.0, initial_velocity, |frame| {
            if !scope.is_active() {
                return FrameControl::Cancel;
            }
            let delta = frame.value - last_value;
            let consumed = scope.scroll_by(delta);
            last_value = frame.value;
            velocity_left = frame.velocity;
            log::trace!("fling frame delta={delta} consumed={consumed} v={}", frame.velocity);
            if (delta - consumed).abs() > boundary_epsilon {
                FrameControl::Cancel
            } else {
                FrameControl::Continue
            }
        })
        .await;

        let leftover = velocity_left
            .abs()
            .min(initial_velocity.abs())
            .copysign(initial_velocity);
        log::debug!(
            "fling {:?} after {:.1}px, leftover v={leftover}",
            result.end_reason,
            last_value
        );
        leftover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browsesheet_core::{DefaultScheduler, Runtime};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    const FRAME_NANOS: u64 = 16_666_667;

    struct BoundedScope {
        offset: f32,
        min: f32,
        max: f32,
        applied: Vec<f32>,
    }

    impl ScrollScope for BoundedScope {
        fn scroll_by(&mut self, pixels: f32) -> f32 {
            let next = (self.offset + pixels).max(self.min).min(self.max);
            let consumed = next - self.offset;
            self.offset = next;
            self.applied.push(consumed);
            consumed
        }
    }

    fn run_fling(velocity: f32, scope: BoundedScope, frames: u64) -> (f32, BoundedScope) {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let behavior = DefaultFlingBehavior::new(runtime.frame_clock(), DecaySpec::spline(1.0));
        let outcome = Rc::new(RefCell::new(None));
        let outcome_in_task = Rc::clone(&outcome);
        runtime
            .handle()
            .spawn_ui(async move {
                let mut scope = scope;
                let leftover = behavior.perform_fling(&mut scope, velocity).await;
                *outcome_in_task.borrow_mut() = Some((leftover, scope));
            })
            .expect("runtime alive");

        runtime.handle().drain_ui();
        for frame in 1..=frames {
            runtime.drain_frame(frame * FRAME_NANOS);
        }
        let result = outcome.borrow_mut().take();
        result.expect("fling finished")
    }

    #[test]
    fn slow_fling_is_a_no_op() {
        let scope = BoundedScope {
            offset: 50.0,
            min: 0.0,
            max: 100.0,
            applied: Vec::new(),
        };
        let (leftover, scope) = run_fling(0.8, scope, 0);

        assert_eq!(leftover, 0.8);
        assert_eq!(scope.offset, 50.0);
        assert!(scope.applied.is_empty());
    }

    #[test]
    fn fling_into_bound_stops_with_leftover_in_fling_direction() {
        let scope = BoundedScope {
            offset: 300.0,
            min: 0.0,
            max: 320.0,
            applied: Vec::new(),
        };
        let (leftover, scope) = run_fling(3000.0, scope, 120);

        assert_eq!(scope.offset, 320.0);
        assert!(leftover > 0.0 && leftover <= 3000.0);
    }

    #[test]
    fn unobstructed_fling_runs_to_rest() {
        let scope = BoundedScope {
            offset: 0.0,
            min: -1.0e6,
            max: 1.0e6,
            applied: Vec::new(),
        };
        let (leftover, scope) = run_fling(-2000.0, scope, 240);

        assert!(scope.offset < -100.0);
        assert!(scope.applied.iter().all(|delta| *delta <= 0.0));
        assert!(leftover.abs() < 1.0);
    }

    #[test]
    fn non_finite_velocity_is_ignored() {
        let scope = BoundedScope {
            offset: 10.0,
            min: 0.0,
            max: 100.0,
            applied: Vec::new(),
        };
        let (leftover, scope) = run_fling(f32::NAN, scope, 0);

        assert_eq!(leftover, 0.0);
        assert_eq!(scope.offset, 10.0);
    }
}
