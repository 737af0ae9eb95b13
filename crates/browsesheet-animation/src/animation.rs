//! Frame-stepped animations and the async driver that feeds them frame times.

use browsesheet_core::FrameClock;

use crate::decay_spec::FloatDecayAnimationSpec;
use crate::spring::{SpringSimulation, SpringSpec};

/// One sample of a running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub value: f32,
    /// Velocity in units per second.
    pub velocity: f32,
    pub frame_time_nanos: u64,
    pub play_time_nanos: u64,
    pub finished: bool,
}

/// An animation advanced by absolute frame times.
///
/// The first call to [`FrameAnimation::step`] anchors play time zero and
/// reports the starting value.
pub trait FrameAnimation {
    fn step(&mut self, frame_time_nanos: u64) -> AnimationFrame;

    /// Frame describing the animation before it has been stepped.
    fn initial_frame(&self) -> AnimationFrame;
}

/// Decays from a starting velocity towards rest.
#[derive(Debug, Clone)]
pub struct DecayAnimation<S: FloatDecayAnimationSpec> {
    spec: S,
    initial_value: f32,
    initial_velocity: f32,
    duration_nanos: u64,
    start_time_nanos: Option<u64>,
}

impl<S: FloatDecayAnimationSpec> DecayAnimation<S> {
    pub fn new(spec: S, initial_value: f32, initial_velocity: f32) -> Self {
        let duration_nanos = spec
            .get_duration_nanos(initial_value, initial_velocity)
            .max(0) as u64;
        Self {
            spec,
            initial_value,
            initial_velocity,
            duration_nanos,
            start_time_nanos: None,
        }
    }

    pub fn duration_nanos(&self) -> u64 {
        self.duration_nanos
    }

    /// Value the decay settles at.
    pub fn target_value(&self) -> f32 {
        self.spec
            .get_target_value(self.initial_value, self.initial_velocity)
    }
}

impl<S: FloatDecayAnimationSpec> FrameAnimation for DecayAnimation<S> {
    fn step(&mut self, frame_time_nanos: u64) -> AnimationFrame {
        let start = *self.start_time_nanos.get_or_insert(frame_time_nanos);
        let play_time = frame_time_nanos
            .saturating_sub(start)
            .min(self.duration_nanos);
        let play_time_nanos = play_time as i64;
        AnimationFrame {
            value: self.spec.get_value_from_nanos(
                play_time_nanos,
                self.initial_value,
                self.initial_velocity,
            ),
            velocity: self.spec.get_velocity_from_nanos(
                play_time_nanos,
                self.initial_value,
                self.initial_velocity,
            ),
            frame_time_nanos,
            play_time_nanos: play_time,
            finished: play_time >= self.duration_nanos,
        }
    }

    fn initial_frame(&self) -> AnimationFrame {
        AnimationFrame {
            value: self.initial_value,
            velocity: self.initial_velocity,
            frame_time_nanos: self.start_time_nanos.unwrap_or(0),
            play_time_nanos: 0,
            finished: self.duration_nanos == 0,
        }
    }
}

/// Springs from a starting value and velocity to a fixed target.
#[derive(Debug, Clone)]
pub struct SpringAnimation {
    spec: SpringSpec,
    simulation: SpringSimulation,
    target: f32,
    value: f32,
    velocity: f32,
    start_time_nanos: Option<u64>,
    last_frame_nanos: u64,
    finished: bool,
}

impl SpringAnimation {
    pub fn new(spec: SpringSpec, initial_value: f32, target: f32, initial_velocity: f32) -> Self {
        Self {
            simulation: SpringSimulation::new(&spec),
            finished: spec.is_at_rest(initial_value, initial_velocity, target),
            spec,
            target,
            value: initial_value,
            velocity: initial_velocity,
            start_time_nanos: None,
            last_frame_nanos: 0,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    fn frame(&self, frame_time_nanos: u64) -> AnimationFrame {
        AnimationFrame {
            value: self.value,
            velocity: self.velocity,
            frame_time_nanos,
            play_time_nanos: self
                .start_time_nanos
                .map(|start| frame_time_nanos.saturating_sub(start))
                .unwrap_or(0),
            finished: self.finished,
        }
    }
}

impl FrameAnimation for SpringAnimation {
    fn step(&mut self, frame_time_nanos: u64) -> AnimationFrame {
        if self.start_time_nanos.is_none() {
            self.start_time_nanos = Some(frame_time_nanos);
            self.last_frame_nanos = frame_time_nanos;
            if self.finished {
                self.value = self.target;
                self.velocity = 0.0;
            }
            return self.frame(frame_time_nanos);
        }
        if self.finished {
            return self.frame(frame_time_nanos);
        }

        let dt_nanos = frame_time_nanos.saturating_sub(self.last_frame_nanos);
        self.last_frame_nanos = frame_time_nanos;
        let (value, velocity) = self.simulation.advance(
            self.value,
            self.velocity,
            self.target,
            dt_nanos as f64 / 1_000_000_000.0,
        );
        if self.spec.is_at_rest(value, velocity, self.target) {
            self.value = self.target;
            self.velocity = 0.0;
            self.finished = true;
        } else {
            self.value = value;
            self.velocity = velocity;
        }
        self.frame(frame_time_nanos)
    }

    fn initial_frame(&self) -> AnimationFrame {
        self.frame(self.last_frame_nanos)
    }
}

/// Returned by the per-frame block of [`animate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEndReason {
    /// The animation ran to rest.
    Finished,
    /// The per-frame block asked to stop.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationResult {
    pub end_reason: AnimationEndReason,
    /// Last frame delivered to the block.
    pub last_frame: AnimationFrame,
}

impl AnimationResult {
    pub fn is_cancelled(&self) -> bool {
        self.end_reason == AnimationEndReason::Cancelled
    }
}

/// Steps `animation` once per frame from `clock` and hands each frame to
/// `on_frame` until the animation finishes or the block cancels it.
///
/// Dropping the returned future stops the animation without another call to
/// `on_frame`.
pub async fn animate<A, F>(clock: &FrameClock, animation: &mut A, mut on_frame: F) -> AnimationResult
where
    A: FrameAnimation,
    F: FnMut(&AnimationFrame) -> FrameControl,
{
    if !clock.runtime_handle().is_alive() {
        return AnimationResult {
            end_reason: AnimationEndReason::Cancelled,
            last_frame: animation.initial_frame(),
        };
    }
    loop {
        let frame_time = clock.next_frame().await;
        let frame = animation.step(frame_time);
        let end_reason = if on_frame(&frame) == FrameControl::Cancel {
            AnimationEndReason::Cancelled
        } else if frame.finished {
            AnimationEndReason::Finished
        } else {
            continue;
        };
        log::trace!(
            "animation {:?} at {} after {} ms",
            end_reason,
            frame.value,
            frame.play_time_nanos / 1_000_000
        );
        return AnimationResult {
            end_reason,
            last_frame: frame,
        };
    }
}

pub async fn animate_decay<S, F>(
    clock: &FrameClock,
    spec: S,
    initial_value: f32,
    initial_velocity: f32,
    on_frame: F,
) -> AnimationResult
where
    S: FloatDecayAnimationSpec,
    F: FnMut(&AnimationFrame) -> FrameControl,
{
    let mut animation = DecayAnimation::new(spec, initial_value, initial_velocity);
    animate(clock, &mut animation, on_frame).await
}

pub async fn animate_spring<F>(
    clock: &FrameClock,
    spec: SpringSpec,
    initial_value: f32,
    target: f32,
    initial_velocity: f32,
    on_frame: F,
) -> AnimationResult
where
    F: FnMut(&AnimationFrame) -> FrameControl,
{
    let mut animation = SpringAnimation::new(spec, initial_value, target, initial_velocity);
    animate(clock, &mut animation, on_frame).await
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
