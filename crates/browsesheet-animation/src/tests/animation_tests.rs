use super::*;

use crate::decay_spec::{ExponentialDecaySpec, SplineBasedDecaySpec};
use browsesheet_core::{DefaultScheduler, Runtime};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

const FRAME_NANOS: u64 = 16_666_667;

fn pump(runtime: &Runtime, frames: u64) {
    for frame in 1..=frames {
        runtime.drain_frame(frame * FRAME_NANOS);
    }
}

#[test]
fn decay_animation_starts_at_initial_value_and_settles_at_target() {
    let mut animation = DecayAnimation::new(SplineBasedDecaySpec::new(1.0), 40.0, 2000.0);
    let target = animation.target_value();

    let first = animation.step(1_000);
    assert_eq!(first.play_time_nanos, 0);
    assert!((first.value - 40.0).abs() < 0.5);
    assert!(!first.finished);

    let last = animation.step(1_000 + animation.duration_nanos());
    assert!(last.finished);
    assert!((last.value - target).abs() < 1.0);
    assert!(target > 40.0);
}

#[test]
fn exponential_decay_slows_down() {
    let mut animation = DecayAnimation::new(ExponentialDecaySpec::default(), 0.0, -1200.0);
    let first = animation.step(0);
    let later = animation.step(200_000_000);

    assert!(later.value < first.value);
    assert!(later.velocity.abs() < first.velocity.abs());
}

#[test]
fn critically_damped_spring_approaches_without_overshoot() {
    let mut animation = SpringAnimation::new(SpringSpec::default(), 0.0, 100.0, 0.0);
    let mut previous = animation.step(0).value;
    let mut frame = 0;

    loop {
        frame += 1;
        let sample = animation.step(frame * FRAME_NANOS);
        assert!(sample.value >= previous, "spring moved backwards at frame {frame}");
        assert!(sample.value <= 100.0);
        previous = sample.value;
        if sample.finished {
            break;
        }
        assert!(frame < 200, "spring never settled");
    }

    assert_eq!(previous, 100.0);
}

#[test]
fn bouncy_spring_overshoots_target() {
    let mut animation = SpringAnimation::new(SpringSpec::bouncy(), 0.0, 100.0, 0.0);
    animation.step(0);
    let peak = (1..60)
        .map(|frame| animation.step(frame * FRAME_NANOS).value)
        .fold(f32::MIN, f32::max);

    assert!(peak > 100.0);
}

#[test]
fn spring_already_at_target_finishes_on_first_frame() {
    let mut animation = SpringAnimation::new(SpringSpec::default(), 50.0, 50.0, 0.0);
    let frame = animation.step(0);

    assert!(frame.finished);
    assert_eq!(frame.value, 50.0);
}

#[test]
fn animate_delivers_one_step_per_frame_until_finished() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let clock = runtime.frame_clock();
    let values = Rc::new(RefCell::new(Vec::new()));
    let result = Rc::new(Cell::new(None));

    let values_in_task = Rc::clone(&values);
    let result_in_task = Rc::clone(&result);
    runtime
        .handle()
        .spawn_ui(async move {
            let outcome = animate_spring(&clock, SpringSpec::default(), 0.0, 100.0, 0.0, |frame| {
                values_in_task.borrow_mut().push(frame.value);
                FrameControl::Continue
            })
            .await;
            result_in_task.set(Some(outcome));
        })
        .expect("runtime alive");

    runtime.handle().drain_ui();
    pump(&runtime, 200);

    let outcome = result.get().expect("animation finished");
    assert_eq!(outcome.end_reason, AnimationEndReason::Finished);
    assert_eq!(outcome.last_frame.value, 100.0);
    let values = values.borrow();
    assert_eq!(values[0], 0.0);
    assert!(values.len() > 2 && values.len() < 200);
}

#[test]
fn block_can_cancel_the_animation() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let clock = runtime.frame_clock();
    let calls = Rc::new(Cell::new(0));
    let result = Rc::new(Cell::new(None));

    let calls_in_task = Rc::clone(&calls);
    let result_in_task = Rc::clone(&result);
    runtime
        .handle()
        .spawn_ui(async move {
            let spec = SplineBasedDecaySpec::new(1.0);
            let outcome = animate_decay(&clock, spec, 0.0, 4000.0, |_| {
                calls_in_task.set(calls_in_task.get() + 1);
                if calls_in_task.get() == 3 {
                    FrameControl::Cancel
                } else {
                    FrameControl::Continue
                }
            })
            .await;
            result_in_task.set(Some(outcome));
        })
        .expect("runtime alive");

    runtime.handle().drain_ui();
    pump(&runtime, 10);

    let outcome = result.get().expect("animation ended");
    assert!(outcome.is_cancelled());
    assert!(outcome.last_frame.value > 0.0);
    assert_eq!(calls.get(), 3);
}

#[test]
fn cancelling_the_task_stops_frame_delivery() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let clock = runtime.frame_clock();
    let calls = Rc::new(Cell::new(0));

    let calls_in_task = Rc::clone(&calls);
    let task = runtime
        .handle()
        .spawn_ui(async move {
            animate_spring(&clock, SpringSpec::default(), 0.0, 500.0, 0.0, |_| {
                calls_in_task.set(calls_in_task.get() + 1);
                FrameControl::Continue
            })
            .await;
        })
        .expect("runtime alive");

    runtime.handle().drain_ui();
    pump(&runtime, 2);
    task.cancel();
    let seen = calls.get();
    for frame in 3..10 {
        runtime.drain_frame(frame * FRAME_NANOS);
    }

    assert_eq!(seen, 2);
    assert_eq!(calls.get(), seen);
    assert!(!runtime.needs_frame());
}
