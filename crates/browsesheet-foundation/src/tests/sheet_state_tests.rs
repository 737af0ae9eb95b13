use super::*;

use browsesheet_core::{DefaultScheduler, Runtime};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::sync::Arc;

const FRAME_NANOS: u64 = 16_666_667;

fn anchors(min: f32, full_width: f32, collapsed: f32, max: f32) -> SheetAnchors {
    SheetAnchors::new(min, full_width, collapsed, max).expect("valid anchors")
}

struct Harness {
    runtime: Runtime,
    state: SheetState,
    frame: u64,
}

impl Harness {
    fn new() -> Self {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let state = SheetState::new(runtime.frame_clock());
        Self {
            runtime,
            state,
            frame: 0,
        }
    }

    fn laid_out() -> Self {
        let harness = Self::new();
        harness
            .state
            .on_anchors_changed(anchors(0.0, 20.0, 30.0, 100.0));
        harness
    }

    fn launch<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> Rc<RefCell<Option<T>>> {
        let slot = Rc::new(RefCell::new(None));
        let slot_in_task = Rc::clone(&slot);
        self.runtime
            .handle()
            .spawn_ui(async move {
                let value = future.await;
                *slot_in_task.borrow_mut() = Some(value);
            })
            .expect("runtime alive");
        self.runtime.handle().drain_ui();
        slot
    }

    fn advance(&mut self, frames: u64) {
        for _ in 0..frames {
            self.frame += 1;
            self.runtime.drain_frame(self.frame * FRAME_NANOS);
        }
    }
}

#[test]
fn first_layout_seeds_collapsed_offset() {
    let harness = Harness::laid_out();

    assert_eq!(harness.state.offset(), 30.0);
    assert_eq!(harness.state.current_value(), Some(SheetValue::Collapsed));
}

#[test]
fn offset_starts_unset_before_layout() {
    let harness = Harness::new();

    assert!(harness.state.anchors().is_empty());
    assert_eq!(harness.state.current_value(), None);
}

#[test]
fn drag_before_layout_cannot_go_above_zero() {
    let harness = Harness::new();

    assert_eq!(harness.state.perform_drag(-50.0), 0.0);
    assert_eq!(harness.state.offset(), 0.0);
    assert_eq!(harness.state.perform_drag(40.0), 40.0);
}

#[test]
fn drag_is_clamped_and_reports_consumption() {
    let harness = Harness::laid_out();
    let state = &harness.state;

    assert_eq!(state.perform_drag(-50.0), -30.0);
    assert_eq!(state.offset(), 0.0);
    assert_eq!(state.perform_drag(500.0), 100.0);
    assert_eq!(state.offset(), 100.0);

    for delta in [-7.5, 3.25, -120.0, 64.0, 0.0, 999.0, -0.125] {
        let before = state.offset();
        let consumed = state.perform_drag(delta);
        let after = state.offset();
        assert!((0.0..=100.0).contains(&after));
        assert_eq!(after - before, consumed);
    }
}

#[test]
fn non_finite_drag_is_ignored() {
    let harness = Harness::laid_out();

    assert_eq!(harness.state.perform_drag(f32::NAN), 0.0);
    assert_eq!(harness.state.offset(), 30.0);
}

#[test]
fn anchor_change_moves_offset_sitting_on_an_anchor() {
    let harness = Harness::laid_out();

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));

    assert_eq!(harness.state.offset(), 35.0);
}

#[test]
fn anchor_change_preserves_offset_between_anchors() {
    let harness = Harness::laid_out();
    harness.state.perform_drag(-13.0);

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));

    assert_eq!(harness.state.offset(), 17.0);
}

#[test]
fn unchanged_anchors_leave_offset_alone() {
    let harness = Harness::laid_out();
    harness.state.snap_to_offset(30.0);
    let old = harness.state.anchors();

    harness.state.process_new_anchors(old, old);
    harness.state.ensure_init(anchors(0.0, 50.0, 60.0, 200.0));

    assert_eq!(harness.state.offset(), 30.0);
}

#[test]
fn observers_never_see_new_anchors_with_stale_offset() {
    let harness = Harness::laid_out();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_by_observer = Rc::clone(&seen);
    let offset = harness.state.offset_state();
    let _subscription = harness.state.anchors_state().subscribe(move |anchors| {
        seen_by_observer
            .borrow_mut()
            .push((anchors.collapsed_offset, offset.get()));
    });

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));

    assert_eq!(seen.borrow().as_slice(), &[(35.0, 35.0)]);
}

#[test]
fn animate_to_offset_runs_to_target_and_clears_flags() {
    let mut harness = Harness::laid_out();
    let state = harness.state.clone();

    let result = harness.launch(async move { state.animate_to_offset(0.0).await });
    assert!(harness.state.is_animating());
    assert_eq!(harness.state.animation_target(), Some(0.0));

    harness.advance(3);
    let mid = harness.state.offset();
    assert!(mid < 30.0 && mid > 0.0);

    harness.advance(120);
    assert_eq!(*result.borrow(), Some(MotionResult::Finished));
    assert_eq!(harness.state.offset(), 0.0);
    assert!(!harness.state.is_animating());
    assert_eq!(harness.state.animation_target(), None);
}

#[test]
fn dismiss_invokes_callback_at_dismissed_anchor() {
    let mut harness = Harness::laid_out();
    let dismissed = Rc::new(Cell::new(0));
    let dismissed_in_callback = Rc::clone(&dismissed);
    harness
        .state
        .set_on_dismiss(move || dismissed_in_callback.set(dismissed_in_callback.get() + 1));
    let state = harness.state.clone();

    let result = harness.launch(async move { state.dismiss().await });
    harness.advance(120);

    assert_eq!(*result.borrow(), Some(MotionResult::Finished));
    assert_eq!(harness.state.offset(), 100.0);
    assert_eq!(harness.state.current_value(), Some(SheetValue::Dismissed));
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn dismiss_before_layout_is_cancelled() {
    let harness = Harness::new();
    let state = harness.state.clone();

    let result = harness.launch(async move { state.dismiss().await });

    assert_eq!(*result.borrow(), Some(MotionResult::Cancelled));
}

#[test]
fn stop_motion_freezes_animation() {
    let mut harness = Harness::laid_out();
    let state = harness.state.clone();
    let result = harness.launch(async move { state.animate_to_offset(100.0).await });
    harness.advance(3);

    harness.state.stop_motion();
    let frozen = harness.state.offset();
    harness.advance(5);

    assert_eq!(harness.state.offset(), frozen);
    assert_eq!(*result.borrow(), Some(MotionResult::Cancelled));
    assert!(!harness.state.is_animating());
}

#[test]
fn anchor_change_during_animation_snaps_to_remapped_target() {
    let mut harness = Harness::laid_out();
    let state = harness.state.clone();
    let result = harness.launch(async move { state.animate_to(SheetValue::Dismissed).await });
    harness.advance(2);

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));
    assert_eq!(harness.state.offset(), 120.0);
    harness.advance(5);

    assert_eq!(harness.state.offset(), 120.0);
    assert_eq!(*result.borrow(), Some(MotionResult::Finished));
    assert!(!harness.state.is_animating());
    assert_eq!(harness.state.animation_target(), None);
}

#[test]
fn relayout_during_dismiss_still_dismisses() {
    let mut harness = Harness::laid_out();
    let dismissed = Rc::new(Cell::new(0));
    let dismissed_in_callback = Rc::clone(&dismissed);
    harness
        .state
        .set_on_dismiss(move || dismissed_in_callback.set(dismissed_in_callback.get() + 1));
    let state = harness.state.clone();
    let result = harness.launch(async move { state.dismiss().await });
    harness.advance(3);

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));
    assert_eq!(harness.state.animation_target(), Some(120.0));
    harness.advance(120);

    assert_eq!(*result.borrow(), Some(MotionResult::Finished));
    assert_eq!(harness.state.offset(), 120.0);
    assert_eq!(harness.state.current_value(), Some(SheetValue::Dismissed));
    assert_eq!(dismissed.get(), 1);
}

#[test]
fn relayout_during_fling_stops_it() {
    let mut harness = Harness::laid_out();
    harness.state.perform_drag(-13.0);
    let state = harness.state.clone();
    let fling = harness.launch(async move { state.perform_fling(600.0).await });
    harness.advance(3);

    harness
        .state
        .on_anchors_changed(anchors(0.0, 25.0, 35.0, 120.0));
    let remapped = harness.state.offset();
    harness.advance(5);

    assert_eq!(harness.state.offset(), remapped);
    assert!(fling.borrow().is_some());
}

#[test]
fn slow_fling_returns_velocity_and_keeps_animation_running() {
    let mut harness = Harness::laid_out();
    let state = harness.state.clone();
    let animation = harness.launch(async move { state.animate_to_offset(0.0).await });
    harness.advance(2);

    let state = harness.state.clone();
    let fling = harness.launch(async move { state.perform_fling(0.5).await });
    assert_eq!(*fling.borrow(), Some(0.5));
    assert!(harness.state.is_animating());

    harness.advance(120);
    assert_eq!(*animation.borrow(), Some(MotionResult::Finished));
}

#[test]
fn fling_towards_bound_is_monotonic_and_stops_there() {
    let mut harness = Harness::laid_out();
    let offsets = Rc::new(RefCell::new(Vec::new()));
    let offsets_in_observer = Rc::clone(&offsets);
    let _subscription = harness
        .state
        .offset_state()
        .subscribe(move |offset| offsets_in_observer.borrow_mut().push(*offset));
    let state = harness.state.clone();

    let leftover = harness.launch(async move { state.perform_fling(-3000.0).await });
    harness.advance(120);

    let leftover = leftover.borrow().expect("fling finished");
    assert!(leftover < 0.0 && leftover >= -3000.0);
    assert_eq!(harness.state.offset(), 0.0);
    let offsets = offsets.borrow();
    assert!(!offsets.is_empty());
    assert!(offsets.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn new_fling_cancels_previous_without_double_application() {
    let mut harness = Harness::laid_out();
    let state = harness.state.clone();
    let first = harness.launch(async move { state.perform_fling(600.0).await });
    harness.advance(3);
    assert!(harness.state.offset() > 30.0);
    assert!(first.borrow().is_none());

    let state = harness.state.clone();
    let second = harness.launch(async move { state.perform_fling(-600.0).await });
    let before_tick = harness.state.offset();
    harness.advance(1);

    // The superseded fling stops; the new one starts from play time zero.
    assert_eq!(harness.state.offset(), before_tick);
    assert!(first.borrow().is_some());

    harness.advance(3);
    assert!(harness.state.offset() < before_tick);
    harness.advance(60);
    assert!(second.borrow().is_some());
}
