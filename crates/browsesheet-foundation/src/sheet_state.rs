//! Offset state machine of the sheet.
//!
//! [`SheetState`] owns the vertical offset. Drags move it directly and are
//! clamped to the current anchors; animations and flings move it through the
//! same drag path one frame at a time, and only one of them runs at a time.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use browsesheet_animation::{animate_spring, FrameControl};
use browsesheet_core::{batch_notifications, FrameClock, MutableState, State};

use crate::anchors::{SheetAnchors, SheetValue};
use crate::config::SheetConfig;
use crate::error::SheetError;
use crate::fling::{DefaultFlingBehavior, FlingBehavior, ScrollScope};
use crate::motion::{MotionMutex, MotionToken};

/// How a suspending sheet operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionResult {
    Finished,
    /// Superseded by another motion, stopped, or never started.
    Cancelled,
}

struct SheetStateInner {
    config: SheetConfig,
    clock: FrameClock,
    offset: MutableState<f32>,
    anchors: MutableState<SheetAnchors>,
    is_animating: MutableState<bool>,
    animation_target: MutableState<Option<f32>>,
    motion: MotionMutex,
    // Bumped when a relayout moves a running animation to its remapped target.
    relayouts: Cell<u64>,
    fling_behavior: DefaultFlingBehavior,
    on_dismiss: RefCell<Option<Rc<dyn Fn()>>>,
}

/// Shared handle to one sheet's state. Clones refer to the same sheet.
#[derive(Clone)]
pub struct SheetState {
    inner: Rc<SheetStateInner>,
}

impl SheetState {
    pub fn new(clock: FrameClock) -> Self {
        Self::build(clock, SheetConfig::default())
    }

    pub fn with_config(clock: FrameClock, config: SheetConfig) -> Result<Self, SheetError> {
        config.validate()?;
        Ok(Self::build(clock, config))
    }

    fn build(clock: FrameClock, config: SheetConfig) -> Self {
        Self {
            inner: Rc::new(SheetStateInner {
                fling_behavior: DefaultFlingBehavior::from_config(clock.clone(), &config),
                config,
                clock,
                offset: MutableState::new(0.0),
                anchors: MutableState::new(SheetAnchors::EMPTY),
                is_animating: MutableState::new(false),
                animation_target: MutableState::new(None),
                motion: MotionMutex::new(),
                relayouts: Cell::new(0),
                on_dismiss: RefCell::new(None),
            }),
        }
    }

    /// Called after [`SheetState::dismiss`] brings the sheet to rest at the
    /// dismissed anchor.
    pub fn set_on_dismiss(&self, on_dismiss: impl Fn() + 'static) {
        *self.inner.on_dismiss.borrow_mut() = Some(Rc::new(on_dismiss));
    }

    pub fn config(&self) -> &SheetConfig {
        &self.inner.config
    }

    pub fn frame_clock(&self) -> &FrameClock {
        &self.inner.clock
    }

    pub fn offset(&self) -> f32 {
        self.inner.offset.get()
    }

    pub fn offset_state(&self) -> State<f32> {
        self.inner.offset.as_state()
    }

    pub fn anchors(&self) -> SheetAnchors {
        self.inner.anchors.get()
    }

    pub fn anchors_state(&self) -> State<SheetAnchors> {
        self.inner.anchors.as_state()
    }

    pub fn is_animating(&self) -> bool {
        self.inner.is_animating.get()
    }

    pub fn is_animating_state(&self) -> State<bool> {
        self.inner.is_animating.as_state()
    }

    /// Offset the running animation is heading to.
    pub fn animation_target(&self) -> Option<f32> {
        self.inner.animation_target.get()
    }

    pub fn animation_target_state(&self) -> State<Option<f32>> {
        self.inner.animation_target.as_state()
    }

    /// Anchor role closest to the current offset, `None` before the first
    /// layout.
    pub fn current_value(&self) -> Option<SheetValue> {
        let anchors = self.anchors();
        if anchors.is_empty() {
            return None;
        }
        Some(anchors.nearest_value(self.offset()))
    }

    /// Moves the offset by `delta`, clamped to the anchors, and returns the
    /// part of `delta` that was applied.
    pub fn perform_drag(&self, delta: f32) -> f32 {
        if !delta.is_finite() {
            log::warn!("ignoring non-finite drag delta {delta}");
            return 0.0;
        }
        let current = self.offset();
        let clamped = self.anchors().coerce(current + delta);
        let consumed = clamped - current;
        self.inner.offset.set(clamped);
        log::trace!("drag {delta} consumed {consumed} -> {clamped}");
        consumed
    }

    /// Sets the offset without clamping.
    pub fn snap_to_offset(&self, target: f32) {
        self.inner.offset.set(target);
    }

    /// Stops any running animation or fling where it is.
    pub fn stop_motion(&self) {
        self.inner.motion.invalidate();
        batch_notifications(|| {
            self.inner.is_animating.set(false);
            self.inner.animation_target.set(None);
        });
    }

    fn begin_motion(&self, animation_target: Option<f32>) -> MotionToken {
        let token = self.inner.motion.acquire();
        batch_notifications(|| {
            self.inner.is_animating.set(animation_target.is_some());
            self.inner.animation_target.set(animation_target);
        });
        token
    }

    /// Springs the offset to `target`.
    pub async fn animate_to_offset(&self, target: f32) -> MotionResult {
        if !target.is_finite() {
            log::warn!("ignoring animation to non-finite offset {target}");
            return MotionResult::Cancelled;
        }
        let token = self.begin_motion(Some(target));
        let _guard = AnimatingGuard {
            inner: &self.inner,
            token: token.clone(),
        };

        let start = self.offset();
        log::debug!("animating sheet {start} -> {target}");
        let relayouts = self.inner.relayouts.get();
        let mut relaid_out = false;
        let mut previous = start;
        let result = animate_spring(
            &self.inner.clock,
            self.inner.config.spring,
            start,
            target,
            0.0,
            |frame| {
                if !token.is_current() {
                    return FrameControl::Cancel;
                }
                if self.inner.relayouts.get() != relayouts {
                    relaid_out = true;
                    return FrameControl::Cancel;
                }
                self.perform_drag(frame.value - previous);
                previous = frame.value;
                FrameControl::Continue
            },
        )
        .await;

        if !token.is_current() || (result.is_cancelled() && !relaid_out) {
            log::debug!("animation to {target} cancelled at {}", self.offset());
            return MotionResult::Cancelled;
        }
        // A relayout already snapped the offset to the remapped target.
        let target = if relaid_out {
            self.animation_target().unwrap_or(target)
        } else {
            target
        };
        let remaining = target - self.offset();
        if remaining != 0.0 {
            self.perform_drag(remaining);
        }
        MotionResult::Finished
    }

    pub async fn animate_to(&self, value: SheetValue) -> MotionResult {
        let anchors = self.anchors();
        if anchors.is_empty() {
            log::warn!("cannot animate to {value:?} before the first layout");
            return MotionResult::Cancelled;
        }
        self.animate_to_offset(anchors.offset_of(value)).await
    }

    /// Animates to the dismissed anchor and then runs the dismiss callback.
    pub async fn dismiss(&self) -> MotionResult {
        let result = self.animate_to(SheetValue::Dismissed).await;
        if result == MotionResult::Finished {
            log::debug!("sheet dismissed");
            let on_dismiss = self.inner.on_dismiss.borrow().clone();
            if let Some(on_dismiss) = on_dismiss {
                on_dismiss();
            }
        }
        result
    }

    /// Flings with the configured decay and returns the leftover velocity.
    ///
    /// Velocities at or below the noise floor return at once without
    /// disturbing a running motion.
    pub async fn perform_fling(&self, velocity: f32) -> f32 {
        let behavior = &self.inner.fling_behavior;
        if velocity.is_finite() && velocity.abs() <= behavior.noise_floor() {
            return velocity;
        }
        self.perform_fling_with(behavior, velocity).await
    }

    /// Flings with a caller supplied behavior. Supersedes any running motion.
    pub async fn perform_fling_with<B: FlingBehavior>(&self, behavior: &B, velocity: f32) -> f32 {
        let token = self.begin_motion(None);
        let mut scope = SheetScrollScope { state: self, token };
        behavior.perform_fling(&mut scope, velocity).await
    }

    /// Seeds the offset at the collapsed anchor of the first real layout.
    pub fn ensure_init(&self, new_anchors: SheetAnchors) {
        if self.anchors().is_empty() {
            self.inner.offset.set(new_anchors.collapsed_offset);
        }
    }

    /// Carries the offset (or the running animation's target) over to
    /// `new_anchors` by anchor role.
    ///
    /// A running animation ends at the remapped target on its next frame and
    /// reports [`MotionResult::Finished`]. A fling is stopped.
    pub fn process_new_anchors(&self, old_anchors: SheetAnchors, new_anchors: SheetAnchors) {
        if old_anchors.is_empty() || old_anchors == new_anchors {
            return;
        }
        let animation_target = self.animation_target();
        let source = animation_target.unwrap_or_else(|| self.offset());
        let target = old_anchors.corresponding_offset(source, &new_anchors);
        log::debug!("anchors changed, remapping {source} -> {target}");
        if animation_target.is_some() {
            self.inner.relayouts.set(self.inner.relayouts.get() + 1);
            self.inner.animation_target.set(Some(target));
        } else {
            self.stop_motion();
        }
        self.snap_to_offset(target);
    }

    /// Host entry point for a new layout. Observers see the new anchors and
    /// the remapped offset together.
    pub fn on_anchors_changed(&self, new_anchors: SheetAnchors) {
        batch_notifications(|| {
            self.ensure_init(new_anchors);
            let old_anchors = self.anchors();
            self.inner.anchors.set(new_anchors);
            self.process_new_anchors(old_anchors, new_anchors);
        });
    }
}

impl std::fmt::Debug for SheetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetState")
            .field("offset", &self.offset())
            .field("anchors", &self.anchors())
            .field("is_animating", &self.is_animating())
            .finish()
    }
}

/// Clears the animating flags when an animation ends, unless a newer motion
/// already owns them.
struct AnimatingGuard<'a> {
    inner: &'a SheetStateInner,
    token: MotionToken,
}

impl Drop for AnimatingGuard<'_> {
    fn drop(&mut self) {
        if self.token.is_current() {
            batch_notifications(|| {
                self.inner.is_animating.set(false);
                self.inner.animation_target.set(None);
            });
        }
    }
}

struct SheetScrollScope<'a> {
    state: &'a SheetState,
    token: MotionToken,
}

impl ScrollScope for SheetScrollScope<'_> {
    fn scroll_by(&mut self, pixels: f32) -> f32 {
        if !self.token.is_current() {
            return 0.0;
        }
        self.state.perform_drag(pixels)
    }

    fn is_active(&self) -> bool {
        self.token.is_current()
    }
}

#[cfg(test)]
#[path = "tests/sheet_state_tests.rs"]
mod tests;
