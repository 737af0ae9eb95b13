use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

use browsesheet_core::{DefaultScheduler, Runtime, TaskHandle};
use browsesheet_foundation::{
    PointerEvent, PointerEventKind, SheetAnchors, SheetConfig, SheetDraggable, SheetError,
    SheetState, SheetTransform,
};
use browsesheet_ui_graphics::{Offset, Size};

/// Frame interval of a 60Hz display.
pub const FRAME_INTERVAL_NANOS: u64 = 16_666_667;

/// Frames [`SheetTestRule::run_until_idle`] pumps before giving up.
const MAX_IDLE_FRAMES: usize = 600;

/// Spacing of synthetic pointer samples.
const POINTER_SAMPLE_MS: i64 = 8;

/// Headless harness for exercising a sheet in tests.
///
/// `SheetTestRule` owns the runtime and the sheet, lays it out, feeds it
/// pointer input and advances frames at 60fps with deterministic timestamps.
pub struct SheetTestRule {
    runtime: Runtime,
    state: SheetState,
    draggable: SheetDraggable,
    size: Size,
    frame_time_nanos: u64,
    uptime_ms: i64,
}

impl SheetTestRule {
    pub fn new() -> Self {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let state = SheetState::new(runtime.frame_clock());
        Self::with_state(runtime, state)
    }

    pub fn with_config(config: SheetConfig) -> Result<Self, SheetError> {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let state = SheetState::with_config(runtime.frame_clock(), config)?;
        Ok(Self::with_state(runtime, state))
    }

    fn with_state(runtime: Runtime, state: SheetState) -> Self {
        Self {
            draggable: SheetDraggable::new(state.clone()),
            runtime,
            state,
            size: Size::ZERO,
            frame_time_nanos: 0,
            uptime_ms: 0,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn state(&self) -> &SheetState {
        &self.state
    }

    pub fn draggable(&self) -> &SheetDraggable {
        &self.draggable
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.frame_time_nanos
    }

    /// Lays the sheet out in a `width` x `height` box and returns the anchors
    /// it received.
    pub fn layout(&mut self, width: f32, height: f32) -> SheetAnchors {
        self.size = Size::new(width, height);
        let anchors = SheetAnchors::from_max_height_with(height, self.state.config());
        self.state.on_anchors_changed(anchors);
        self.runtime.handle().drain_ui();
        anchors
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn transform(&self) -> SheetTransform {
        SheetTransform::from_state(&self.state, self.size)
    }

    pub fn advance_frame(&mut self) {
        self.frame_time_nanos += FRAME_INTERVAL_NANOS;
        self.uptime_ms = self.uptime_ms.max((self.frame_time_nanos / 1_000_000) as i64);
        self.runtime.drain_frame(self.frame_time_nanos);
    }

    pub fn advance_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.advance_frame();
        }
    }

    /// Advances frames until no frame callbacks or tasks remain and returns
    /// how many frames that took.
    pub fn run_until_idle(&mut self) -> usize {
        let handle = self.runtime.handle();
        for frames in 0..MAX_IDLE_FRAMES {
            if !handle.has_frame_callbacks() && !handle.has_pending_tasks() {
                return frames;
            }
            self.advance_frame();
        }
        panic!("sheet still busy after {MAX_IDLE_FRAMES} frames");
    }

    /// Spawns `future` on the runtime and polls it once.
    pub fn launch<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> Deferred<T> {
        let slot = Rc::new(RefCell::new(None));
        let slot_in_task = Rc::clone(&slot);
        let task = self.runtime.handle().spawn_ui(async move {
            let value = future.await;
            *slot_in_task.borrow_mut() = Some(value);
        });
        self.runtime.handle().drain_ui();
        Deferred { slot, task }
    }

    fn pointer(&mut self, kind: PointerEventKind, y: f32) -> bool {
        let event = PointerEvent::new(kind, Offset::new(self.size.width / 2.0, y))
            .with_uptime(self.uptime_ms);
        let handled = self.draggable.on_pointer_event(&event);
        self.runtime.handle().drain_ui();
        handled
    }

    pub fn pointer_down(&mut self, y: f32) -> bool {
        self.pointer(PointerEventKind::Down, y)
    }

    /// Moves the pointer to `y`, one sample later than the previous event.
    pub fn pointer_move(&mut self, y: f32) -> bool {
        self.uptime_ms += POINTER_SAMPLE_MS;
        self.pointer(PointerEventKind::Move, y)
    }

    pub fn pointer_up(&mut self, y: f32) -> bool {
        self.pointer(PointerEventKind::Up, y)
    }

    pub fn pointer_cancel(&mut self, y: f32) -> bool {
        self.pointer(PointerEventKind::Cancel, y)
    }

    /// Presses at `from_y`, moves to `to_y` in `steps` evenly spaced samples
    /// and releases there.
    pub fn swipe(&mut self, from_y: f32, to_y: f32, steps: usize) {
        let steps = steps.max(1);
        self.pointer_down(from_y);
        for step in 1..=steps {
            let y = from_y + (to_y - from_y) * step as f32 / steps as f32;
            self.pointer_move(y);
        }
        self.pointer_up(to_y);
        log::debug!("swipe {from_y} -> {to_y} released at {}", self.state.offset());
    }
}

impl Default for SheetTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Result slot of a future started with [`SheetTestRule::launch`].
pub struct Deferred<T> {
    slot: Rc<RefCell<Option<T>>>,
    task: Option<TaskHandle>,
}

impl<T> Deferred<T> {
    pub fn is_completed(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(TaskHandle::is_active).unwrap_or(false)
    }

    pub fn take(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }

    /// Drops the future without letting it finish.
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

impl<T: Clone> Deferred<T> {
    pub fn value(&self) -> Option<T> {
        self.slot.borrow().clone()
    }
}
