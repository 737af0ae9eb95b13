//! Direct pointer dragging of the sheet.

use browsesheet_core::{RuntimeHandle, TaskHandle};
use web_time::Instant;

use crate::input::{PointerEvent, PointerEventKind};
use crate::sheet_state::SheetState;
use crate::velocity_tracker::VelocityTracker1D;

/// Drag primitives for hosts that run their own gesture detection.
#[derive(Clone)]
pub struct SheetDragDelegate {
    state: SheetState,
}

impl SheetDragDelegate {
    pub fn new(state: SheetState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SheetState {
        &self.state
    }

    /// A drag took over: whatever was moving the sheet stops.
    pub fn on_drag_started(&self) {
        log::debug!("drag started at {}", self.state.offset());
        self.state.stop_motion();
    }

    pub fn on_drag(&self, delta: f32) -> f32 {
        self.state.perform_drag(delta)
    }

    /// Flings with the release velocity and returns what was left over.
    pub async fn on_drag_stopped(&self, velocity: f32) -> f32 {
        log::debug!("drag stopped, velocity {velocity}");
        self.state.perform_fling(velocity).await
    }
}

/// Turns raw pointer events into sheet drags and release flings.
///
/// A press becomes a drag once it travels past the touch slop; only the
/// travel beyond the slop moves the sheet. On release the tracked velocity is
/// flung on the runtime.
pub struct SheetDraggable {
    delegate: SheetDragDelegate,
    runtime: RuntimeHandle,
    tracker: VelocityTracker1D,
    epoch: Instant,
    pressed: bool,
    dragging: bool,
    last_y: f32,
    slop_travel: f32,
    fling_task: Option<TaskHandle>,
}

impl SheetDraggable {
    pub fn new(state: SheetState) -> Self {
        let runtime = state.frame_clock().runtime_handle();
        Self {
            delegate: SheetDragDelegate::new(state),
            runtime,
            tracker: VelocityTracker1D::new(),
            epoch: Instant::now(),
            pressed: false,
            dragging: false,
            last_y: 0.0,
            slop_travel: 0.0,
            fling_task: None,
        }
    }

    pub fn delegate(&self) -> &SheetDragDelegate {
        &self.delegate
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// True while the fling launched by the last release is still running.
    pub fn is_flinging(&self) -> bool {
        self.fling_task
            .as_ref()
            .map(TaskHandle::is_active)
            .unwrap_or(false)
    }

    fn event_time(&self, event: &PointerEvent) -> i64 {
        event
            .uptime_ms
            .unwrap_or_else(|| self.epoch.elapsed().as_millis() as i64)
    }

    /// Handles one pointer event. Returns true when the event belonged to
    /// this sheet's gesture.
    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerEventKind::Down => {
                if event.is_consumed() {
                    return false;
                }
                // Touching the sheet catches it mid-flight.
                if let Some(task) = self.fling_task.take() {
                    task.cancel();
                }
                self.delegate.state.stop_motion();
                self.pressed = true;
                self.dragging = false;
                self.slop_travel = 0.0;
                self.last_y = event.position.y;
                self.tracker.reset();
                self.tracker
                    .add_position(self.event_time(event), event.position.y);
                true
            }
            PointerEventKind::Move => {
                if !self.pressed || event.is_consumed() {
                    return false;
                }
                let y = event.position.y;
                let dy = y - self.last_y;
                self.last_y = y;
                self.tracker.add_position(self.event_time(event), y);

                if self.dragging {
                    self.delegate.on_drag(dy);
                    event.consume();
                    return true;
                }

                self.slop_travel += dy;
                let slop = self.delegate.state.config().touch_slop;
                if self.slop_travel.abs() > slop {
                    self.dragging = true;
                    self.delegate.on_drag_started();
                    let overshoot = self.slop_travel - slop.copysign(self.slop_travel);
                    self.delegate.on_drag(overshoot);
                    event.consume();
                }
                true
            }
            PointerEventKind::Up | PointerEventKind::Cancel => {
                if !self.pressed {
                    return false;
                }
                let was_dragging = self.dragging;
                self.pressed = false;
                self.dragging = false;
                if !was_dragging {
                    return false;
                }

                let velocity = if event.kind == PointerEventKind::Up {
                    let dy = event.position.y - self.last_y;
                    self.last_y = event.position.y;
                    if dy != 0.0 {
                        self.delegate.on_drag(dy);
                    }
                    self.tracker
                        .add_position(self.event_time(event), event.position.y);
                    let max = self.delegate.state.config().max_fling_velocity;
                    self.tracker.velocity_capped(max)
                } else {
                    0.0
                };
                self.tracker.reset();
                event.consume();

                let delegate = self.delegate.clone();
                self.fling_task = self.runtime.spawn_ui(async move {
                    delegate.on_drag_stopped(velocity).await;
                });
                true
            }
        }
    }
}
