use browsesheet_ui_graphics::Offset;
use std::cell::Cell;
use std::rc::Rc;

pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// Pointer event delivered by the host.
///
/// Consumption is shared between clones so an outer handler can tell that an
/// inner one already claimed the event.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerEventKind,
    pub position: Offset,
    /// Host timestamp in milliseconds. When absent, the receiver stamps the
    /// event with its own clock.
    pub uptime_ms: Option<i64>,
    consumed: Rc<Cell<bool>>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Offset) -> Self {
        Self {
            id: 0,
            kind,
            position,
            uptime_ms: None,
            consumed: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_uptime(mut self, uptime_ms: i64) -> Self {
        self.uptime_ms = Some(uptime_ms);
        self
    }

    pub fn with_id(mut self, id: PointerId) -> Self {
        self.id = id;
        self
    }

    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }
}
