//! Physics core of a draggable, fling-animated bottom sheet.
//!
//! The sheet rests at one of four [`SheetAnchors`]. [`SheetState`] owns the
//! offset; drags, flings and animations all move it through
//! [`SheetState::perform_drag`], which keeps it inside the anchors. Gesture
//! input reaches the state either directly through [`SheetDraggable`] or via
//! nested scrolling with [`SheetNestedScrollConnection`].

mod anchors;
mod config;
mod draggable;
mod error;
mod fling;
pub mod gesture_constants;
mod input;
mod motion;
mod nested_scroll;
mod scale;
mod sheet_state;
pub mod velocity_tracker;

pub use anchors::{SheetAnchors, SheetValue};
pub use config::SheetConfig;
pub use draggable::{SheetDragDelegate, SheetDraggable};
pub use error::SheetError;
pub use fling::{DefaultFlingBehavior, FlingBehavior, ScrollScope};
pub use input::{PointerEvent, PointerEventKind, PointerId};
pub use motion::{MotionMutex, MotionToken};
pub use nested_scroll::{
    GestureArbiter, NestedScrollConnection, NestedScrollSource, SheetNestedScrollConnection,
};
pub use scale::{scale, scale_with_margin, sheet_scale, SheetTransform};
pub use sheet_state::{MotionResult, SheetState};
pub use velocity_tracker::VelocityTracker1D;

pub mod prelude {
    pub use crate::{
        NestedScrollConnection, SheetAnchors, SheetConfig, SheetDraggable, SheetState,
        SheetTransform, SheetValue,
    };
}
