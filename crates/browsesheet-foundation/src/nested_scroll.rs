//! Nested scroll arbitration between the sheet and scrollable content inside it.
//!
//! Scroll deltas and fling velocities travel through a parent connection
//! twice: before the child sees them (`pre`) and with whatever the child left
//! unconsumed (`post`). The sheet takes upward motion first while it is not
//! fully expanded, and takes everything the child refuses.

use std::future::Future;
use std::rc::Rc;

use browsesheet_ui_graphics::{Offset, Velocity};

use crate::sheet_state::SheetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedScrollSource {
    /// Direct pointer drag.
    UserInput,
    /// Motion generated by a child animation, such as a list fling.
    SideEffect,
}

/// Parent side of the nested scroll protocol. Every hook returns what the
/// parent consumed.
#[allow(async_fn_in_trait)]
pub trait NestedScrollConnection {
    fn on_pre_scroll(&self, _available: Offset, _source: NestedScrollSource) -> Offset {
        Offset::ZERO
    }

    fn on_post_scroll(
        &self,
        _consumed: Offset,
        _available: Offset,
        _source: NestedScrollSource,
    ) -> Offset {
        Offset::ZERO
    }

    async fn on_pre_fling(&self, _available: Velocity) -> Velocity {
        Velocity::ZERO
    }

    async fn on_post_fling(&self, _consumed: Velocity, _available: Velocity) -> Velocity {
        Velocity::ZERO
    }
}

/// Connects a [`SheetState`] to a nested scroll host.
#[derive(Clone)]
pub struct SheetNestedScrollConnection {
    state: SheetState,
    on_pre_fling: Option<Rc<dyn Fn(f32)>>,
}

impl SheetNestedScrollConnection {
    pub fn new(state: SheetState) -> Self {
        Self {
            state,
            on_pre_fling: None,
        }
    }

    /// Observer for every velocity offered to the sheet before the child.
    pub fn with_pre_fling_observer(mut self, observer: impl Fn(f32) + 'static) -> Self {
        self.on_pre_fling = Some(Rc::new(observer));
        self
    }

    pub fn state(&self) -> &SheetState {
        &self.state
    }

    fn can_expand(&self) -> bool {
        self.state.offset() > self.state.anchors().min_offset
    }

    async fn fling(&self, velocity: f32) -> Velocity {
        let leftover = self.state.perform_fling(velocity).await;
        Velocity::vertical(velocity - leftover)
    }
}

impl NestedScrollConnection for SheetNestedScrollConnection {
    fn on_pre_scroll(&self, available: Offset, source: NestedScrollSource) -> Offset {
        let delta = available.y;
        if delta < 0.0 && self.can_expand() {
            let consumed = self.state.perform_drag(delta);
            log::trace!("pre-scroll {delta} ({source:?}) consumed {consumed}");
            Offset::vertical(consumed)
        } else {
            Offset::ZERO
        }
    }

    fn on_post_scroll(
        &self,
        _consumed: Offset,
        available: Offset,
        source: NestedScrollSource,
    ) -> Offset {
        let consumed = self.state.perform_drag(available.y);
        log::trace!("post-scroll {} ({source:?}) consumed {consumed}", available.y);
        Offset::vertical(consumed)
    }

    async fn on_pre_fling(&self, available: Velocity) -> Velocity {
        let velocity = available.y;
        if let Some(observer) = &self.on_pre_fling {
            observer(velocity);
        }
        if velocity < 0.0 && self.can_expand() {
            log::debug!("pre-fling {velocity} taken by sheet");
            self.fling(velocity).await
        } else {
            Velocity::ZERO
        }
    }

    async fn on_post_fling(&self, _consumed: Velocity, available: Velocity) -> Velocity {
        log::debug!("post-fling {}", available.y);
        self.fling(available.y).await
    }
}

/// Drives the full pre, child, post protocol for hosts that have no nested
/// scroll dispatcher of their own.
pub struct GestureArbiter<C: NestedScrollConnection> {
    connection: C,
}

impl<C: NestedScrollConnection> GestureArbiter<C> {
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Offers `delta` to the parent, then the child, then the parent again.
    /// `child` returns what it consumed. Returns the total consumed.
    pub fn dispatch_scroll(
        &self,
        delta: Offset,
        source: NestedScrollSource,
        child: impl FnOnce(Offset) -> Offset,
    ) -> Offset {
        let pre = self.connection.on_pre_scroll(delta, source);
        let available = delta - pre;
        let by_child = child(available);
        let post = self
            .connection
            .on_post_scroll(by_child, available - by_child, source);
        pre + by_child + post
    }

    /// Fling counterpart of [`GestureArbiter::dispatch_scroll`].
    pub async fn dispatch_fling<F, Fut>(&self, velocity: Velocity, child: F) -> Velocity
    where
        F: FnOnce(Velocity) -> Fut,
        Fut: Future<Output = Velocity>,
    {
        let pre = self.connection.on_pre_fling(velocity).await;
        let available = velocity - pre;
        let by_child = child(available).await;
        let post = self
            .connection
            .on_post_fling(by_child, available - by_child)
            .await;
        pre + by_child + post
    }
}
