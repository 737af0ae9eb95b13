use crate::runtime::{FrameCallbackId, RuntimeHandle};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Source of frame ticks for animations.
///
/// Every suspending sheet operation advances exactly one simulation step per
/// frame delivered here, so the host's render loop is the only clock.
#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Runs `callback` with the frame time of the next frame.
    ///
    /// Dropping the returned registration before the frame arrives cancels
    /// the callback.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let runtime = self.runtime.clone();
        match runtime.register_frame_callback(callback) {
            Some(id) => FrameCallbackRegistration::new(runtime, id),
            None => FrameCallbackRegistration::inactive(runtime),
        }
    }

    /// Future resolving to the next frame's time in nanoseconds.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame::new(self.clone())
    }
}

pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    fn new(runtime: RuntimeHandle, id: FrameCallbackId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

#[derive(Default)]
struct NextFrameState {
    registration: Option<FrameCallbackRegistration>,
    time: Option<u64>,
    waker: Option<Waker>,
}

/// Future returned by [`FrameClock::next_frame`].
///
/// The frame callback is registered on first poll, so creating the future
/// without awaiting it costs nothing.
pub struct NextFrame {
    clock: FrameClock,
    state: Rc<RefCell<NextFrameState>>,
}

impl NextFrame {
    fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            state: Rc::new(RefCell::new(NextFrameState::default())),
        }
    }
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let needs_registration = {
            let mut state = self.state.borrow_mut();
            if let Some(time) = state.time {
                return Poll::Ready(time);
            }
            state.waker = Some(cx.waker().clone());
            state.registration.is_none()
        };

        if needs_registration {
            let weak = Rc::downgrade(&self.state);
            let registration = self.clock.with_frame_nanos(move |time| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let waker = {
                    let mut state = state.borrow_mut();
                    state.time = Some(time);
                    // Already fired; forget the id instead of cancelling it.
                    if let Some(mut registration) = state.registration.take() {
                        registration.id = None;
                    }
                    state.waker.take()
                };
                if let Some(waker) = waker {
                    waker.wake();
                }
            });
            self.state.borrow_mut().registration = Some(registration);
        }

        Poll::Pending
    }
}

impl Drop for NextFrame {
    fn drop(&mut self) {
        let registration = self.state.borrow_mut().registration.take();
        drop(registration);
    }
}
