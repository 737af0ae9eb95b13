//! Platform abstraction for the Browsesheet runtime.
//!
//! The host owns the render loop. The runtime only asks it for another frame
//! and expects [`crate::Runtime::drain_frame`] to be called when it arrives.

/// Schedules work for the runtime.
///
/// Implementations are responsible for triggering frame processing on behalf
/// of the runtime. They must be safe to use from multiple threads because the
/// task waker may be cloned across threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
