use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use smallvec::SmallVec;

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;

pub type FrameCallbackId = u64;

/// Upper bound on executor passes per [`RuntimeHandle::drain_ui`] call.
const MAX_DRAIN_PASSES: usize = 64;

type LocalFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

struct TaskEntry {
    id: u64,
    future: LocalFuture,
}

pub(crate) struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    tasks: RefCell<Vec<TaskEntry>>,
    live_tasks: RefCell<SmallVec<[u64; 8]>>,
    // Cancellations requested while the task list is checked out for polling.
    cancelled_tasks: RefCell<SmallVec<[u64; 4]>>,
    polling: Cell<bool>,
    next_task_id: Cell<u64>,
    task_waker: Waker,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let task_waker = RuntimeTaskWaker::new(scheduler.clone()).into_waker();
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            tasks: RefCell::new(Vec::new()),
            live_tasks: RefCell::new(SmallVec::new()),
            cancelled_tasks: RefCell::new(SmallVec::new()),
            polling: Cell::new(false),
            next_task_id: Cell::new(1),
            task_waker,
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty()
    }

    fn has_pending_tasks(&self) -> bool {
        !self.tasks.borrow().is_empty() || self.polling.get()
    }

    fn spawn_ui_task(&self, future: LocalFuture) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.live_tasks.borrow_mut().push(id);
        self.schedule();
        id
    }

    fn retire(&self, id: u64) {
        self.live_tasks.borrow_mut().retain(|live| *live != id);
    }

    fn cancel_task(&self, id: u64) {
        self.retire(id);
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            tasks
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| tasks.remove(index))
        };
        match removed {
            // Dropped outside the borrow: futures may run guards on drop.
            Some(entry) => drop(entry),
            None if self.polling.get() => self.cancelled_tasks.borrow_mut().push(id),
            None => {}
        }
    }

    fn is_task_active(&self, id: u64) -> bool {
        self.live_tasks.borrow().contains(&id)
    }

    /// Polls every live task once. Returns true when a task finished, was
    /// cancelled, or new tasks were spawned during the pass.
    fn poll_tasks(&self) -> bool {
        if self.polling.replace(true) {
            return false;
        }
        let first_unspawned = self.next_task_id.get();
        let mut cx = Context::from_waker(&self.task_waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut pending = Vec::with_capacity(tasks.len());
        let mut finished: Vec<TaskEntry> = Vec::new();
        let mut made_progress = false;

        for mut entry in tasks {
            if self.cancelled_tasks.borrow().contains(&entry.id) {
                finished.push(entry);
                made_progress = true;
                continue;
            }
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    self.retire(entry.id);
                    made_progress = true;
                }
                Poll::Pending => pending.push(entry),
            }
        }

        let cancelled = std::mem::take(&mut *self.cancelled_tasks.borrow_mut());
        let (dropped, kept): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|entry| cancelled.contains(&entry.id));
        made_progress |= !dropped.is_empty();
        finished.extend(dropped);
        self.tasks.borrow_mut().extend(kept);
        self.polling.set(false);

        if !cancelled.is_empty() {
            // Tasks spawned during this pass may already have been cancelled.
            let mut tasks = self.tasks.borrow_mut();
            let (late, live): (Vec<_>, Vec<_>) = std::mem::take(&mut *tasks)
                .into_iter()
                .partition(|entry| cancelled.contains(&entry.id));
            *tasks = live;
            finished.extend(late);
        }
        drop(finished);

        made_progress || self.next_task_id.get() != first_unspawned
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let removed = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .iter()
                .position(|entry| entry.id == id)
                .and_then(|index| callbacks.remove(index))
        };
        drop(removed);
        if !self.has_frame_callbacks() && !self.has_pending_tasks() {
            self.needs_frame.set(false);
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        let pending: Vec<Box<dyn FnOnce(u64) + 'static>> = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .drain(..)
                .filter_map(|mut entry| entry.callback.take())
                .collect()
        };
        for callback in pending {
            callback(frame_time_nanos);
        }
        if !self.has_frame_callbacks() {
            self.needs_frame.set(false);
        }
    }
}

/// Owner of the single-threaded frame loop state.
///
/// A `Runtime` keeps frame callbacks and UI tasks alive; everything else holds
/// a weak [`RuntimeHandle`]. Dropping the runtime drops every pending task.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }

    /// Runs one frame: fires frame callbacks with `frame_time_nanos`, then
    /// polls UI tasks until they stall.
    pub fn drain_frame(&self, frame_time_nanos: u64) {
        self.handle().drain_frame(frame_time_nanos);
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    /// Spawns a future on the UI task list.
    ///
    /// The future is first polled by the next [`RuntimeHandle::drain_ui`]. It
    /// may capture `Rc`/`RefCell` values because it never leaves this thread.
    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn is_task_active(&self, id: u64) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.is_task_active(id))
            .unwrap_or(false)
    }

    /// Polls UI tasks until no further progress is made.
    pub fn drain_ui(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        for _ in 0..MAX_DRAIN_PASSES {
            if !inner.poll_tasks() {
                return;
            }
        }
        log::warn!("drain_ui stopped after {MAX_DRAIN_PASSES} passes with tasks still spawning");
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_tasks())
            .unwrap_or(false)
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    /// Fires frame callbacks, then drains the UI task list.
    pub fn drain_frame(&self, frame_time_nanos: u64) {
        self.drain_frame_callbacks(frame_time_nanos);
        self.drain_ui();
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True until the task completes or is cancelled.
    pub fn is_active(&self) -> bool {
        self.runtime.is_task_active(self.id)
    }

    /// Drops the task's future. Pending frame callbacks it registered are
    /// released by their registrations' drop.
    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl RuntimeTaskWaker {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self { scheduler }
    }

    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.scheduler.schedule_frame();
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
