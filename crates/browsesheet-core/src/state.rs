//! Observable single-writer state cells.
//!
//! A [`MutableState`] is the only place a value lives; readers hold a
//! [`State`] view and may subscribe for change notifications. Writes that must
//! look atomic to observers go through [`batch_notifications`].

use smallvec::SmallVec;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;
type PendingNotification = (usize, Box<dyn FnOnce()>);

struct StateCell<T> {
    value: RefCell<T>,
    observers: RefCell<SmallVec<[(u64, Observer<T>); 2]>>,
    next_observer_id: Cell<u64>,
}

impl<T: Clone + 'static> StateCell<T> {
    fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            observers: RefCell::new(SmallVec::new()),
            next_observer_id: Cell::new(0),
        }
    }

    fn notify_now(&self) {
        let observers: SmallVec<[Observer<T>; 2]> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        if observers.is_empty() {
            return;
        }
        // Observers may write back into this cell.
        let value = self.value.borrow().clone();
        for observer in observers {
            observer(&value);
        }
    }

    fn notify(self: &Rc<Self>) {
        if BATCH_DEPTH.with(Cell::get) == 0 {
            self.notify_now();
            return;
        }
        let key = Rc::as_ptr(self) as *const () as usize;
        let weak: Weak<Self> = Rc::downgrade(self);
        PENDING.with(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.iter().any(|(queued, _)| *queued == key) {
                return;
            }
            pending.push((
                key,
                Box::new(move || {
                    if let Some(cell) = weak.upgrade() {
                        cell.notify_now();
                    }
                }),
            ));
        });
    }

    fn subscribe(self: &Rc<Self>, observer: impl Fn(&T) + 'static) -> StateSubscription {
        let id = self.next_observer_id.get();
        self.next_observer_id.set(id + 1);
        self.observers.borrow_mut().push((id, Rc::new(observer)));
        let weak = Rc::downgrade(self);
        StateSubscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(cell) = weak.upgrade() {
                    cell.observers.borrow_mut().retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }
}

/// Writable observable value.
///
/// Writes use structural equality: setting an equal value is a no-op and
/// notifies nobody.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<StateCell<T>>,
}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateCell::new(value)),
        }
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.value.borrow()
    }

    /// Stores `value` and notifies observers if it differs from the current one.
    pub fn set_value(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.inner.notify();
    }

    pub fn set(&self, value: T) {
        self.set_value(value);
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, changed) = {
            let mut current = self.inner.value.borrow_mut();
            let before = current.clone();
            let result = f(&mut *current);
            (result, *current != before)
        };
        if changed {
            self.inner.notify();
        }
        result
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> StateSubscription {
        self.inner.subscribe(observer)
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Read-only view of a [`MutableState`].
pub struct State<T: Clone + 'static> {
    inner: Rc<StateCell<T>>,
}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn get(&self) -> T {
        self.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> StateSubscription {
        self.inner.subscribe(observer)
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

/// Keeps an observer registered. Dropping it unsubscribes.
#[must_use = "dropping a StateSubscription unsubscribes immediately"]
pub struct StateSubscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl StateSubscription {
    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for StateSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

thread_local! {
    static BATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PENDING: RefCell<Vec<PendingNotification>> = const { RefCell::new(Vec::new()) };
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let depth = BATCH_DEPTH.with(|depth| {
            let next = depth.get() - 1;
            depth.set(next);
            next
        });
        if depth > 0 {
            return;
        }
        let pending = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
        if std::thread::panicking() {
            return;
        }
        for (_, notify) in pending {
            notify();
        }
    }
}

/// Runs `block` with change notifications deferred until it returns.
///
/// Every state written inside the block notifies once, after all writes have
/// landed, so observers never see a half-applied update. Batches nest; only
/// the outermost one flushes.
pub fn batch_notifications<R>(block: impl FnOnce() -> R) -> R {
    BATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let _guard = BatchGuard;
    block()
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
