#![forbid(unsafe_code)]

//! Minimal synchronous publish/subscribe.
//!
//! # Design
//!
//! An [`Event<A>`] owns an insertion-ordered list of handlers. Raising the
//! event calls every handler with a shared reference to the arguments, on the
//! caller's stack, before `raise` returns.
//!
//! Handlers can be registered two ways:
//!
//! - [`Event::subscribe`] / [`Event::unsubscribe`] take a [`Handler`] and use
//!   its `Rc` identity, so adding the same handler twice or removing an absent
//!   one is a no-op.
//! - [`Event::observe`] wraps a closure and returns a [`Subscription`] guard
//!   that removes the closure when dropped.
//!
//! # Re-entrancy
//!
//! `raise` dispatches over a snapshot of the handler list and holds no
//! borrow while a handler runs, so handlers may subscribe, unsubscribe, or
//! raise further events. A handler removed mid-dispatch is skipped if it has
//! not run yet; a handler added mid-dispatch first runs on the next raise.
//!
//! # Failure Modes
//!
//! - **Handler panics**: the panic propagates out of `raise`; remaining
//!   handlers of that dispatch do not run.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A shared event handler. Identity (`Rc::ptr_eq`) is what
/// [`Event::subscribe`] deduplicates on.
pub type Handler<A> = Rc<dyn Fn(&A)>;

struct Slot<A> {
    id: u64,
    handler: Handler<A>,
}

struct EventInner<A> {
    slots: RefCell<Vec<Slot<A>>>,
    next_id: Cell<u64>,
}

impl<A> EventInner<A> {
    fn push(&self, handler: Handler<A>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.slots.borrow_mut().push(Slot { id, handler });
        id
    }

    fn remove(&self, id: u64) {
        self.slots.borrow_mut().retain(|slot| slot.id != id);
    }

    fn contains(&self, id: u64) -> bool {
        self.slots.borrow().iter().any(|slot| slot.id == id)
    }
}

/// An insertion-ordered set of handlers invoked synchronously by
/// [`raise`](Event::raise).
///
/// Cloning an `Event` creates a new handle to the **same** handler list.
pub struct Event<A> {
    inner: Rc<EventInner<A>>,
}

impl<A> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self {
            inner: Rc::new(EventInner {
                slots: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.inner.slots.borrow().len())
            .finish()
    }
}

impl<A: 'static> Event<A> {
    /// Create an event with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` unless it is already registered.
    ///
    /// Returns `true` if the handler was added.
    pub fn subscribe(&self, handler: &Handler<A>) -> bool {
        let present = self
            .inner
            .slots
            .borrow()
            .iter()
            .any(|slot| Rc::ptr_eq(&slot.handler, handler));
        if present {
            return false;
        }
        self.inner.push(Rc::clone(handler));
        true
    }

    /// Remove `handler` if registered.
    ///
    /// Returns `true` if the handler was present.
    pub fn unsubscribe(&self, handler: &Handler<A>) -> bool {
        let mut slots = self.inner.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|slot| !Rc::ptr_eq(&slot.handler, handler));
        slots.len() != before
    }

    /// Register a closure and return a guard that removes it on drop.
    pub fn observe(&self, f: impl Fn(&A) + 'static) -> Subscription {
        let id = self.inner.push(Rc::new(f));
        let weak: Weak<EventInner<A>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
        })
    }

    /// Invoke every registered handler with `args`, in registration order.
    pub fn raise(&self, args: &A) {
        let snapshot: Vec<(u64, Handler<A>)> = self
            .inner
            .slots
            .borrow()
            .iter()
            .map(|slot| (slot.id, Rc::clone(&slot.handler)))
            .collect();
        tracing::trace!(message = "event.raise", handlers = snapshot.len());
        for (id, handler) in snapshot {
            if self.inner.contains(id) {
                handler(args);
            }
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    /// Whether two handles refer to the same event.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// RAII guard for a registered handler.
///
/// Dropping the guard unsubscribes. [`detach`](Subscription::detach) leaves
/// the handler registered for the lifetime of the event instead.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard that owns nothing.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Keep the handler registered for as long as the event lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    /// Whether this guard still owns a handler.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
