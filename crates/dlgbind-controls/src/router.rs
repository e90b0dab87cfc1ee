#![forbid(unsafe_code)]

//! Routes host widget events to the control that registered for them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::host::ControlId;

type Callback = Rc<dyn Fn(i64)>;

/// `ControlId → callback` table filled during control setup.
#[derive(Default)]
pub struct EventRouter {
    handlers: RefCell<AHashMap<ControlId, Callback>>,
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("registered", &self.handlers.borrow().len())
            .finish()
    }
}

impl EventRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route events for `id` to `callback`, replacing any earlier one.
    pub fn register(&self, id: ControlId, callback: impl Fn(i64) + 'static) {
        self.handlers.borrow_mut().insert(id, Rc::new(callback));
    }

    pub fn unregister(&self, id: ControlId) -> bool {
        self.handlers.borrow_mut().remove(&id).is_some()
    }

    /// Deliver a host event. Returns `false` for unregistered identifiers.
    pub fn dispatch(&self, id: ControlId, payload: i64) -> bool {
        let callback = self.handlers.borrow().get(&id).cloned();
        match callback {
            Some(callback) => {
                tracing::trace!(message = "router.dispatch", control = id.0, payload);
                callback(payload);
                true
            }
            None => {
                tracing::warn!(message = "router.unknown_control", control = id.0, payload);
                false
            }
        }
    }

    #[must_use]
    pub fn is_registered(&self, id: ControlId) -> bool {
        self.handlers.borrow().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}
