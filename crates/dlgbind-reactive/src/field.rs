#![forbid(unsafe_code)]

//! A single observable value cell.
//!
//! # Invariants
//!
//! 1. [`ObservableField::set`] raises the change event iff the new value is
//!    unequal (`PartialEq`) to the stored one.
//! 2. The new value is stored **before** the event is raised, so handlers
//!    reading the field observe the new value.
//! 3. The event carries `(old, new)` in that order.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::event::{Event, Subscription};

/// Payload of a field change: the value before and after the assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange<T> {
    pub old: T,
    pub new: T,
}

struct FieldInner<T> {
    value: RefCell<T>,
    changed: Event<FieldChange<T>>,
}

/// A shared, observable value.
///
/// Cloning an `ObservableField` creates a new handle to the **same** cell.
pub struct ObservableField<T> {
    inner: Rc<FieldInner<T>>,
}

impl<T> Clone for ObservableField<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableField")
            .field("value", &self.inner.value.borrow())
            .finish()
    }
}

/// Fields compare by identity: two handles are equal iff they share a cell.
impl<T> PartialEq for ObservableField<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ObservableField<T> {}

impl<T: Clone + PartialEq + Default + 'static> Default for ObservableField<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> ObservableField<T> {
    /// Create a field holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(FieldInner {
                value: RefCell::new(value),
                changed: Event::new(),
            }),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` assigns to this same field.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Assign `value`, raising the change event if it differs from the
    /// current value.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut slot = self.inner.value.borrow_mut();
            if *slot == value {
                return false;
            }
            std::mem::replace(&mut *slot, value.clone())
        };
        self.inner.changed.raise(&FieldChange { old, new: value });
        true
    }

    /// The event raised after every effective assignment.
    #[must_use]
    pub fn field_changed_event(&self) -> &Event<FieldChange<T>> {
        &self.inner.changed
    }

    /// Shorthand for `field_changed_event().observe(f)`.
    pub fn subscribe(&self, f: impl Fn(&FieldChange<T>) + 'static) -> Subscription {
        self.inner.changed.observe(f)
    }

    /// Whether two handles refer to the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
