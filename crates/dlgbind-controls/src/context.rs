#![forbid(unsafe_code)]

//! The data-context chain controls resolve their property names against.
//!
//! # Design
//!
//! Every control owns one [`DataContext`] node whose parent is its data
//! parent's node; the dialog owns the root. A node either inherits its
//! parent's context or is bound to a value of its own.
//!
//! # Invariants
//!
//! 1. Resolution walks from a node towards the root. The first bound object
//!    exposing the name wins; objects without it fall through to the parent.
//! 2. A node bound to `Value::None` stops resolution: the lookup reports
//!    "detached" (`Ok(None)`) rather than an error.
//! 3. Walking past the root is [`BindError::UnknownProperty`].
//! 4. The changed event is only raised explicitly. Controls raise their own
//!    node's event after rebinding, so descendants rebind depth-first.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dlgbind_reactive::{Event, Subscription};

use crate::error::{BindError, Result};
use crate::property::Property;
use crate::value::Value;

/// What a node binds to.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Binding {
    /// Use the parent's context.
    #[default]
    Inherit,
    /// Use this value; `Value::None` detaches.
    Bound(Value),
}

struct ContextInner {
    parent: Option<DataContext>,
    binding: RefCell<Binding>,
    changed: Event<()>,
}

/// A node in the data-context chain.
///
/// Cloning creates a new handle to the **same** node.
#[derive(Clone)]
pub struct DataContext {
    inner: Rc<ContextInner>,
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("binding", &self.inner.binding.borrow())
            .field("depth", &self.depth())
            .finish()
    }
}

impl DataContext {
    /// The unparented node standing in for the dialog.
    #[must_use]
    pub fn root(value: Value) -> Self {
        Self::with_parent(None, Binding::Bound(value))
    }

    /// A new node inheriting from `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()), Binding::Inherit)
    }

    fn with_parent(parent: Option<DataContext>, binding: Binding) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                parent,
                binding: RefCell::new(binding),
                changed: Event::new(),
            }),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<&DataContext> {
        self.inner.parent.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self.parent();
        while let Some(parent) = node {
            depth += 1;
            node = parent.parent();
        }
        depth
    }

    #[must_use]
    pub fn binding(&self) -> Binding {
        self.inner.binding.borrow().clone()
    }

    /// Replace the binding without notifying.
    pub(crate) fn bind(&self, binding: Binding) {
        *self.inner.binding.borrow_mut() = binding;
    }

    /// The effective context value of this node.
    #[must_use]
    pub fn value(&self) -> Value {
        match &*self.inner.binding.borrow() {
            Binding::Bound(value) => value.clone(),
            Binding::Inherit => self.parent().map(Self::value).unwrap_or_default(),
        }
    }

    /// Bind this node to `value` and cascade the change to every descendant.
    ///
    /// Meant for the root; control nodes are rebound by their control.
    pub fn set_value(&self, value: Value) {
        tracing::debug!(message = "context.changed", depth = self.depth());
        self.bind(Binding::Bound(value));
        self.notify_changed();
    }

    /// Resolve `name` against this node and its ancestors.
    ///
    /// `Ok(None)` means the chain is detached at some node.
    pub fn resolve(&self, name: &str) -> Result<Option<Property>> {
        let mut node = Some(self);
        while let Some(current) = node {
            match &*current.inner.binding.borrow() {
                Binding::Bound(Value::None) => return Ok(None),
                Binding::Bound(Value::Object(item)) => {
                    if let Some(property) = item.property(name) {
                        return Ok(Some(property));
                    }
                }
                Binding::Bound(_) | Binding::Inherit => {}
            }
            node = current.parent();
        }
        Err(BindError::unknown_property(name))
    }

    #[must_use]
    pub fn context_changed_event(&self) -> &Event<()> {
        &self.inner.changed
    }

    pub fn on_changed(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.changed.observe(move |_| f())
    }

    pub fn notify_changed(&self) {
        self.inner.changed.raise(&());
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Properties;
    use crate::value::Item;
    use dlgbind_reactive::ObservableField;

    fn object(name: &str, value: &str) -> Value {
        Value::from(Item::new(
            Properties::new().field(name, ObservableField::new(Value::from(value))),
        ))
    }

    fn resolved_text(context: &DataContext, name: &str) -> Option<Value> {
        context
            .resolve(name)
            .ok()
            .flatten()
            .and_then(|p| p.into_field(name).ok())
            .map(|f| f.get())
    }

    #[test]
    fn lookup_falls_through_to_parent() {
        let root = DataContext::root(object("title", "dialog"));
        let child = root.child();
        child.bind(Binding::Bound(object("name", "row")));

        assert_eq!(resolved_text(&child, "name"), Some(Value::from("row")));
        assert_eq!(resolved_text(&child, "title"), Some(Value::from("dialog")));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let root = DataContext::root(object("title", "dialog"));
        let err = root.child().resolve("nope").err();
        assert_eq!(err, Some(BindError::unknown_property("nope")));
    }

    #[test]
    fn none_binding_detaches() {
        let root = DataContext::root(object("title", "dialog"));
        let child = root.child();
        child.bind(Binding::Bound(Value::None));
        let grandchild = child.child();
        assert!(matches!(grandchild.resolve("title"), Ok(None)));
    }

    #[test]
    fn inherit_reports_parent_value() {
        let root = DataContext::root(Value::from(7));
        let child = root.child();
        assert_eq!(child.value(), Value::from(7));
        assert!(!child.is_root());
        assert!(child.parent().is_some_and(|p| p.ptr_eq(&root)));
    }

    #[test]
    fn set_value_raises_changed() {
        let root = DataContext::root(Value::None);
        let hits = Rc::new(std::cell::Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = root.on_changed(move || h.set(h.get() + 1));
        root.set_value(Value::from(1));
        assert_eq!(hits.get(), 1);
        assert_eq!(root.binding(), Binding::Bound(Value::from(1)));
    }
}
