#![forbid(unsafe_code)]

//! Callables whose meta-state depends on observable values.
//!
//! An [`ObservableMethod<R>`] wraps a zero-argument function and a set of
//! [`Dependency`] observables. Whenever any dependency reports a change, the
//! method raises its own changed event so consumers (typically enable/disable
//! logic) can call [`apply`](ObservableMethod::apply) again.
//!
//! # Invariants
//!
//! 1. The changed event fires exactly once per raw dependency notification.
//!    Nothing is deduplicated or batched, even if the wrapped function would
//!    return the same result.
//! 2. Construction never raises the changed event.
//! 3. Dropping the last handle to a method unsubscribes it from every
//!    dependency.

use std::fmt;
use std::rc::Rc;

use crate::event::{Event, Subscription};
use crate::field::ObservableField;
use crate::list::ObservableList;

/// Something a method or command can depend on.
///
/// Fields report through their change event; lists through both their
/// changed and reordered events.
pub trait Dependency {
    /// Call `notify` on every change and return the guards keeping it
    /// registered.
    fn watch(&self, notify: Rc<dyn Fn()>) -> Vec<Subscription>;
}

impl<T: Clone + PartialEq + 'static> Dependency for ObservableField<T> {
    fn watch(&self, notify: Rc<dyn Fn()>) -> Vec<Subscription> {
        vec![self.subscribe(move |_| notify())]
    }
}

impl<T: Clone + PartialEq + 'static> Dependency for ObservableList<T> {
    fn watch(&self, notify: Rc<dyn Fn()>) -> Vec<Subscription> {
        let on_reorder = Rc::clone(&notify);
        vec![
            self.on_changed(move |_| notify()),
            self.on_reordered(move || on_reorder()),
        ]
    }
}

/// Subscribe `event` to every dependency.
pub(crate) fn watch_all(dependencies: &[&dyn Dependency], event: &Event<()>) -> Vec<Subscription> {
    let event = event.clone();
    let notify: Rc<dyn Fn()> = Rc::new(move || event.raise(&()));
    dependencies
        .iter()
        .flat_map(|dep| dep.watch(Rc::clone(&notify)))
        .collect()
}

struct MethodInner<R> {
    method: Box<dyn Fn() -> R>,
    changed: Event<()>,
    _dependencies: Vec<Subscription>,
}

/// A zero-argument callable plus a "changed" event driven by dependencies.
///
/// Cloning an `ObservableMethod` creates a new handle to the **same** method.
pub struct ObservableMethod<R> {
    inner: Rc<MethodInner<R>>,
}

impl<R> Clone for ObservableMethod<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for ObservableMethod<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableMethod")
            .field("dependencies", &self.inner._dependencies.len())
            .finish()
    }
}

impl<R: 'static> ObservableMethod<R> {
    /// Wrap `method`, re-announcing whenever any of `dependencies` changes.
    pub fn new(method: impl Fn() -> R + 'static, dependencies: &[&dyn Dependency]) -> Self {
        let changed = Event::new();
        let subscriptions = watch_all(dependencies, &changed);
        Self {
            inner: Rc::new(MethodInner {
                method: Box::new(method),
                changed,
                _dependencies: subscriptions,
            }),
        }
    }

    /// Invoke the wrapped callable.
    pub fn apply(&self) -> R {
        (self.inner.method)()
    }

    /// Raised once per dependency change.
    #[must_use]
    pub fn method_changed_event(&self) -> &Event<()> {
        &self.inner.changed
    }

    /// Shorthand for `method_changed_event().observe(..)`.
    pub fn on_changed(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.changed.observe(move |_| f())
    }

    /// Raise the changed event explicitly.
    pub fn notify(&self) {
        self.inner.changed.raise(&());
    }

    /// Whether two handles refer to the same method.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter(method: &ObservableMethod<i32>) -> (Rc<Cell<u32>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = method.on_changed(move || h.set(h.get() + 1));
        (hits, sub)
    }

    #[test]
    fn apply_invokes_wrapped_callable() {
        let width = ObservableField::new(3);
        let w = width.clone();
        let area = ObservableMethod::new(move || w.get() * 2, &[&width]);
        assert_eq!(area.apply(), 6);
        width.set(5);
        assert_eq!(area.apply(), 10);
    }

    #[test]
    fn fires_once_per_field_change_without_debouncing() {
        let flag = ObservableField::new(1);
        let f = flag.clone();
        let positive = ObservableMethod::new(move || f.get(), &[&flag]);
        let (hits, _sub) = counter(&positive);
        assert_eq!(hits.get(), 0);
        flag.set(2);
        flag.set(3);
        flag.set(3);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn list_dependency_reports_changes_and_reorders() {
        let items = ObservableList::from_vec(vec![2, 1]);
        let i = items.clone();
        let len = ObservableMethod::new(move || i.len() as i32, &[&items]);
        let (hits, _sub) = counter(&len);
        items.push(3);
        items.sort();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn suspended_list_dependency_fires_once_on_resume() {
        let items = ObservableList::from_vec(vec![1]);
        let method = ObservableMethod::new(|| 0, &[&items]);
        let (hits, _sub) = counter(&method);
        items.suspend_events();
        items.push(2);
        items.push(3);
        items.resume_events();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dropping_method_releases_dependencies() {
        let flag = ObservableField::new(0);
        let method = ObservableMethod::new(|| 0, &[&flag]);
        assert_eq!(flag.field_changed_event().handler_count(), 1);
        drop(method);
        assert_eq!(flag.field_changed_event().handler_count(), 0);
    }

    #[test]
    fn notify_raises_explicitly() {
        let method = ObservableMethod::new(|| 0, &[]);
        let (hits, _sub) = counter(&method);
        method.notify();
        assert_eq!(hits.get(), 1);
    }
}
