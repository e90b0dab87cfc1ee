#![forbid(unsafe_code)]

//! Executable actions with a dependency-driven executability predicate.

use std::fmt;
use std::rc::Rc;

use crate::event::{Event, Subscription};
use crate::method::{Dependency, watch_all};

struct CommandInner {
    action: Box<dyn Fn()>,
    can_execute: Option<Box<dyn Fn() -> bool>>,
    changed: Event<()>,
    _dependencies: Vec<Subscription>,
}

/// An action plus an optional "can execute" predicate.
///
/// `can_execute_changed` fires on every raw dependency change; consumers
/// re-poll [`can_execute`](ObservableCommand::can_execute). Executability is
/// never cached.
///
/// Cloning an `ObservableCommand` creates a new handle to the **same** command.
#[derive(Clone)]
pub struct ObservableCommand {
    inner: Rc<CommandInner>,
}

impl fmt::Debug for ObservableCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCommand")
            .field("guarded", &self.inner.can_execute.is_some())
            .field("dependencies", &self.inner._dependencies.len())
            .finish()
    }
}

impl ObservableCommand {
    /// A command that can always execute.
    pub fn new(action: impl Fn() + 'static) -> Self {
        Self::build(Box::new(action), None, &[])
    }

    /// A command guarded by `can_execute`, re-announced whenever any of
    /// `dependencies` changes.
    pub fn guarded(
        action: impl Fn() + 'static,
        can_execute: impl Fn() -> bool + 'static,
        dependencies: &[&dyn Dependency],
    ) -> Self {
        Self::build(Box::new(action), Some(Box::new(can_execute)), dependencies)
    }

    fn build(
        action: Box<dyn Fn()>,
        can_execute: Option<Box<dyn Fn() -> bool>>,
        dependencies: &[&dyn Dependency],
    ) -> Self {
        let changed = Event::new();
        let subscriptions = watch_all(dependencies, &changed);
        Self {
            inner: Rc::new(CommandInner {
                action,
                can_execute,
                changed,
                _dependencies: subscriptions,
            }),
        }
    }

    /// `true` without a predicate, else the predicate's current result.
    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.inner.can_execute.as_ref().is_none_or(|predicate| predicate())
    }

    /// Run the action if [`can_execute`](Self::can_execute) holds right now.
    ///
    /// Returns whether the action ran.
    pub fn execute(&self) -> bool {
        if !self.can_execute() {
            tracing::debug!(message = "command.skipped");
            return false;
        }
        (self.inner.action)();
        true
    }

    /// Raised once per dependency change.
    #[must_use]
    pub fn can_execute_changed_event(&self) -> &Event<()> {
        &self.inner.changed
    }

    /// Shorthand for `can_execute_changed_event().observe(..)`.
    pub fn on_can_execute_changed(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.changed.observe(move |_| f())
    }

    /// Raise `can_execute_changed` explicitly.
    pub fn notify(&self) {
        self.inner.changed.raise(&());
    }

    /// Whether two handles refer to the same command.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ObservableField;
    use std::cell::Cell;

    #[test]
    fn unguarded_command_always_executes() {
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let command = ObservableCommand::new(move || r.set(r.get() + 1));
        assert!(command.can_execute());
        assert!(command.execute());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn predicate_is_rechecked_at_call_time() {
        let enabled = ObservableField::new(false);
        let runs = Rc::new(Cell::new(0));
        let r = Rc::clone(&runs);
        let e = enabled.clone();
        let command =
            ObservableCommand::guarded(move || r.set(r.get() + 1), move || e.get(), &[&enabled]);

        assert!(!command.execute());
        enabled.set(true);
        assert!(command.execute());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn can_execute_changed_fires_per_raw_change() {
        let count = ObservableField::new(1);
        let c = count.clone();
        let command = ObservableCommand::guarded(|| {}, move || c.get() > 0, &[&count]);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = command.on_can_execute_changed(move || h.set(h.get() + 1));

        // Predicate stays true across both transitions; both still fire.
        count.set(2);
        count.set(3);
        assert_eq!(hits.get(), 2);
        assert!(command.can_execute());
    }
}
