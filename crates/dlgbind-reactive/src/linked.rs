#![forbid(unsafe_code)]

//! Observable lists projected onto a backing model list.
//!
//! # Design
//!
//! A [`LinkedObservableList<M, V>`] exposes an [`ObservableList<V>`] of
//! view-model wrappers over a shared `Vec<M>` of models. Reads go through the
//! observable side; every change notification the observable side raises is
//! replayed onto the backing list with the caller's `unwrap` function, so the
//! two stay the same length and index-aligned after every notification.
//!
//! The mirroring handler is the first one registered on the observable list,
//! so any later subscriber already sees the updated backing list.
//!
//! [`ViewModelList<M, V>`] adds a staged "new item" and an add command whose
//! executability is a caller predicate over the staged item, re-announced
//! whenever any declared dependency of the staged item changes.
//!
//! # Invariants
//!
//! 1. Outside a suspend window, `models.len() == list.len()` and
//!    `models[i] == unwrap(list[i])`.
//! 2. Executing the add command appends the staged item and stages a fresh
//!    one; dependency subscriptions move from the old stage to the new one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::command::ObservableCommand;
use crate::event::Subscription;
use crate::field::ObservableField;
use crate::list::ObservableList;
use crate::method::Dependency;

/// Shared backing storage for a [`LinkedObservableList`].
pub type ModelStore<M> = Rc<RefCell<Vec<M>>>;

struct LinkedInner<M, V> {
    models: ModelStore<M>,
    list: ObservableList<V>,
    _mirror: Vec<Subscription>,
}

/// An observable list of view-models kept in lockstep with a model list.
///
/// Cloning creates a new handle to the **same** pair of lists.
pub struct LinkedObservableList<M, V> {
    inner: Rc<LinkedInner<M, V>>,
}

impl<M, V> Clone for LinkedObservableList<M, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M, V: fmt::Debug> fmt::Debug for LinkedObservableList<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedObservableList")
            .field("list", &self.inner.list)
            .field("models", &self.inner.models.borrow().len())
            .finish()
    }
}

impl<M: 'static, V: Clone + PartialEq + 'static> LinkedObservableList<M, V> {
    /// Project `models` through `wrap`, mirroring observable-side mutations
    /// back through `unwrap`.
    pub fn new(
        models: ModelStore<M>,
        wrap: impl Fn(&M) -> V,
        unwrap: impl Fn(&V) -> M + 'static,
    ) -> Self {
        let list = ObservableList::from_vec(models.borrow().iter().map(wrap).collect());
        let unwrap: Rc<dyn Fn(&V) -> M> = Rc::new(unwrap);

        let on_change = {
            let models = Rc::clone(&models);
            let unwrap = Rc::clone(&unwrap);
            list.on_changed(move |change| {
                let mut models = models.borrow_mut();
                for &index in change.removed.keys().rev() {
                    models.remove(index);
                }
                for (&index, item) in &change.added {
                    models.insert(index, unwrap(item));
                }
            })
        };
        let on_reorder = {
            let models = Rc::clone(&models);
            let view = list.downgrade();
            list.on_reordered(move || {
                let Some(view) = view.upgrade() else {
                    return;
                };
                let rebuilt: Vec<M> = view.with(|items| items.iter().map(|v| unwrap(v)).collect());
                *models.borrow_mut() = rebuilt;
            })
        };

        Self {
            inner: Rc::new(LinkedInner {
                models,
                list,
                _mirror: vec![on_change, on_reorder],
            }),
        }
    }

    /// The observable view-model side.
    #[must_use]
    pub fn list(&self) -> &ObservableList<V> {
        &self.inner.list
    }

    /// The backing model list.
    #[must_use]
    pub fn models(&self) -> ModelStore<M> {
        Rc::clone(&self.inner.models)
    }
}

struct StagingInner<V> {
    new_item: ObservableField<V>,
    staged: RefCell<Vec<Subscription>>,
    dependencies_of: Box<dyn Fn(&V) -> Vec<Box<dyn Dependency>>>,
}

impl<V: Clone + PartialEq + 'static> StagingInner<V> {
    /// Subscribe `command` to the declared dependencies of the staged item,
    /// dropping the subscriptions held on the previous stage.
    fn restage(&self, command: &ObservableCommand) {
        let staged = self.new_item.get();
        let notify: Rc<dyn Fn()> = {
            let command = command.clone();
            Rc::new(move || command.notify())
        };
        let subscriptions: Vec<Subscription> = (self.dependencies_of)(&staged)
            .iter()
            .flat_map(|dep| dep.watch(Rc::clone(&notify)))
            .collect();
        *self.staged.borrow_mut() = subscriptions;
    }
}

/// A [`LinkedObservableList`] with a staged new item and an add command.
pub struct ViewModelList<M, V> {
    linked: LinkedObservableList<M, V>,
    staging: Rc<StagingInner<V>>,
    add_item: ObservableCommand,
    _restage: Subscription,
}

impl<M, V: fmt::Debug> fmt::Debug for ViewModelList<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModelList")
            .field("linked", &self.linked)
            .field("new_item", &self.staging.new_item)
            .finish()
    }
}

impl<M: 'static, V: Clone + PartialEq + 'static> ViewModelList<M, V> {
    /// Build the list.
    ///
    /// - `wrap` / `unwrap` project between models and view-models.
    /// - `create_new` builds a fresh staged view-model.
    /// - `can_add` decides whether the staged item may be committed.
    /// - `dependencies_of` names the observables of a staged item that
    ///   `can_add` reads.
    pub fn new(
        models: ModelStore<M>,
        wrap: impl Fn(&M) -> V,
        unwrap: impl Fn(&V) -> M + 'static,
        create_new: impl Fn() -> V + 'static,
        can_add: impl Fn(&V) -> bool + 'static,
        dependencies_of: impl Fn(&V) -> Vec<Box<dyn Dependency>> + 'static,
    ) -> Self {
        let linked = LinkedObservableList::new(models, wrap, unwrap);
        let staging = Rc::new(StagingInner {
            new_item: ObservableField::new(create_new()),
            staged: RefCell::new(Vec::new()),
            dependencies_of: Box::new(dependencies_of),
        });

        // The staged item's own fields end up holding the command, so the
        // command reaches back into the staging area and list weakly.
        let add_item = {
            let list = linked.list().downgrade();
            let action_stage = Rc::downgrade(&staging);
            let predicate_stage = Rc::downgrade(&staging);
            ObservableCommand::guarded(
                move || {
                    let (Some(stage), Some(list)) = (action_stage.upgrade(), list.upgrade()) else {
                        return;
                    };
                    list.push(stage.new_item.get());
                    stage.new_item.set(create_new());
                },
                move || {
                    predicate_stage
                        .upgrade()
                        .is_some_and(|stage| stage.new_item.with(|staged| can_add(staged)))
                },
                &[&staging.new_item],
            )
        };

        staging.restage(&add_item);
        let restage = {
            let weak = Rc::downgrade(&staging);
            let command = add_item.clone();
            staging.new_item.subscribe(move |_| {
                if let Some(staging) = weak.upgrade() {
                    staging.restage(&command);
                }
            })
        };

        Self {
            linked,
            staging,
            add_item,
            _restage: restage,
        }
    }

    /// The observable view-model side.
    #[must_use]
    pub fn list(&self) -> &ObservableList<V> {
        self.linked.list()
    }

    /// The backing model list.
    #[must_use]
    pub fn models(&self) -> ModelStore<M> {
        self.linked.models()
    }

    /// The staged item, replaced after every successful add.
    #[must_use]
    pub fn new_item(&self) -> &ObservableField<V> {
        &self.staging.new_item
    }

    /// Commits the staged item when its predicate allows.
    #[must_use]
    pub fn add_item(&self) -> &ObservableCommand {
        &self.add_item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: ObservableField<String>,
    }

    impl Row {
        fn new(name: &str) -> Self {
            Self {
                name: ObservableField::new(name.to_string()),
            }
        }
    }

    fn rows(names: &[&str]) -> ModelStore<String> {
        Rc::new(RefCell::new(names.iter().map(|s| s.to_string()).collect()))
    }

    fn linked(models: &ModelStore<String>) -> LinkedObservableList<String, Row> {
        LinkedObservableList::new(Rc::clone(models), |m| Row::new(m), |v| v.name.get())
    }

    #[test]
    fn wraps_models_on_construction() {
        let models = rows(&["a", "b"]);
        let list = linked(&models);
        assert_eq!(list.list().len(), 2);
        assert_eq!(list.list().get(1).map(|r| r.name.get()), Some("b".into()));
    }

    #[test]
    fn mutations_mirror_into_models() {
        let models = rows(&["a", "b", "c"]);
        let list = linked(&models);
        list.list().push(Row::new("d"));
        list.list().remove_at(0);
        list.list().insert(1, Row::new("x"));
        assert_eq!(*models.borrow(), vec!["b", "x", "c", "d"]);
        list.list().reverse();
        assert_eq!(*models.borrow(), vec!["d", "c", "x", "b"]);
    }

    #[test]
    fn suspended_batch_mirrors_on_resume() {
        let models = rows(&["a", "b", "c"]);
        let list = linked(&models);
        let view = list.list();
        view.suspend_events();
        view.pop();
        view.push(Row::new("z"));
        view.remove_at(0);
        view.resume_events();
        assert_eq!(*models.borrow(), vec!["b", "z"]);
    }

    #[test]
    fn later_subscribers_see_mirrored_models() {
        let models = rows(&["a"]);
        let list = linked(&models);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let m = Rc::clone(&models);
        let _sub = list.list().on_changed(move |_| s.set(m.borrow().len()));
        list.list().push(Row::new("b"));
        assert_eq!(seen.get(), 2);
    }

    fn vm_list(models: &ModelStore<String>) -> ViewModelList<String, Row> {
        ViewModelList::new(
            Rc::clone(models),
            |m| Row::new(m),
            |v| v.name.get(),
            || Row::new(""),
            |staged| !staged.name.get().is_empty(),
            |staged| vec![Box::new(staged.name.clone()) as Box<dyn Dependency>],
        )
    }

    #[test]
    fn add_command_tracks_staged_item() {
        let models = rows(&[]);
        let list = vm_list(&models);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = list
            .add_item()
            .on_can_execute_changed(move || h.set(h.get() + 1));

        assert!(!list.add_item().can_execute());
        list.new_item().with(|staged| staged.name.set("first".into()));
        assert_eq!(hits.get(), 1);
        assert!(list.add_item().can_execute());
    }

    #[test]
    fn executing_add_commits_and_restages() {
        let models = rows(&["a"]);
        let list = vm_list(&models);
        let first_stage = list.new_item().get();
        first_stage.name.set("b".into());
        assert!(list.add_item().execute());

        assert_eq!(*models.borrow(), vec!["a", "b"]);
        assert_eq!(list.list().len(), 2);
        assert!(!list.add_item().can_execute());

        // The committed item no longer drives the add command.
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = list
            .add_item()
            .on_can_execute_changed(move || h.set(h.get() + 1));
        first_stage.name.set("renamed".into());
        assert_eq!(hits.get(), 0);
        list.new_item().with(|staged| staged.name.set("c".into()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn empty_stage_cannot_be_added() {
        let models = rows(&[]);
        let list = vm_list(&models);
        assert!(!list.add_item().execute());
        assert!(models.borrow().is_empty());
    }
}
