#![forbid(unsafe_code)]

//! An observable ordered sequence with suspend/resume batching.
//!
//! # Design
//!
//! [`ObservableList<T>`] mirrors the usual mutable sequence operations. Every
//! structural mutation raises the *changed* event with a [`ListChange`]:
//! removed items keyed by their index in the list *before* the mutation,
//! added items keyed by their index *after* it. [`reverse`](ObservableList::reverse)
//! and the sort methods raise the *reordered* event instead, with no payload.
//!
//! [`suspend_events`](ObservableList::suspend_events) snapshots the contents
//! and silences both events; [`resume_events`](ObservableList::resume_events)
//! compares the snapshot with the current contents and raises at most one
//! event describing the net effect.
//!
//! # Invariants
//!
//! 1. No event is raised while suspended.
//! 2. Resume raises nothing if the contents are unchanged, a single reordered
//!    event if they are a permutation of the snapshot, and otherwise a single
//!    changed event.
//! 3. Applying a resume diff to the snapshot (removals in descending index
//!    order, then insertions in ascending index order) reproduces the current
//!    contents. When the surviving items kept their relative order the diff
//!    names only the net removals/additions; otherwise it replaces the whole
//!    list.
//! 4. Mutations that change nothing (clearing an empty list, extending with
//!    nothing) raise nothing.
//!
//! # Failure Modes
//!
//! - **Nested suspend / resume without suspend**: panics. Suspension is not
//!   re-entrant.
//! - **Index out of range**: panics, like the corresponding `Vec` method.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::rc::{Rc, Weak};

use crate::event::{Event, Subscription};

/// Granular description of a structural list mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChange<T> {
    /// Removed items, keyed by index in the list before the mutation.
    pub removed: BTreeMap<usize, T>,
    /// Added items, keyed by index in the list after the mutation.
    pub added: BTreeMap<usize, T>,
}

impl<T> Default for ListChange<T> {
    fn default() -> Self {
        Self {
            removed: BTreeMap::new(),
            added: BTreeMap::new(),
        }
    }
}

impl<T> ListChange<T> {
    /// Whether the change carries neither removals nor additions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    fn removed_one(index: usize, item: T) -> Self {
        let mut change = Self::default();
        change.removed.insert(index, item);
        change
    }

    fn added_one(index: usize, item: T) -> Self {
        let mut change = Self::default();
        change.added.insert(index, item);
        change
    }
}

impl<T: Clone> ListChange<T> {
    /// Apply this change to `items`: removals in descending index order,
    /// then insertions in ascending index order.
    pub fn apply_to(&self, items: &mut Vec<T>) {
        for &index in self.removed.keys().rev() {
            items.remove(index);
        }
        for (&index, item) in &self.added {
            items.insert(index, item.clone());
        }
    }
}

/// Net effect of a suspend/resume window.
enum Outcome<T> {
    Unchanged,
    Reordered,
    Changed(ListChange<T>),
}

/// Compare a pre-suspend snapshot with the current contents.
///
/// Items are matched as a multiset: each current item claims the earliest
/// unclaimed equal snapshot item.
fn diff<T: Clone + PartialEq>(before: &[T], after: &[T]) -> Outcome<T> {
    if before == after {
        return Outcome::Unchanged;
    }

    let mut claimed = vec![false; before.len()];
    let mut kept = Vec::with_capacity(after.len());
    let mut added = BTreeMap::new();
    for (index, item) in after.iter().enumerate() {
        let matched = (0..before.len()).find(|&b| !claimed[b] && before[b] == *item);
        match matched {
            Some(b) => {
                claimed[b] = true;
                kept.push(b);
            }
            None => {
                added.insert(index, item.clone());
            }
        }
    }

    let removed: BTreeMap<usize, T> = before
        .iter()
        .enumerate()
        .filter(|(b, _)| !claimed[*b])
        .map(|(b, item)| (b, item.clone()))
        .collect();

    if removed.is_empty() && added.is_empty() {
        return Outcome::Reordered;
    }

    if kept.windows(2).all(|pair| pair[0] < pair[1]) {
        return Outcome::Changed(ListChange { removed, added });
    }

    Outcome::Changed(ListChange {
        removed: before.iter().cloned().enumerate().collect(),
        added: after.iter().cloned().enumerate().collect(),
    })
}

struct ListInner<T> {
    items: RefCell<Vec<T>>,
    snapshot: RefCell<Option<Vec<T>>>,
    changed: Event<ListChange<T>>,
    reordered: Event<()>,
}

/// A shared, observable ordered sequence. Duplicates are allowed.
///
/// Cloning an `ObservableList` creates a new handle to the **same** list.
pub struct ObservableList<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &self.inner.items.borrow())
            .field("suspended", &self.inner.snapshot.borrow().is_some())
            .finish()
    }
}

/// Lists compare by identity: two handles are equal iff they share a list.
impl<T> PartialEq for ObservableList<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ObservableList<T> {}

/// A non-owning handle to an [`ObservableList`], for handlers that must not
/// keep their list alive.
pub struct WeakObservableList<T> {
    inner: Weak<ListInner<T>>,
}

impl<T> Clone for WeakObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakObservableList<T> {
    /// The list, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ObservableList<T>> {
        self.inner.upgrade().map(|inner| ObservableList { inner })
    }
}

impl<T: Clone + PartialEq + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + 'static> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + PartialEq + 'static> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list holding `items`.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(items),
                snapshot: RefCell::new(None),
                changed: Event::new(),
                reordered: Event::new(),
            }),
        }
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Raised after structural mutations with the removed/added index maps.
    #[must_use]
    pub fn list_changed_event(&self) -> &Event<ListChange<T>> {
        &self.inner.changed
    }

    /// Raised after in-place reordering (`reverse`, sorts, or a resume whose
    /// net effect is a permutation).
    #[must_use]
    pub fn list_reordered_event(&self) -> &Event<()> {
        &self.inner.reordered
    }

    /// Shorthand for `list_changed_event().observe(f)`.
    pub fn on_changed(&self, f: impl Fn(&ListChange<T>) + 'static) -> Subscription {
        self.inner.changed.observe(f)
    }

    /// Shorthand for `list_reordered_event().observe(f)`.
    pub fn on_reordered(&self, f: impl Fn() + 'static) -> Subscription {
        self.inner.reordered.observe(move |_| f())
    }

    fn notify_changed(&self, change: ListChange<T>) {
        if change.is_empty() || self.is_suspended() {
            return;
        }
        tracing::trace!(
            message = "list.changed",
            removed = change.removed.len(),
            added = change.added.len()
        );
        self.inner.changed.raise(&change);
    }

    fn notify_reordered(&self) {
        if self.is_suspended() {
            return;
        }
        tracing::trace!(message = "list.reordered");
        self.inner.reordered.raise(&());
    }

    // ── Queries ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// A clone of the item at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// A copy of the current contents, safe to iterate while the list is
    /// mutated.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Access the contents by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this same list.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.items.borrow())
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner.items.borrow().contains(item)
    }

    /// Index of the first item equal to `item`; `None` when absent.
    #[must_use]
    pub fn position(&self, item: &T) -> Option<usize> {
        self.inner.items.borrow().iter().position(|x| x == item)
    }

    /// Number of items equal to `item`.
    #[must_use]
    pub fn count(&self, item: &T) -> usize {
        self.inner
            .items
            .borrow()
            .iter()
            .filter(|x| *x == item)
            .count()
    }

    /// Whether events are currently suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.inner.snapshot.borrow().is_some()
    }

    /// Whether two handles refer to the same list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A non-owning handle to this list.
    #[must_use]
    pub fn downgrade(&self) -> WeakObservableList<T> {
        WeakObservableList {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Replace the item at `index`, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&self, index: usize, item: T) -> T {
        let old = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            assert!(index < len, "set index {index} out of range (len {len})");
            std::mem::replace(&mut items[index], item.clone())
        };
        let mut change = ListChange::removed_one(index, old.clone());
        change.added.insert(index, item);
        self.notify_changed(change);
        old
    }

    /// Append `item`.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            items.push(item.clone());
            items.len() - 1
        };
        self.notify_changed(ListChange::added_one(index, item));
    }

    /// Insert `item` before `index`. An index past the end appends.
    pub fn insert(&self, index: usize, item: T) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            let index = index.min(items.len());
            items.insert(index, item.clone());
            index
        };
        self.notify_changed(ListChange::added_one(index, item));
    }

    /// Remove and return the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&self, index: usize) -> T {
        let item = {
            let mut items = self.inner.items.borrow_mut();
            let len = items.len();
            assert!(index < len, "remove index {index} out of range (len {len})");
            items.remove(index)
        };
        self.notify_changed(ListChange::removed_one(index, item.clone()));
        item
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(self.remove_at(len - 1))
    }

    /// Remove and return the item at `index`, or `None` if out of range.
    pub fn pop_at(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        Some(self.remove_at(index))
    }

    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove(&self, item: &T) -> bool {
        match self.position(item) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Remove every item.
    pub fn clear(&self) {
        let removed: BTreeMap<usize, T> = {
            let mut items = self.inner.items.borrow_mut();
            items.drain(..).enumerate().collect()
        };
        self.notify_changed(ListChange {
            removed,
            added: BTreeMap::new(),
        });
    }

    /// Append every item of `iter`.
    pub fn extend(&self, iter: impl IntoIterator<Item = T>) {
        let added: BTreeMap<usize, T> = {
            let mut items = self.inner.items.borrow_mut();
            let start = items.len();
            let mut added = BTreeMap::new();
            for (offset, item) in iter.into_iter().enumerate() {
                items.push(item.clone());
                added.insert(start + offset, item);
            }
            added
        };
        self.notify_changed(ListChange {
            removed: BTreeMap::new(),
            added,
        });
    }

    /// Keep only the items for which `keep` returns `true`, raising a single
    /// changed event for everything dropped.
    ///
    /// # Panics
    ///
    /// Panics if `keep` accesses this same list.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) {
        let removed: BTreeMap<usize, T> = {
            let mut items = self.inner.items.borrow_mut();
            let mut removed = BTreeMap::new();
            let mut index = 0;
            items.retain(|item| {
                let kept = keep(item);
                if !kept {
                    removed.insert(index, item.clone());
                }
                index += 1;
                kept
            });
            removed
        };
        self.notify_changed(ListChange {
            removed,
            added: BTreeMap::new(),
        });
    }

    /// Replace the whole contents, raising at most one event.
    pub fn replace_all(&self, items: impl IntoIterator<Item = T>) {
        self.suspend_events();
        self.clear();
        self.extend(items);
        self.resume_events();
    }

    /// Reverse the items in place.
    pub fn reverse(&self) {
        self.inner.items.borrow_mut().reverse();
        self.notify_reordered();
    }

    /// Sort the items in place.
    pub fn sort(&self)
    where
        T: Ord,
    {
        self.inner.items.borrow_mut().sort();
        self.notify_reordered();
    }

    /// Sort the items in place with a comparator.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.inner.items.borrow_mut().sort_by(compare);
        self.notify_reordered();
    }

    // ── Batching ────────────────────────────────────────────────────────

    /// Snapshot the contents and silence events until
    /// [`resume_events`](Self::resume_events).
    ///
    /// # Panics
    ///
    /// Panics if events are already suspended.
    pub fn suspend_events(&self) {
        let mut snapshot = self.inner.snapshot.borrow_mut();
        assert!(
            snapshot.is_none(),
            "ObservableList::suspend_events called while already suspended"
        );
        *snapshot = Some(self.inner.items.borrow().clone());
    }

    /// Re-enable events and raise one event describing the net change since
    /// [`suspend_events`](Self::suspend_events), if any.
    ///
    /// # Panics
    ///
    /// Panics if events are not suspended.
    pub fn resume_events(&self) {
        let before = self.inner.snapshot.borrow_mut().take();
        let Some(before) = before else {
            panic!("ObservableList::resume_events called without suspend_events");
        };
        let outcome = {
            let after = self.inner.items.borrow();
            diff(&before, &after)
        };
        match outcome {
            Outcome::Unchanged => {
                tracing::debug!(message = "list.resume", outcome = "unchanged");
            }
            Outcome::Reordered => {
                tracing::debug!(message = "list.resume", outcome = "reordered");
                self.notify_reordered();
            }
            Outcome::Changed(change) => {
                tracing::debug!(
                    message = "list.resume",
                    outcome = "changed",
                    removed = change.removed.len(),
                    added = change.added.len()
                );
                self.notify_changed(change);
            }
        }
    }
}

impl<T: Clone + PartialEq + 'static> AddAssign<Vec<T>> for ObservableList<T> {
    fn add_assign(&mut self, rhs: Vec<T>) {
        self.extend(rhs);
    }
}
