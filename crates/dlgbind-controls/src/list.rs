#![forbid(unsafe_code)]

//! Controls showing an item list with a selection.
//!
//! # Reconciliation
//!
//! The widget's rows mirror the bound items list:
//!
//! - On a changed event, removed rows go first in descending index order,
//!   then added rows in ascending index order, so no index shifts under a
//!   pending operation.
//! - On a reordered event every row is cleared and re-added, then every
//!   selected item is re-selected.
//! - When `data-value` is set each row shows that field of its item and is
//!   rewritten whenever the field changes.
//!
//! # Invariants
//!
//! 1. The selection list only holds items present in the items list. Items
//!    leaving the list are dropped from the selection right after the rows
//!    are reconciled; selecting an absent item panics.
//! 2. A selection change reported by the widget is not echoed back into the
//!    widget.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use dlgbind_reactive::{ListChange, ObservableList, Subscription};

use crate::align::{AlignMode, Alignable, Alignment};
use crate::context::DataContext;
use crate::control::{Control, ControlCore, Toolkit, attach};
use crate::error::{BindError, Result};
use crate::host::{ControlRef, WidgetKind};
use crate::node::ControlNode;
use crate::value::Value;

/// Host payload codes of list widgets.
pub mod codes {
    pub const NO_CHOICE: i64 = -1;
    pub const SELECTION_CHANGED: i64 = -2;
    pub const DRAG_DROP: i64 = -3;
    pub const SORT_COLUMN: i64 = -10;
    pub const DELETE_KEY: i64 = -13;
}

/// A decoded list widget event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// The widget's selection changed; query it.
    SelectionChanged,
    DeleteKey,
    /// Recognised; no behaviour is defined for it.
    DragDrop,
    /// Recognised; no behaviour is defined for it.
    SortColumn,
    /// A pull-down chose a row, or none.
    Choose(Option<usize>),
    Unmapped(i64),
}

impl ListEvent {
    #[must_use]
    pub fn decode_list(payload: i64, delete_key: bool) -> Self {
        match payload {
            codes::SELECTION_CHANGED => Self::SelectionChanged,
            codes::DELETE_KEY if delete_key => Self::DeleteKey,
            codes::DRAG_DROP => Self::DragDrop,
            codes::SORT_COLUMN => Self::SortColumn,
            other => Self::Unmapped(other),
        }
    }

    #[must_use]
    pub fn decode_choice(payload: i64) -> Self {
        match payload {
            codes::NO_CHOICE => Self::Choose(None),
            index => usize::try_from(index).map_or(Self::Unmapped(index), |i| Self::Choose(Some(i))),
        }
    }
}

/// Host widget adapter for a list control.
pub trait ListWidget: 'static {
    const KIND: WidgetKind;

    fn decode(payload: i64) -> ListEvent;
}

struct ListBinding {
    items: ObservableList<Value>,
    selection: ObservableList<Value>,
    /// Row text watches, index-aligned with `items`.
    rows: Vec<Option<Subscription>>,
    _watches: Vec<Subscription>,
}

/// A control bound to an items list and a selection list.
pub struct ListControl<W> {
    core: ControlCore,
    this: Weak<Self>,
    items_name: String,
    selection_name: Option<String>,
    value_name: Option<String>,
    alignment: Alignment,
    state: RefCell<Option<ListBinding>>,
    from_widget: Cell<bool>,
    widget: PhantomData<W>,
}

impl<W> fmt::Debug for ListControl<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListControl")
            .field("core", &self.core)
            .field("items_name", &self.items_name)
            .field("selection_name", &self.selection_name)
            .field("value_name", &self.value_name)
            .field("bound", &self.state.borrow().is_some())
            .finish()
    }
}

impl<W: ListWidget> ListControl<W> {
    pub fn build(
        node: &ControlNode,
        id: ControlRef,
        parent: &DataContext,
        toolkit: &Toolkit,
    ) -> Result<Rc<Self>> {
        let items_name = node.required("data-items")?.to_string();
        let selection_name = node.attribute("data-selected-items").map(str::to_string);
        let value_name = node.attribute("data-value").map(str::to_string);
        let alignment = Alignment::from_node(node, &[AlignMode::Resize, AlignMode::Shift])?;
        let core = ControlCore::new(node, W::KIND, id, parent, toolkit)?;
        attach(Rc::new_cyclic(|this| Self {
            core,
            this: this.clone(),
            items_name,
            selection_name,
            value_name,
            alignment,
            state: RefCell::new(None),
            from_widget: Cell::new(false),
            widget: PhantomData,
        }))
    }

    /// The bound items and selection lists, unless detached.
    #[must_use]
    pub fn lists(&self) -> Option<(ObservableList<Value>, ObservableList<Value>)> {
        self.state
            .borrow()
            .as_ref()
            .map(|binding| (binding.items.clone(), binding.selection.clone()))
    }

    /// Replace the selection with `selection`, raising at most one
    /// notification.
    pub fn change_selection(&self, selection: Vec<Value>) {
        if let Some((_, current)) = self.lists() {
            current.replace_all(selection);
        }
    }

    /// Delete every selected item after the user confirms, then select the
    /// item now at the highest deleted index (clamped to the new end).
    ///
    /// Returns whether anything was deleted.
    pub fn delete_selected(&self) -> bool {
        let Some((items, selection)) = self.lists() else {
            return false;
        };
        let selected = selection.snapshot();
        if selected.is_empty() {
            return false;
        }
        let confirmed = self
            .core
            .host()
            .confirm(&self.core.config().confirm_delete_message);
        tracing::debug!(
            message = "list.delete_selected",
            control = self.core.id().control.0,
            count = selected.len(),
            confirmed
        );
        if !confirmed {
            return false;
        }

        let highest = selected.iter().filter_map(|item| items.position(item)).max();
        items.suspend_events();
        for item in &selected {
            items.remove(item);
        }
        items.resume_events();

        let len = items.len();
        let reselect: Vec<Value> = match highest {
            Some(highest) if len > 0 => items.get(highest.min(len - 1)).into_iter().collect(),
            _ => Vec::new(),
        };
        self.change_selection(reselect);
        true
    }

    fn row_text(&self, item: &Value) -> String {
        let Some(name) = self.value_name.as_deref() else {
            return item.display();
        };
        item.as_item()
            .and_then(|view_model| view_model.property(name))
            .and_then(|property| property.into_field(name).ok())
            .map_or_else(|| item.display(), |field| field.get().display())
    }

    fn watch_row(&self, item: &Value, index: usize) -> Result<Option<Subscription>> {
        let Some(name) = self.value_name.as_deref() else {
            return Ok(None);
        };
        let view_model = item.as_item().ok_or_else(|| BindError::NotAViewModel {
            name: self.items_name.clone(),
            index,
        })?;
        let field = view_model
            .property(name)
            .ok_or_else(|| BindError::unknown_property(name))?
            .into_field(name)?;
        let weak = self.this.clone();
        let item = item.clone();
        Ok(Some(field.subscribe(move |_| {
            if let Some(control) = weak.upgrade() {
                control.on_row_value_changed(&item);
            }
        })))
    }

    /// Like [`watch_row`](Self::watch_row) for rows arriving after bind time,
    /// where there is no caller to report to.
    fn watch_row_logged(&self, item: &Value, index: usize) -> Option<Subscription> {
        self.watch_row(item, index).unwrap_or_else(|err| {
            tracing::error!(
                message = "list.row_bind_failed",
                control = self.core.id().control.0,
                index,
                error = %err
            );
            None
        })
    }

    fn on_row_value_changed(&self, item: &Value) {
        let Some((items, _)) = self.lists() else {
            return;
        };
        let text = self.row_text(item);
        let rows: Vec<usize> = items.with(|values| {
            values
                .iter()
                .enumerate()
                .filter(|(_, value)| *value == item)
                .map(|(index, _)| index)
                .collect()
        });
        for index in rows {
            self.core.host().set_row(self.core.id(), index, &text);
        }
    }

    fn on_items_changed(&self, change: &ListChange<Value>) {
        let host = self.core.host();
        let id = self.core.id();
        let (items, selection) = {
            let mut state = self.state.borrow_mut();
            let Some(binding) = state.as_mut() else {
                return;
            };
            for &index in change.removed.keys().rev() {
                if index < binding.rows.len() {
                    binding.rows.remove(index);
                }
                host.remove_row(id, index);
            }
            for (&index, item) in &change.added {
                let watch = self.watch_row_logged(item, index);
                let at = index.min(binding.rows.len());
                binding.rows.insert(at, watch);
                host.insert_row(id, index, &self.row_text(item));
            }
            (binding.items.clone(), binding.selection.clone())
        };

        // A re-inserted row arrives unselected even if its item still is.
        for (&index, item) in &change.added {
            if selection.contains(item) {
                host.select_row(id, index, true);
            }
        }

        let orphaned = selection.with(|selected| selected.iter().any(|s| !items.contains(s)));
        if orphaned {
            selection.retain(|s| items.contains(s));
        }
    }

    fn on_selection_changed(&self, change: &ListChange<Value>) {
        if self.from_widget.get() {
            return;
        }
        let Some((items, _)) = self.lists() else {
            return;
        };
        let host = self.core.host();
        let id = self.core.id();
        for item in change.removed.values() {
            // Deleted rows are already gone from the widget.
            if let Some(index) = items.position(item) {
                host.select_row(id, index, false);
            }
        }
        for item in change.added.values() {
            let Some(index) = items.position(item) else {
                panic!("selected item {item:?} is not in the items list");
            };
            host.select_row(id, index, true);
        }
    }

    /// Clear the widget and re-add every row and selection.
    fn rebuild_rows(&self) {
        let host = self.core.host();
        let id = self.core.id();
        host.clear_rows(id);
        let (items, selected) = {
            let mut state = self.state.borrow_mut();
            let Some(binding) = state.as_mut() else {
                return;
            };
            let items = binding.items.snapshot();
            binding.rows = items
                .iter()
                .enumerate()
                .map(|(index, item)| self.watch_row_logged(item, index))
                .collect();
            (items, binding.selection.snapshot())
        };
        for (index, item) in items.iter().enumerate() {
            host.insert_row(id, index, &self.row_text(item));
        }
        for item in &selected {
            let Some(index) = items.iter().position(|candidate| candidate == item) else {
                panic!("selected item {item:?} is not in the items list");
            };
            host.select_row(id, index, true);
        }
    }

    /// Apply a selection the widget already shows.
    fn select_from_widget(&self, selection: Vec<Value>) {
        self.from_widget.set(true);
        self.change_selection(selection);
        self.from_widget.set(false);
    }
}

impl<W: ListWidget> Control for ListControl<W> {
    fn core(&self) -> &ControlCore {
        &self.core
    }

    fn bind(&self) -> Result<()> {
        *self.state.borrow_mut() = None;
        let context = self.core.context();
        let Some(property) = context.resolve(&self.items_name)? else {
            return Ok(());
        };
        let items = property.into_list(&self.items_name)?;
        let selection = match self.selection_name.as_deref() {
            Some(name) => match context.resolve(name)? {
                Some(property) => property.into_list(name)?,
                None => return Ok(()),
            },
            None => ObservableList::new(),
        };
        let rows = items.with(|values| {
            values
                .iter()
                .enumerate()
                .map(|(index, item)| self.watch_row(item, index))
                .collect::<Result<Vec<_>>>()
        })?;

        let watches = {
            let on_change = self.this.clone();
            let on_reorder = self.this.clone();
            let on_select = self.this.clone();
            vec![
                items.on_changed(move |change| {
                    if let Some(control) = on_change.upgrade() {
                        control.on_items_changed(change);
                    }
                }),
                items.on_reordered(move || {
                    if let Some(control) = on_reorder.upgrade() {
                        control.rebuild_rows();
                    }
                }),
                selection.on_changed(move |change| {
                    if let Some(control) = on_select.upgrade() {
                        control.on_selection_changed(change);
                    }
                }),
            ]
        };

        *self.state.borrow_mut() = Some(ListBinding {
            items,
            selection,
            rows,
            _watches: watches,
        });
        Ok(())
    }

    fn unbind(&self) {
        *self.state.borrow_mut() = None;
    }

    fn update(&self) {
        self.rebuild_rows();
    }

    fn on_control_event(&self, payload: i64) {
        let Some((items, _)) = self.lists() else {
            return;
        };
        let id = self.core.id();
        match W::decode(payload) {
            ListEvent::SelectionChanged => {
                let rows = self.core.host().selected_rows(id);
                let selection = rows.into_iter().filter_map(|row| items.get(row)).collect();
                self.select_from_widget(selection);
            }
            ListEvent::Choose(row) => {
                let selection = row.and_then(|row| items.get(row)).into_iter().collect();
                self.select_from_widget(selection);
            }
            ListEvent::DeleteKey => {
                self.delete_selected();
            }
            ListEvent::DragDrop | ListEvent::SortColumn => {
                tracing::debug!(message = "list.event_ignored", control = id.control.0, payload);
            }
            ListEvent::Unmapped(code) => {
                tracing::warn!(message = "list.unmapped_event", control = id.control.0, code);
            }
        }
    }

    fn alignable(&self) -> Option<&dyn Alignable> {
        Some(&self.alignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::testing::{id, toolkit};
    use crate::property::Properties;
    use crate::value::Item;
    use crate::widgets::{ChoiceBox, ListBox, ListBrowser};

    fn texts(names: &[&str]) -> Vec<Value> {
        names.iter().map(|name| Value::from(*name)).collect()
    }

    fn bound<W: ListWidget>(
        items: &ObservableList<Value>,
        selection: &ObservableList<Value>,
    ) -> (Rc<crate::control::testing::NullHost>, Rc<ListControl<W>>) {
        let (host, toolkit) = toolkit();
        let root = DataContext::root(Value::from(Item::new(
            Properties::new()
                .list("items", items.clone())
                .list("selected", selection.clone()),
        )));
        let node = ControlNode::new(W::KIND.tag())
            .attr("data-items", "items")
            .attr("data-selected-items", "selected");
        let control = ListControl::<W>::build(&node, id(3), &root, &toolkit).expect("binds");
        (host, control)
    }

    #[test]
    fn decodes_payload_codes() {
        assert_eq!(ListEvent::decode_list(-2, false), ListEvent::SelectionChanged);
        assert_eq!(ListEvent::decode_list(-13, true), ListEvent::DeleteKey);
        assert_eq!(ListEvent::decode_list(-13, false), ListEvent::Unmapped(-13));
        assert_eq!(ListEvent::decode_list(-3, false), ListEvent::DragDrop);
        assert_eq!(ListEvent::decode_list(-10, true), ListEvent::SortColumn);
        assert_eq!(ListEvent::decode_choice(-1), ListEvent::Choose(None));
        assert_eq!(ListEvent::decode_choice(2), ListEvent::Choose(Some(2)));
        assert_eq!(ListEvent::decode_choice(-7), ListEvent::Unmapped(-7));
    }

    #[test]
    fn removed_items_leave_the_selection() {
        let items = ObservableList::from_vec(texts(&["a", "b", "c"]));
        let selection = ObservableList::from_vec(texts(&["b", "c"]));
        let (_host, _control) = bound::<ListBox>(&items, &selection);
        items.remove(&Value::from("b"));
        assert_eq!(selection.snapshot(), texts(&["c"]));
    }

    #[test]
    fn delete_selected_reselects_at_highest_index() {
        let items = ObservableList::from_vec(texts(&["a", "b", "c", "d"]));
        let selection = ObservableList::from_vec(texts(&["b", "d"]));
        let (host, control) = bound::<ListBrowser>(&items, &selection);
        host.confirm.set(true);

        assert!(control.delete_selected());
        assert_eq!(items.snapshot(), texts(&["a", "c"]));
        assert_eq!(selection.snapshot(), texts(&["c"]));
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let items = ObservableList::from_vec(texts(&["a", "b"]));
        let selection = ObservableList::from_vec(texts(&["a"]));
        let (host, control) = bound::<ListBrowser>(&items, &selection);
        host.confirm.set(false);

        assert!(!control.delete_selected());
        assert_eq!(items.len(), 2);
        assert_eq!(selection.snapshot(), texts(&["a"]));
    }

    #[test]
    fn deleting_everything_leaves_empty_selection() {
        let items = ObservableList::from_vec(texts(&["a"]));
        let selection = ObservableList::from_vec(texts(&["a"]));
        let (host, control) = bound::<ListBrowser>(&items, &selection);
        host.confirm.set(true);

        assert!(control.delete_selected());
        assert!(items.is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn choice_payload_selects_single_row() {
        let items = ObservableList::from_vec(texts(&["a", "b"]));
        let selection = ObservableList::new();
        let (_host, control) = bound::<ChoiceBox>(&items, &selection);
        control.on_control_event(1);
        assert_eq!(selection.snapshot(), texts(&["b"]));
        control.on_control_event(codes::NO_CHOICE);
        assert!(selection.is_empty());
    }

    #[test]
    fn missing_selection_attribute_uses_private_list() {
        let (_host, toolkit) = toolkit();
        let items = ObservableList::from_vec(texts(&["a"]));
        let root = DataContext::root(Value::from(Item::new(
            Properties::new().list("items", items.clone()),
        )));
        let node = ControlNode::new("ListBox").attr("data-items", "items");
        let control = ListControl::<ListBox>::build(&node, id(3), &root, &toolkit).expect("binds");
        control.change_selection(texts(&["a"]));
        let private = control.lists().map(|(_, selection)| selection.snapshot());
        assert_eq!(private, Some(texts(&["a"])));
    }

    #[test]
    #[should_panic(expected = "not in the items list")]
    fn selecting_absent_item_panics() {
        let items = ObservableList::from_vec(texts(&["a"]));
        let selection = ObservableList::new();
        let (_host, _control) = bound::<ListBox>(&items, &selection);
        selection.push(Value::from("zzz"));
    }
}
