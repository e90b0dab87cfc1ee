#![forbid(unsafe_code)]

//! An in-memory [`WidgetHost`] that records every call it receives.
//!
//! Besides the call log the host keeps a small model of each widget (shown
//! value, rows, selected rows, enabled flag) so tests can assert on what a
//! user would see, and can simulate user input the way a native toolkit
//! would: by changing the widget state first and then dispatching the
//! payload through the router.
//!
//! Row selection follows the native behaviour of list widgets: inserting or
//! removing a row shifts the selected indices behind it.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use dlgbind_controls::{AlignMode, ControlRef, Orientation, Value, WidgetHost, WidgetKind, WidgetSpec};
use serde_json::json;

/// One fire-and-forget call the binding layer made.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateWidget {
        widget: u32,
        kind: WidgetKind,
        label: String,
    },
    PlaceChild {
        parent: u32,
        child: u32,
    },
    SetAlignment {
        widget: u32,
        orientation: Orientation,
        mode: AlignMode,
    },
    SetEnabled {
        widget: u32,
        enabled: bool,
    },
    SetValue {
        widget: u32,
        value: Value,
    },
    InsertRow {
        widget: u32,
        index: usize,
        text: String,
    },
    RemoveRow {
        widget: u32,
        index: usize,
    },
    ClearRows {
        widget: u32,
    },
    SetRow {
        widget: u32,
        index: usize,
        text: String,
    },
    SelectRow {
        widget: u32,
        index: usize,
        selected: bool,
    },
    Confirm {
        message: String,
    },
}

impl HostCall {
    /// The widget the call targets; `None` for dialog-wide calls.
    #[must_use]
    pub fn widget(&self) -> Option<u32> {
        match self {
            Self::CreateWidget { widget, .. }
            | Self::SetAlignment { widget, .. }
            | Self::SetEnabled { widget, .. }
            | Self::SetValue { widget, .. }
            | Self::InsertRow { widget, .. }
            | Self::RemoveRow { widget, .. }
            | Self::ClearRows { widget }
            | Self::SetRow { widget, .. }
            | Self::SelectRow { widget, .. } => Some(*widget),
            Self::PlaceChild { parent, .. } => Some(*parent),
            Self::Confirm { .. } => None,
        }
    }

    /// Whether the call touches the rows of a list widget.
    #[must_use]
    pub fn is_row_call(&self) -> bool {
        matches!(
            self,
            Self::InsertRow { .. } | Self::RemoveRow { .. } | Self::ClearRows { .. } | Self::SetRow { .. }
        )
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::CreateWidget { widget, kind, label } => {
                json!({"call": "create_widget", "widget": widget, "kind": kind.tag(), "label": label})
            }
            Self::PlaceChild { parent, child } => {
                json!({"call": "place_child", "parent": parent, "child": child})
            }
            Self::SetAlignment {
                widget,
                orientation,
                mode,
            } => json!({
                "call": "set_alignment",
                "widget": widget,
                "attribute": orientation.attribute(),
                "mode": format!("{mode:?}"),
            }),
            Self::SetEnabled { widget, enabled } => {
                json!({"call": "set_enabled", "widget": widget, "enabled": enabled})
            }
            Self::SetValue { widget, value } => {
                json!({"call": "set_value", "widget": widget, "value": value.display()})
            }
            Self::InsertRow { widget, index, text } => {
                json!({"call": "insert_row", "widget": widget, "index": index, "text": text})
            }
            Self::RemoveRow { widget, index } => {
                json!({"call": "remove_row", "widget": widget, "index": index})
            }
            Self::ClearRows { widget } => json!({"call": "clear_rows", "widget": widget}),
            Self::SetRow { widget, index, text } => {
                json!({"call": "set_row", "widget": widget, "index": index, "text": text})
            }
            Self::SelectRow {
                widget,
                index,
                selected,
            } => json!({"call": "select_row", "widget": widget, "index": index, "selected": selected}),
            Self::Confirm { message } => json!({"call": "confirm", "message": message}),
        }
    }
}

/// What one widget currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub spec: WidgetSpec,
    pub enabled: bool,
    pub value: Value,
    pub rows: Vec<String>,
    pub selected: BTreeSet<usize>,
    pub children: Vec<u32>,
}

impl WidgetState {
    fn new(spec: WidgetSpec) -> Self {
        Self {
            spec,
            enabled: true,
            value: Value::None,
            rows: Vec::new(),
            selected: BTreeSet::new(),
            children: Vec::new(),
        }
    }
}

/// Recording host toolkit.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: RefCell<Vec<HostCall>>,
    widgets: RefCell<BTreeMap<u32, WidgetState>>,
    confirm_answer: Cell<bool>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Calls targeting `widget`, oldest first.
    #[must_use]
    pub fn calls_for(&self, widget: u32) -> Vec<HostCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.widget() == Some(widget))
            .cloned()
            .collect()
    }

    /// Row calls targeting `widget`, oldest first.
    #[must_use]
    pub fn row_calls(&self, widget: u32) -> Vec<HostCall> {
        self.calls_for(widget)
            .into_iter()
            .filter(HostCall::is_row_call)
            .collect()
    }

    /// The call log as JSON lines, for failure evidence.
    #[must_use]
    pub fn calls_jsonl(&self) -> String {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.to_json().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn widget(&self, widget: u32) -> Option<WidgetState> {
        self.widgets.borrow().get(&widget).cloned()
    }

    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.widgets.borrow().len()
    }

    #[must_use]
    pub fn rows(&self, widget: u32) -> Vec<String> {
        self.widget(widget).map(|state| state.rows).unwrap_or_default()
    }

    #[must_use]
    pub fn shown(&self, widget: u32) -> Value {
        self.widget(widget).map(|state| state.value).unwrap_or_default()
    }

    #[must_use]
    pub fn is_enabled(&self, widget: u32) -> Option<bool> {
        self.widget(widget).map(|state| state.enabled)
    }

    #[must_use]
    pub fn selected(&self, widget: u32) -> Vec<usize> {
        self.widget(widget)
            .map(|state| state.selected.into_iter().collect())
            .unwrap_or_default()
    }

    /// How the next confirmation prompt is answered.
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Simulate the user typing `value` into `widget`. Nothing is logged.
    pub fn type_value(&self, widget: u32, value: impl Into<Value>) {
        let value = value.into();
        self.with_widget(widget, |state| state.value = value);
    }

    /// Simulate the user selecting exactly `rows` in `widget`. Nothing is
    /// logged.
    pub fn click_rows(&self, widget: u32, rows: &[usize]) {
        self.with_widget(widget, |state| {
            state.selected = rows.iter().copied().filter(|&row| row < state.rows.len()).collect();
        });
    }

    fn record(&self, call: HostCall) {
        tracing::trace!(message = "host.call", call = ?call);
        self.calls.borrow_mut().push(call);
    }

    fn with_widget(&self, widget: u32, f: impl FnOnce(&mut WidgetState)) {
        let mut widgets = self.widgets.borrow_mut();
        let Some(state) = widgets.get_mut(&widget) else {
            panic!("host call for widget {widget} before create_widget");
        };
        f(state);
    }
}

impl WidgetHost for RecordingHost {
    fn create_widget(&self, widget: ControlRef, spec: &WidgetSpec) {
        let id = widget.control.0;
        self.record(HostCall::CreateWidget {
            widget: id,
            kind: spec.kind,
            label: spec.label.clone(),
        });
        let previous = self
            .widgets
            .borrow_mut()
            .insert(id, WidgetState::new(spec.clone()));
        assert!(previous.is_none(), "widget {id} created twice");
    }

    fn place_child(&self, parent: ControlRef, child: ControlRef) {
        self.record(HostCall::PlaceChild {
            parent: parent.control.0,
            child: child.control.0,
        });
        self.with_widget(parent.control.0, |state| state.children.push(child.control.0));
    }

    fn set_alignment(&self, widget: ControlRef, orientation: Orientation, mode: AlignMode) {
        self.record(HostCall::SetAlignment {
            widget: widget.control.0,
            orientation,
            mode,
        });
    }

    fn set_enabled(&self, widget: ControlRef, enabled: bool) {
        self.record(HostCall::SetEnabled {
            widget: widget.control.0,
            enabled,
        });
        self.with_widget(widget.control.0, |state| state.enabled = enabled);
    }

    fn set_value(&self, widget: ControlRef, value: &Value) {
        self.record(HostCall::SetValue {
            widget: widget.control.0,
            value: value.clone(),
        });
        self.with_widget(widget.control.0, |state| state.value = value.clone());
    }

    fn value(&self, widget: ControlRef) -> Value {
        self.shown(widget.control.0)
    }

    fn insert_row(&self, widget: ControlRef, index: usize, text: &str) {
        self.record(HostCall::InsertRow {
            widget: widget.control.0,
            index,
            text: text.to_string(),
        });
        self.with_widget(widget.control.0, |state| {
            assert!(index <= state.rows.len(), "insert_row({index}) past the end");
            state.rows.insert(index, text.to_string());
            state.selected = state
                .selected
                .iter()
                .map(|&row| if row >= index { row + 1 } else { row })
                .collect();
        });
    }

    fn remove_row(&self, widget: ControlRef, index: usize) {
        self.record(HostCall::RemoveRow {
            widget: widget.control.0,
            index,
        });
        self.with_widget(widget.control.0, |state| {
            assert!(index < state.rows.len(), "remove_row({index}) out of range");
            state.rows.remove(index);
            state.selected = state
                .selected
                .iter()
                .filter(|&&row| row != index)
                .map(|&row| if row > index { row - 1 } else { row })
                .collect();
        });
    }

    fn clear_rows(&self, widget: ControlRef) {
        self.record(HostCall::ClearRows {
            widget: widget.control.0,
        });
        self.with_widget(widget.control.0, |state| {
            state.rows.clear();
            state.selected.clear();
        });
    }

    fn set_row(&self, widget: ControlRef, index: usize, text: &str) {
        self.record(HostCall::SetRow {
            widget: widget.control.0,
            index,
            text: text.to_string(),
        });
        self.with_widget(widget.control.0, |state| {
            assert!(index < state.rows.len(), "set_row({index}) out of range");
            state.rows[index] = text.to_string();
        });
    }

    fn select_row(&self, widget: ControlRef, index: usize, selected: bool) {
        self.record(HostCall::SelectRow {
            widget: widget.control.0,
            index,
            selected,
        });
        self.with_widget(widget.control.0, |state| {
            assert!(index < state.rows.len(), "select_row({index}) out of range");
            if selected {
                state.selected.insert(index);
            } else {
                state.selected.remove(&index);
            }
        });
    }

    fn selected_rows(&self, widget: ControlRef) -> Vec<usize> {
        self.selected(widget.control.0)
    }

    fn confirm(&self, message: &str) -> bool {
        self.record(HostCall::Confirm {
            message: message.to_string(),
        });
        self.confirm_answer.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlgbind_controls::{ControlId, DialogId};

    fn widget(control: u32) -> ControlRef {
        ControlRef {
            dialog: DialogId(1),
            control: ControlId(control),
        }
    }

    #[test]
    fn row_edits_shift_selection() {
        let host = RecordingHost::new();
        host.create_widget(widget(3), &WidgetSpec::new(WidgetKind::ListBox));
        for (index, text) in ["a", "b", "c"].into_iter().enumerate() {
            host.insert_row(widget(3), index, text);
        }
        host.click_rows(3, &[1, 2]);

        host.insert_row(widget(3), 0, "z");
        assert_eq!(host.selected(3), vec![2, 3]);
        host.remove_row(widget(3), 2);
        assert_eq!(host.selected(3), vec![2]);
        assert_eq!(host.rows(3), vec!["z", "a", "c"]);
    }

    #[test]
    fn queries_are_not_logged() {
        let host = RecordingHost::new();
        host.create_widget(widget(3), &WidgetSpec::new(WidgetKind::TextBox));
        host.type_value(3, "typed");
        assert_eq!(host.value(widget(3)), Value::from("typed"));
        assert_eq!(host.take_calls().len(), 1);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn confirm_is_logged_with_the_answer_configured() {
        let host = RecordingHost::new();
        assert!(!host.confirm("sure?"));
        host.answer_confirm(true);
        assert!(host.confirm("sure?"));
        assert_eq!(host.calls().len(), 2);
        assert!(host.calls_jsonl().contains("\"call\":\"confirm\""));
    }

    #[test]
    #[should_panic(expected = "before create_widget")]
    fn calls_on_unknown_widgets_panic() {
        RecordingHost::new().set_enabled(widget(9), true);
    }
}
