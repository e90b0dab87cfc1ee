#![forbid(unsafe_code)]

//! Concrete widget adapters, one per markup tag.

use crate::field::FieldWidget;
use crate::host::WidgetKind;
use crate::list::{ListEvent, ListWidget};
use crate::value::Value;

fn render_text(value: &Value, multi_label: &str) -> Value {
    if value.is_multi() {
        return Value::from(multi_label);
    }
    match value {
        Value::Text(_) => value.clone(),
        other => Value::Text(other.display()),
    }
}

/// Read-only text.
#[derive(Debug, Clone, Copy)]
pub struct Label;

impl FieldWidget for Label {
    const KIND: WidgetKind = WidgetKind::Label;
    const EDITABLE: bool = false;

    fn render(value: &Value, multi_label: &str) -> Value {
        render_text(value, multi_label)
    }

    fn parse(_raw: Value) -> Option<Value> {
        None
    }
}

/// Editable text.
#[derive(Debug, Clone, Copy)]
pub struct TextBox;

impl FieldWidget for TextBox {
    const KIND: WidgetKind = WidgetKind::TextBox;

    fn render(value: &Value, multi_label: &str) -> Value {
        render_text(value, multi_label)
    }

    fn parse(raw: Value) -> Option<Value> {
        match raw {
            Value::None => Some(Value::from("")),
            Value::Text(_) => Some(raw),
            other => Some(Value::Text(other.display())),
        }
    }
}

/// Integer entry. Text that is not an integer is ignored.
#[derive(Debug, Clone, Copy)]
pub struct IntegerBox;

impl FieldWidget for IntegerBox {
    const KIND: WidgetKind = WidgetKind::IntegerBox;

    fn render(value: &Value, multi_label: &str) -> Value {
        match value {
            Value::Int(_) => value.clone(),
            _ => render_text(value, multi_label),
        }
    }

    fn parse(raw: Value) -> Option<Value> {
        match raw {
            Value::Int(_) => Some(raw),
            Value::Text(text) => text.trim().parse::<i64>().ok().map(Value::Int),
            _ => None,
        }
    }
}

/// Real-number entry. Text that is not a number is ignored.
#[derive(Debug, Clone, Copy)]
pub struct RealBox;

impl FieldWidget for RealBox {
    const KIND: WidgetKind = WidgetKind::RealBox;

    fn render(value: &Value, multi_label: &str) -> Value {
        match value {
            Value::Real(_) => value.clone(),
            Value::Int(i) => Value::Real(*i as f64),
            _ => render_text(value, multi_label),
        }
    }

    fn parse(raw: Value) -> Option<Value> {
        match raw {
            Value::Real(_) => Some(raw),
            Value::Int(i) => Some(Value::Real(i as f64)),
            Value::Text(text) => text.trim().parse::<f64>().ok().map(Value::Real),
            _ => None,
        }
    }
}

/// Boolean toggle. A disagreeing aggregate shows the mixed state.
#[derive(Debug, Clone, Copy)]
pub struct CheckBox;

impl FieldWidget for CheckBox {
    const KIND: WidgetKind = WidgetKind::CheckBox;

    fn render(value: &Value, _multi_label: &str) -> Value {
        if value.is_multi() {
            return Value::None;
        }
        Value::Bool(value.is_truthy())
    }

    fn parse(raw: Value) -> Option<Value> {
        match raw {
            Value::Bool(_) => Some(raw),
            Value::Int(i) => Some(Value::Bool(i != 0)),
            _ => None,
        }
    }
}

/// Multi-select list.
#[derive(Debug, Clone, Copy)]
pub struct ListBox;

impl ListWidget for ListBox {
    const KIND: WidgetKind = WidgetKind::ListBox;

    fn decode(payload: i64) -> ListEvent {
        ListEvent::decode_list(payload, false)
    }
}

/// Multi-select list whose delete key removes the selection.
#[derive(Debug, Clone, Copy)]
pub struct ListBrowser;

impl ListWidget for ListBrowser {
    const KIND: WidgetKind = WidgetKind::ListBrowser;

    fn decode(payload: i64) -> ListEvent {
        ListEvent::decode_list(payload, true)
    }
}

/// Single-select pull-down. Payloads are the chosen row.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceBox;

impl ListWidget for ChoiceBox {
    const KIND: WidgetKind = WidgetKind::ChoiceBox;

    fn decode(payload: i64) -> ListEvent {
        ListEvent::decode_choice(payload)
    }
}
