#![forbid(unsafe_code)]

//! Controls showing a single editable value.
//!
//! # Modes
//!
//! - **Single**: `data-value` names a field on the control's context.
//! - **Aggregate**: `data-items` names a list on the context and
//!   `data-value` a field on every item. The control shows the common value
//!   of all item fields, [`MULTI_VALUE`](crate::value::MULTI_VALUE) when they
//!   disagree, or `None` for an empty list. Writing stores the value into
//!   every item field.
//!
//! # Invariants
//!
//! 1. The widget is only written when the value to show differs from the
//!    value last shown, except in [`update`](Control::update), which always
//!    repaints.
//! 2. User input is recorded as shown before it is written back, so the
//!    resulting change notification does not echo into the widget.
//! 3. An aggregate write updates the cached aggregate before the first item
//!    field is written, so handlers running during the write read the new
//!    value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use dlgbind_reactive::{Dependency, ObservableField, ObservableList, Subscription};

use crate::align::{AlignMode, Alignable, Alignment};
use crate::context::DataContext;
use crate::control::{Control, ControlCore, Toolkit, attach};
use crate::error::{BindError, Result};
use crate::host::{ControlRef, WidgetKind};
use crate::node::ControlNode;
use crate::value::Value;

/// Host widget adapter for a field control.
pub trait FieldWidget: 'static {
    const KIND: WidgetKind;
    const EDITABLE: bool = true;

    /// The host representation of `value`.
    fn render(value: &Value, multi_label: &str) -> Value;

    /// Interpret what the host reports; `None` ignores the input.
    fn parse(raw: Value) -> Option<Value>;
}

struct Aggregate {
    items: ObservableList<Value>,
    fields: Vec<ObservableField<Value>>,
    cache: Value,
    _watches: Vec<Subscription>,
}

enum FieldState {
    Detached,
    Single {
        field: ObservableField<Value>,
        _watch: Subscription,
    },
    Aggregate(Aggregate),
}

/// A control bound to one value, or to one value across many items.
pub struct FieldControl<W> {
    core: ControlCore,
    this: Weak<Self>,
    value_name: String,
    items_name: Option<String>,
    alignment: Alignment,
    state: RefCell<FieldState>,
    shown: RefCell<Option<Value>>,
    writing: Cell<bool>,
    widget: PhantomData<W>,
}

impl<W> fmt::Debug for FieldControl<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match &*self.state.borrow() {
            FieldState::Detached => "detached",
            FieldState::Single { .. } => "single",
            FieldState::Aggregate(_) => "aggregate",
        };
        f.debug_struct("FieldControl")
            .field("core", &self.core)
            .field("value_name", &self.value_name)
            .field("items_name", &self.items_name)
            .field("mode", &mode)
            .finish()
    }
}

/// The shared value of `fields`, the sentinel on disagreement, or `None`.
fn common_value(fields: &[ObservableField<Value>]) -> Value {
    let Some((first, rest)) = fields.split_first() else {
        return Value::None;
    };
    let value = first.get();
    if rest.iter().all(|field| field.with(|other| *other == value)) {
        value
    } else {
        Value::multi()
    }
}

fn item_field(
    item: &Value,
    index: usize,
    items_name: &str,
    value_name: &str,
) -> Result<ObservableField<Value>> {
    let view_model = item.as_item().ok_or_else(|| BindError::NotAViewModel {
        name: items_name.to_string(),
        index,
    })?;
    view_model
        .property(value_name)
        .ok_or_else(|| BindError::unknown_property(value_name))?
        .into_field(value_name)
}

impl<W: FieldWidget> FieldControl<W> {
    pub fn build(
        node: &ControlNode,
        id: ControlRef,
        parent: &DataContext,
        toolkit: &Toolkit,
    ) -> Result<Rc<Self>> {
        let value_name = node.required("data-value")?.to_string();
        let items_name = node.attribute("data-items").map(str::to_string);
        let alignment = Alignment::from_node(node, &[AlignMode::Resize, AlignMode::Shift])?;
        let core = ControlCore::new(node, W::KIND, id, parent, toolkit)?;
        attach(Rc::new_cyclic(|this| Self {
            core,
            this: this.clone(),
            value_name,
            items_name,
            alignment,
            state: RefCell::new(FieldState::Detached),
            shown: RefCell::new(None),
            writing: Cell::new(false),
            widget: PhantomData,
        }))
    }

    /// Whether the control binds across a list of items.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(*self.state.borrow(), FieldState::Aggregate(_))
    }

    /// The bound value: the field's value, the cached aggregate, or `None`
    /// while detached.
    #[must_use]
    pub fn value(&self) -> Value {
        match &*self.state.borrow() {
            FieldState::Detached => Value::None,
            FieldState::Single { field, .. } => field.get(),
            FieldState::Aggregate(aggregate) => aggregate.cache.clone(),
        }
    }

    /// Write `value` into the bound field, or into every item field.
    pub fn set_value(&self, value: Value) {
        enum Target {
            Nothing,
            Single(ObservableField<Value>),
            Many(Vec<ObservableField<Value>>),
        }
        let target = match &*self.state.borrow() {
            FieldState::Detached => Target::Nothing,
            FieldState::Single { field, .. } => Target::Single(field.clone()),
            FieldState::Aggregate(aggregate) => Target::Many(aggregate.fields.clone()),
        };
        match target {
            Target::Nothing => {
                tracing::debug!(message = "field.detached_write", control = self.core.id().control.0);
            }
            Target::Single(field) => {
                field.set(value);
            }
            Target::Many(fields) => {
                if let FieldState::Aggregate(aggregate) = &mut *self.state.borrow_mut() {
                    aggregate.cache = value.clone();
                }
                self.writing.set(true);
                for field in &fields {
                    field.set(value.clone());
                }
                self.writing.set(false);
                self.show_if_needed(value);
            }
        }
    }

    fn resolve_state(&self) -> Result<FieldState> {
        let context = self.core.context();
        let Some(items_name) = self.items_name.as_deref() else {
            let Some(property) = context.resolve(&self.value_name)? else {
                return Ok(FieldState::Detached);
            };
            let field = property.into_field(&self.value_name)?;
            let weak = self.this.clone();
            let watch = field.subscribe(move |change| {
                if let Some(control) = weak.upgrade() {
                    control.show_if_needed(change.new.clone());
                }
            });
            return Ok(FieldState::Single {
                field,
                _watch: watch,
            });
        };

        let Some(property) = context.resolve(items_name)? else {
            return Ok(FieldState::Detached);
        };
        let items = property.into_list(items_name)?;
        Ok(FieldState::Aggregate(self.aggregate(items)?))
    }

    /// Subscribe to `items` and to the value field of every item.
    fn aggregate(&self, items: ObservableList<Value>) -> Result<Aggregate> {
        let items_name = self.items_name.as_deref().unwrap_or_default();
        let fields = items.with(|values| {
            values
                .iter()
                .enumerate()
                .map(|(index, item)| item_field(item, index, items_name, &self.value_name))
                .collect::<Result<Vec<_>>>()
        })?;

        let mut watches = Vec::with_capacity(fields.len() + 2);
        for field in &fields {
            let weak = self.this.clone();
            watches.push(field.subscribe(move |_| {
                if let Some(control) = weak.upgrade() {
                    control.on_item_value_changed();
                }
            }));
        }
        let weak = self.this.clone();
        watches.extend(items.watch(Rc::new(move || {
            if let Some(control) = weak.upgrade() {
                control.on_items_changed();
            }
        })));

        let cache = common_value(&fields);
        Ok(Aggregate {
            items,
            fields,
            cache,
            _watches: watches,
        })
    }

    fn on_item_value_changed(&self) {
        if self.writing.get() {
            return;
        }
        let value = match &mut *self.state.borrow_mut() {
            FieldState::Aggregate(aggregate) => {
                aggregate.cache = common_value(&aggregate.fields);
                aggregate.cache.clone()
            }
            _ => return,
        };
        self.show_if_needed(value);
    }

    /// The item list changed: rebuild every per-item subscription.
    fn on_items_changed(&self) {
        let items = match &*self.state.borrow() {
            FieldState::Aggregate(aggregate) => aggregate.items.clone(),
            _ => return,
        };
        let value = match self.aggregate(items) {
            Ok(aggregate) => {
                let value = aggregate.cache.clone();
                *self.state.borrow_mut() = FieldState::Aggregate(aggregate);
                value
            }
            Err(err) => {
                tracing::error!(
                    message = "field.items_rebind_failed",
                    control = self.core.id().control.0,
                    error = %err
                );
                *self.state.borrow_mut() = FieldState::Detached;
                Value::None
            }
        };
        self.show_if_needed(value);
    }

    fn show_if_needed(&self, value: Value) {
        if self.shown.borrow().as_ref() == Some(&value) {
            return;
        }
        let rendered = W::render(&value, &self.core.config().multi_value_label);
        self.core.host().set_value(self.core.id(), &rendered);
        *self.shown.borrow_mut() = Some(value);
    }
}

impl<W: FieldWidget> Control for FieldControl<W> {
    fn core(&self) -> &ControlCore {
        &self.core
    }

    fn bind(&self) -> Result<()> {
        *self.state.borrow_mut() = FieldState::Detached;
        let state = self.resolve_state()?;
        *self.state.borrow_mut() = state;
        Ok(())
    }

    fn unbind(&self) {
        *self.state.borrow_mut() = FieldState::Detached;
    }

    fn update(&self) {
        *self.shown.borrow_mut() = None;
        self.show_if_needed(self.value());
    }

    fn on_control_event(&self, _payload: i64) {
        if !W::EDITABLE || matches!(*self.state.borrow(), FieldState::Detached) {
            return;
        }
        let multi_label = &self.core.config().multi_value_label;
        let raw = self.core.host().value(self.core.id());
        // Leaving the mismatch placeholder untouched must not overwrite items.
        if self.value().is_multi() && raw == W::render(&Value::multi(), multi_label) {
            return;
        }
        let Some(value) = W::parse(raw) else {
            tracing::debug!(message = "field.input_ignored", control = self.core.id().control.0);
            return;
        };
        *self.shown.borrow_mut() = Some(value.clone());
        self.set_value(value);
    }

    fn alignable(&self) -> Option<&dyn Alignable> {
        Some(&self.alignment)
    }
}
