#![forbid(unsafe_code)]

//! State shared by every control and the bind/rebind lifecycle.
//!
//! # Lifecycle
//!
//! 1. [`attach`] resolves the control's `data-context` against its parent
//!    node, binds `data-disabled`, lets the control bind its own properties
//!    and subscribes to the parent node's changed event.
//! 2. [`setup`] creates the widget, routes host events to the control, runs
//!    the one-time widget setup, recurses into children and repaints.
//! 3. Whenever the parent context or the bound `data-context` field
//!    changes, the control drops every subscription, re-resolves, repaints
//!    and then raises its own node's changed event. Children run the same
//!    steps from inside that raise, so the cascade is depth-first.
//!
//! A configuration error during a rebind has no caller to return to: it is
//! logged and the control is left detached until the next context change.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dlgbind_reactive::{ObservableField, ObservableMethod, Subscription};

use crate::align::{Alignable, Orientation};
use crate::config::BindingConfig;
use crate::context::{Binding, DataContext};
use crate::error::{BindError, Result};
use crate::host::{ControlRef, WidgetHost, WidgetKind, WidgetSpec};
use crate::node::ControlNode;
use crate::property::Property;
use crate::router::EventRouter;
use crate::value::Value;

/// Host handle and configuration every control of one dialog shares.
#[derive(Clone)]
pub struct Toolkit {
    pub host: Rc<dyn WidgetHost>,
    pub config: Rc<BindingConfig>,
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A bound control.
pub trait Control {
    fn core(&self) -> &ControlCore;

    /// Resolve this control's own properties against its context node.
    fn bind(&self) -> Result<()>;

    /// Drop every binding made by [`bind`](Control::bind).
    fn unbind(&self);

    /// Repaint the widget from the bound state, unconditionally.
    fn update(&self);

    /// A host event for this control's widget.
    fn on_control_event(&self, payload: i64);

    /// One-time structural setup after the widget exists.
    fn setup_widget(&self) {}

    fn children(&self) -> Vec<Rc<dyn Control>> {
        Vec::new()
    }

    fn alignable(&self) -> Option<&dyn Alignable> {
        None
    }

    fn is_enabled(&self) -> bool {
        !self.core().is_disabled()
    }
}

#[derive(Clone)]
enum Disabled {
    Method(ObservableMethod<Value>),
    Field(ObservableField<Value>),
}

impl Disabled {
    fn is_disabled(&self) -> bool {
        match self {
            Self::Method(method) => method.apply().is_truthy(),
            Self::Field(field) => field.get().is_truthy(),
        }
    }
}

#[derive(Default)]
struct Links {
    parent: Option<Subscription>,
    context_field: Option<ObservableField<Value>>,
    context: Option<Subscription>,
    disabled: Option<Disabled>,
    disabled_watch: Option<Subscription>,
}

/// Identity, widget description and context bindings of one control.
pub struct ControlCore {
    id: ControlRef,
    spec: WidgetSpec,
    toolkit: Toolkit,
    parent: DataContext,
    context: DataContext,
    context_name: Option<String>,
    disabled_name: Option<String>,
    links: RefCell<Links>,
}

impl fmt::Debug for ControlCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlCore")
            .field("id", &self.id)
            .field("kind", &self.spec.kind)
            .field("context_name", &self.context_name)
            .field("disabled_name", &self.disabled_name)
            .finish_non_exhaustive()
    }
}

impl ControlCore {
    /// Read the attributes every control shares.
    pub fn new(
        node: &ControlNode,
        kind: WidgetKind,
        id: ControlRef,
        parent: &DataContext,
        toolkit: &Toolkit,
    ) -> Result<Self> {
        let spec = WidgetSpec {
            kind,
            label: node.attribute("label").unwrap_or_default().to_string(),
            width: node.number("width")?,
            height: node.number("height")?,
            layout: None,
        };
        Ok(Self {
            id,
            spec,
            toolkit: toolkit.clone(),
            parent: parent.clone(),
            context: parent.child(),
            context_name: node.attribute("data-context").map(str::to_string),
            disabled_name: node.attribute("data-disabled").map(str::to_string),
            links: RefCell::new(Links::default()),
        })
    }

    #[must_use]
    pub fn with_spec(mut self, f: impl FnOnce(&mut WidgetSpec)) -> Self {
        f(&mut self.spec);
        self
    }

    #[must_use]
    pub fn id(&self) -> ControlRef {
        self.id
    }

    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.spec.kind.tag()
    }

    #[must_use]
    pub fn spec(&self) -> &WidgetSpec {
        &self.spec
    }

    #[must_use]
    pub fn host(&self) -> &dyn WidgetHost {
        self.toolkit.host.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &BindingConfig {
        &self.toolkit.config
    }

    /// The data parent's node.
    #[must_use]
    pub fn parent(&self) -> &DataContext {
        &self.parent
    }

    /// This control's own node; children use it as their parent.
    #[must_use]
    pub fn context(&self) -> &DataContext {
        &self.context
    }

    /// Resolve `name` against this control's node.
    pub fn resolve(&self, name: &str) -> Result<Option<Property>> {
        self.context.resolve(name)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        let disabled = self.links.borrow().disabled.clone();
        disabled.is_some_and(|d| d.is_disabled())
    }

    fn bind_context(&self, this: &Weak<dyn Control>) -> Result<()> {
        {
            let mut links = self.links.borrow_mut();
            links.context = None;
            links.context_field = None;
        }
        let Some(name) = self.context_name.as_deref() else {
            self.context.bind(Binding::Inherit);
            return Ok(());
        };
        let Some(property) = self.parent.resolve(name)? else {
            self.context.bind(Binding::Bound(Value::None));
            return Ok(());
        };
        let field = property.into_field(name)?;
        self.context.bind(Binding::Bound(field.get()));

        let weak = this.clone();
        let watch = field.subscribe(move |_| {
            if let Some(control) = weak.upgrade() {
                refresh(&control, Trigger::Context);
            }
        });
        let mut links = self.links.borrow_mut();
        links.context_field = Some(field);
        links.context = Some(watch);
        Ok(())
    }

    fn reload_context(&self) {
        let field = self.links.borrow().context_field.clone();
        if let Some(field) = field {
            self.context.bind(Binding::Bound(field.get()));
        }
    }

    fn bind_disabled(&self, this: &Weak<dyn Control>) -> Result<()> {
        {
            let mut links = self.links.borrow_mut();
            links.disabled_watch = None;
            links.disabled = None;
        }
        let Some(name) = self.disabled_name.as_deref() else {
            return Ok(());
        };
        let Some(property) = self.context.resolve(name)? else {
            return Ok(());
        };

        let weak = this.clone();
        let notify = move || {
            if let Some(control) = weak.upgrade() {
                apply_enabled(control.as_ref());
            }
        };
        let (disabled, watch) = match property {
            Property::Method(method) => {
                let watch = method.on_changed(notify);
                (Disabled::Method(method), watch)
            }
            Property::Field(field) => {
                let watch = field.subscribe(move |_| notify());
                (Disabled::Field(field), watch)
            }
            other => {
                return Err(BindError::PropertyKind {
                    name: name.to_string(),
                    expected: "method",
                    found: other.kind(),
                });
            }
        };
        let mut links = self.links.borrow_mut();
        links.disabled = Some(disabled);
        links.disabled_watch = Some(watch);
        Ok(())
    }

    fn detach(&self) {
        {
            let mut links = self.links.borrow_mut();
            links.context = None;
            links.context_field = None;
            links.disabled_watch = None;
            links.disabled = None;
        }
        self.context.bind(Binding::Bound(Value::None));
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// The parent node changed; re-resolve `data-context` too.
    Parent,
    /// The bound `data-context` field changed value.
    Context,
}

/// Finish constructing `control`: bind it and subscribe it to its parent.
pub fn attach<C: Control + 'static>(control: Rc<C>) -> Result<Rc<C>> {
    let shared: Rc<dyn Control> = control.clone();
    let this = Rc::downgrade(&shared);
    drop(shared);

    let core = control.core();
    core.bind_context(&this)?;
    core.bind_disabled(&this)?;
    control.bind()?;

    let watch = core.parent.on_changed(move || {
        if let Some(control) = this.upgrade() {
            refresh(&control, Trigger::Parent);
        }
    });
    core.links.borrow_mut().parent = Some(watch);
    tracing::debug!(
        message = "control.bind",
        tag = core.tag(),
        control = core.id.control.0
    );
    Ok(control)
}

fn refresh(control: &Rc<dyn Control>, trigger: Trigger) {
    let core = control.core();
    let this = Rc::downgrade(control);
    tracing::debug!(
        message = "control.rebind",
        tag = core.tag(),
        control = core.id.control.0,
        ?trigger
    );

    let context = match trigger {
        Trigger::Parent => core.bind_context(&this),
        Trigger::Context => {
            core.reload_context();
            Ok(())
        }
    };
    let bound = context
        .and_then(|()| core.bind_disabled(&this))
        .and_then(|()| control.bind());
    if let Err(err) = bound {
        tracing::error!(
            message = "control.rebind_failed",
            tag = core.tag(),
            control = core.id.control.0,
            error = %err
        );
        core.detach();
        control.unbind();
    }

    control.update();
    apply_enabled(control.as_ref());
    tracing::debug!(message = "context.changed", control = core.id.control.0);
    core.context.notify_changed();
}

/// Push the control's current enabled state to its widget.
pub fn apply_enabled(control: &dyn Control) {
    let core = control.core();
    core.host().set_enabled(core.id, control.is_enabled());
}

/// Create widgets for `control` and its subtree and route their events.
pub fn setup(control: &Rc<dyn Control>, router: &EventRouter) {
    let core = control.core();
    let host = core.host();
    host.create_widget(core.id, &core.spec);

    let weak = Rc::downgrade(control);
    router.register(core.id.control, move |payload| {
        if let Some(control) = weak.upgrade() {
            control.on_control_event(payload);
        }
    });

    control.setup_widget();
    for child in control.children() {
        setup(&child, router);
        let child_id = child.core().id;
        host.place_child(core.id, child_id);
        if let Some(alignable) = child.alignable() {
            for orientation in Orientation::ALL {
                if let Some(mode) = alignable.alignment(orientation) {
                    host.set_alignment(child_id, orientation, mode);
                }
            }
        }
    }

    control.update();
    apply_enabled(control.as_ref());
}


#[cfg(test)]
mod tests {
    use super::testing::{id, toolkit};
    use super::*;
    use crate::property::Properties;
    use crate::value::Item;
    use std::cell::Cell;

    /// A control that only tracks its core bindings.
    struct Probe {
        core: ControlCore,
        binds: Cell<usize>,
        updates: Cell<usize>,
    }

    impl Control for Probe {
        fn core(&self) -> &ControlCore {
            &self.core
        }
        fn bind(&self) -> Result<()> {
            self.binds.set(self.binds.get() + 1);
            Ok(())
        }
        fn unbind(&self) {}
        fn update(&self) {
            self.updates.set(self.updates.get() + 1);
        }
        fn on_control_event(&self, _payload: i64) {}
    }

    fn probe(node: &ControlNode, parent: &DataContext, toolkit: &Toolkit) -> Result<Rc<Probe>> {
        let core = ControlCore::new(node, WidgetKind::Group, id(3), parent, toolkit)?;
        attach(Rc::new(Probe {
            core,
            binds: Cell::new(0),
            updates: Cell::new(0),
        }))
    }

    fn model(selected: &ObservableField<Value>, locked: &ObservableField<Value>) -> Value {
        Value::from(Item::new(
            Properties::new()
                .field("selected", selected.clone())
                .field("locked", locked.clone()),
        ))
    }

    #[test]
    fn data_context_binds_to_field_value() {
        let (_host, toolkit) = toolkit();
        let inner = Value::from(Item::new(Properties::new()));
        let selected = ObservableField::new(inner.clone());
        let locked = ObservableField::new(Value::from(false));
        let root = DataContext::root(model(&selected, &locked));

        let node = ControlNode::new("Group").attr("data-context", "selected");
        let control = probe(&node, &root, &toolkit).expect("binds");
        assert_eq!(control.core().context().value(), inner);

        let next = Value::from(Item::new(Properties::new()));
        selected.set(next.clone());
        assert_eq!(control.core().context().value(), next);
        assert_eq!(control.binds.get(), 2);
        assert_eq!(control.updates.get(), 1);
    }

    #[test]
    fn disabled_field_drives_enabled_state() {
        let (host, toolkit) = toolkit();
        let selected = ObservableField::new(Value::None);
        let locked = ObservableField::new(Value::from(false));
        let root = DataContext::root(model(&selected, &locked));

        let node = ControlNode::new("Group").attr("data-disabled", "locked");
        let control = probe(&node, &root, &toolkit).expect("binds");
        assert!(control.is_enabled());
        locked.set(Value::from(true));
        assert!(!control.is_enabled());
        assert_eq!(host.enabled.borrow().last(), Some(&(3, false)));
    }

    #[test]
    fn unknown_context_name_fails_construction() {
        let (_host, toolkit) = toolkit();
        let root = DataContext::root(Value::from(Item::new(Properties::new())));
        let node = ControlNode::new("Group").attr("data-context", "nope");
        let err = probe(&node, &root, &toolkit).err();
        assert_eq!(err, Some(BindError::unknown_property("nope")));
    }

    #[test]
    fn rebind_failure_detaches_and_still_cascades() {
        let (_host, toolkit) = toolkit();
        let selected = ObservableField::new(Value::None);
        let locked = ObservableField::new(Value::from(false));
        let root = DataContext::root(model(&selected, &locked));
        let node = ControlNode::new("Group").attr("data-context", "selected");
        let control = probe(&node, &root, &toolkit).expect("binds");

        let cascades = Rc::new(Cell::new(0));
        let c = Rc::clone(&cascades);
        let _sub = control.core().context().on_changed(move || c.set(c.get() + 1));

        // The new root lacks `selected`.
        root.set_value(Value::from(Item::new(Properties::new())));
        assert_eq!(control.core().context().binding(), Binding::Bound(Value::None));
        assert_eq!(cascades.get(), 1);
    }

    #[test]
    fn dropping_the_control_releases_its_parent_subscription() {
        let (_host, toolkit) = toolkit();
        let root = DataContext::root(Value::None);
        let control = probe(&ControlNode::new("Group"), &root, &toolkit).expect("binds");
        assert_eq!(root.context_changed_event().handler_count(), 1);
        drop(control);
        assert_eq!(root.context_changed_event().handler_count(), 0);
    }
}
