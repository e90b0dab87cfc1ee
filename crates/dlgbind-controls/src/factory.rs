#![forbid(unsafe_code)]

//! Builds control trees from markup nodes.
//!
//! Dispatch is a tag → constructor registry filled with the built-in
//! controls at construction. Identifiers are handed out sequentially in
//! pre-order, starting at [`BindingConfig::first_control_id`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::button::ButtonControl;
use crate::config::BindingConfig;
use crate::context::DataContext;
use crate::control::{Control, Toolkit, setup};
use crate::error::{BindError, Result};
use crate::field::{FieldControl, FieldWidget};
use crate::group::GroupControl;
use crate::host::{ControlId, ControlRef, WidgetHost, WidgetKind};
use crate::list::{ListControl, ListWidget};
use crate::node::ControlNode;
use crate::router::EventRouter;
use crate::widgets::{CheckBox, ChoiceBox, IntegerBox, Label, ListBox, ListBrowser, RealBox, TextBox};

/// Builds one control for `node` under `parent`.
pub type Constructor =
    fn(&ControlFactory, &ControlNode, &DataContext) -> Result<Rc<dyn Control>>;

fn field<W: FieldWidget>(
    factory: &ControlFactory,
    node: &ControlNode,
    parent: &DataContext,
) -> Result<Rc<dyn Control>> {
    let control = FieldControl::<W>::build(node, factory.allocate(), parent, factory.toolkit())?;
    Ok(control)
}

fn list<W: ListWidget>(
    factory: &ControlFactory,
    node: &ControlNode,
    parent: &DataContext,
) -> Result<Rc<dyn Control>> {
    let control = ListControl::<W>::build(node, factory.allocate(), parent, factory.toolkit())?;
    Ok(control)
}

fn button(
    factory: &ControlFactory,
    node: &ControlNode,
    parent: &DataContext,
) -> Result<Rc<dyn Control>> {
    let control = ButtonControl::build(node, factory.allocate(), parent, factory.toolkit())?;
    Ok(control)
}

fn group(
    factory: &ControlFactory,
    node: &ControlNode,
    parent: &DataContext,
) -> Result<Rc<dyn Control>> {
    let control = GroupControl::build(factory, node, WidgetKind::Group, parent)?;
    Ok(control)
}

fn group_box(
    factory: &ControlFactory,
    node: &ControlNode,
    parent: &DataContext,
) -> Result<Rc<dyn Control>> {
    let control = GroupControl::build(factory, node, WidgetKind::GroupBox, parent)?;
    Ok(control)
}

pub struct ControlFactory {
    toolkit: Toolkit,
    constructors: AHashMap<String, Constructor>,
    next_id: Cell<u32>,
}

impl fmt::Debug for ControlFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ControlFactory")
            .field("tags", &tags)
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

impl ControlFactory {
    /// A factory knowing every built-in tag.
    pub fn new(host: Rc<dyn WidgetHost>, config: BindingConfig) -> Self {
        let mut factory = Self {
            next_id: Cell::new(config.first_control_id),
            toolkit: Toolkit {
                host,
                config: Rc::new(config),
            },
            constructors: AHashMap::new(),
        };
        let builtins: [(WidgetKind, Constructor); 11] = [
            (WidgetKind::Label, field::<Label>),
            (WidgetKind::TextBox, field::<TextBox>),
            (WidgetKind::IntegerBox, field::<IntegerBox>),
            (WidgetKind::RealBox, field::<RealBox>),
            (WidgetKind::CheckBox, field::<CheckBox>),
            (WidgetKind::Button, button),
            (WidgetKind::ListBox, list::<ListBox>),
            (WidgetKind::ListBrowser, list::<ListBrowser>),
            (WidgetKind::ChoiceBox, list::<ChoiceBox>),
            (WidgetKind::Group, group),
            (WidgetKind::GroupBox, group_box),
        ];
        for (kind, constructor) in builtins {
            factory.register(kind.tag(), constructor);
        }
        factory
    }

    /// Register `constructor` for `tag`, returning the one it replaces.
    pub fn register(&mut self, tag: impl Into<String>, constructor: Constructor) -> Option<Constructor> {
        self.constructors.insert(tag.into(), constructor)
    }

    #[must_use]
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    #[must_use]
    pub fn config(&self) -> &BindingConfig {
        &self.toolkit.config
    }

    /// The next unused control identifier.
    pub fn allocate(&self) -> ControlRef {
        let control = self.next_id.get();
        self.next_id.set(control + 1);
        ControlRef {
            dialog: self.toolkit.config.dialog(),
            control: ControlId(control),
        }
    }

    /// Build the control (and subtree) described by `node`.
    pub fn create(&self, node: &ControlNode, parent: &DataContext) -> Result<Rc<dyn Control>> {
        let Some(constructor) = self.constructors.get(node.tag.as_str()).copied() else {
            return Err(BindError::UnknownTag {
                tag: node.tag.clone(),
            });
        };
        let control = constructor(self, node, parent)?;
        tracing::debug!(
            message = "factory.create",
            tag = %node.tag,
            control = control.core().id().control.0
        );
        Ok(control)
    }

    /// Build the tree under `root` and create its widgets.
    pub fn build(
        &self,
        node: &ControlNode,
        root: &DataContext,
        router: &EventRouter,
    ) -> Result<Rc<dyn Control>> {
        let control = self.create(node, root)?;
        setup(&control, router);
        Ok(control)
    }
}
