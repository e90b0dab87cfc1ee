#![forbid(unsafe_code)]

//! Containers laying out child controls.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::align::{AlignMode, Alignable, Alignment};
use crate::context::DataContext;
use crate::control::{Control, ControlCore, attach};
use crate::error::{BindError, Result};
use crate::factory::ControlFactory;
use crate::host::{Layout, WidgetKind};
use crate::node::ControlNode;

/// `Group` and `GroupBox`: children share this control's context node.
pub struct GroupControl {
    core: ControlCore,
    alignment: Alignment,
    children: RefCell<Vec<Rc<dyn Control>>>,
}

impl fmt::Debug for GroupControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupControl")
            .field("core", &self.core)
            .field("children", &self.children.borrow().len())
            .finish()
    }
}

fn layout(node: &ControlNode) -> Result<Layout> {
    match node.attribute("layout") {
        None | Some("vertical") => Ok(Layout::Vertical),
        Some("horizontal") => Ok(Layout::Horizontal),
        Some(other) => Err(BindError::invalid(&node.tag, "layout", other)),
    }
}

impl GroupControl {
    /// Build the group, then its children against the group's own node.
    pub fn build(
        factory: &ControlFactory,
        node: &ControlNode,
        kind: WidgetKind,
        parent: &DataContext,
    ) -> Result<Rc<Self>> {
        let layout = layout(node)?;
        let alignment = Alignment::from_node(node, &[AlignMode::Resize, AlignMode::Shift])?;
        let core = ControlCore::new(node, kind, factory.allocate(), parent, factory.toolkit())?
            .with_spec(|spec| spec.layout = Some(layout));
        let group = attach(Rc::new(Self {
            core,
            alignment,
            children: RefCell::new(Vec::new()),
        }))?;

        let children = node
            .children
            .iter()
            .map(|child| factory.create(child, group.core.context()))
            .collect::<Result<Vec<_>>>()?;
        *group.children.borrow_mut() = children;
        Ok(group)
    }
}

impl Control for GroupControl {
    fn core(&self) -> &ControlCore {
        &self.core
    }

    fn bind(&self) -> Result<()> {
        Ok(())
    }

    fn unbind(&self) {}

    fn update(&self) {}

    fn on_control_event(&self, payload: i64) {
        tracing::trace!(message = "group.event", control = self.core.id().control.0, payload);
    }

    fn children(&self) -> Vec<Rc<dyn Control>> {
        self.children.borrow().clone()
    }

    fn alignable(&self) -> Option<&dyn Alignable> {
        Some(&self.alignment)
    }
}
