#![forbid(unsafe_code)]

//! Push buttons executing a bound command.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dlgbind_reactive::{ObservableCommand, Subscription};

use crate::align::{AlignMode, Alignable, Alignment};
use crate::context::DataContext;
use crate::control::{Control, ControlCore, Toolkit, apply_enabled, attach};
use crate::error::Result;
use crate::host::{ControlRef, WidgetKind};
use crate::node::ControlNode;

/// Enabled while its command can execute and `data-disabled` is falsy.
pub struct ButtonControl {
    core: ControlCore,
    this: Weak<Self>,
    command_name: String,
    alignment: Alignment,
    command: RefCell<Option<(ObservableCommand, Subscription)>>,
}

impl fmt::Debug for ButtonControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonControl")
            .field("core", &self.core)
            .field("command_name", &self.command_name)
            .finish_non_exhaustive()
    }
}

impl ButtonControl {
    pub fn build(
        node: &ControlNode,
        id: ControlRef,
        parent: &DataContext,
        toolkit: &Toolkit,
    ) -> Result<Rc<Self>> {
        let command_name = node.required("data-command")?.to_string();
        // Buttons keep their size; they may only move.
        let alignment = Alignment::from_node(node, &[AlignMode::Shift])?;
        let core = ControlCore::new(node, WidgetKind::Button, id, parent, toolkit)?;
        attach(Rc::new_cyclic(|this| Self {
            core,
            this: this.clone(),
            command_name,
            alignment,
            command: RefCell::new(None),
        }))
    }

    fn command(&self) -> Option<ObservableCommand> {
        self.command.borrow().as_ref().map(|(command, _)| command.clone())
    }
}

impl Control for ButtonControl {
    fn core(&self) -> &ControlCore {
        &self.core
    }

    fn bind(&self) -> Result<()> {
        *self.command.borrow_mut() = None;
        let Some(property) = self.core.resolve(&self.command_name)? else {
            return Ok(());
        };
        let command = property.into_command(&self.command_name)?;
        let weak = self.this.clone();
        let watch = command.on_can_execute_changed(move || {
            if let Some(button) = weak.upgrade() {
                apply_enabled(button.as_ref());
            }
        });
        *self.command.borrow_mut() = Some((command, watch));
        Ok(())
    }

    fn unbind(&self) {
        *self.command.borrow_mut() = None;
    }

    fn update(&self) {}

    fn on_control_event(&self, _payload: i64) {
        match self.command() {
            Some(command) => {
                let ran = command.execute();
                tracing::debug!(message = "button.execute", control = self.core.id().control.0, ran);
            }
            None => {
                tracing::debug!(message = "button.detached", control = self.core.id().control.0);
            }
        }
    }

    fn alignable(&self) -> Option<&dyn Alignable> {
        Some(&self.alignment)
    }

    fn is_enabled(&self) -> bool {
        !self.core.is_disabled() && self.command().is_some_and(|command| command.can_execute())
    }
}
