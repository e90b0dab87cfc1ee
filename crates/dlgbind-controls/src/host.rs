#![forbid(unsafe_code)]

//! The seam to the host widget toolkit.
//!
//! Every call is fire-and-forget except the explicit queries
//! ([`WidgetHost::value`], [`WidgetHost::selected_rows`],
//! [`WidgetHost::confirm`]). The binding layer never interprets anything
//! else about the host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::align::{AlignMode, Orientation};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(pub u32);

/// Names one widget toward the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlRef {
    pub dialog: DialogId,
    pub control: ControlId,
}

impl fmt::Display for ControlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dialog.0, self.control.0)
    }
}

/// The closed set of widget kinds the factory builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Label,
    TextBox,
    IntegerBox,
    RealBox,
    CheckBox,
    Button,
    ListBox,
    ListBrowser,
    ChoiceBox,
    Group,
    GroupBox,
}

impl WidgetKind {
    /// The markup tag naming this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::TextBox => "TextBox",
            Self::IntegerBox => "IntegerBox",
            Self::RealBox => "RealBox",
            Self::CheckBox => "CheckBox",
            Self::Button => "Button",
            Self::ListBox => "ListBox",
            Self::ListBrowser => "ListBrowser",
            Self::ChoiceBox => "ChoiceBox",
            Self::Group => "Group",
            Self::GroupBox => "GroupBox",
        }
    }
}

/// Child arrangement of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    Horizontal,
    #[default]
    Vertical,
}

/// Everything the host needs to create a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    pub label: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub layout: Option<Layout>,
}

impl WidgetSpec {
    #[must_use]
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            label: String::new(),
            width: None,
            height: None,
            layout: None,
        }
    }
}

/// Imperative host widget API.
pub trait WidgetHost {
    fn create_widget(&self, widget: ControlRef, spec: &WidgetSpec);
    fn place_child(&self, parent: ControlRef, child: ControlRef);
    fn set_alignment(&self, widget: ControlRef, orientation: Orientation, mode: AlignMode);
    fn set_enabled(&self, widget: ControlRef, enabled: bool);

    /// Show `value`. `Value::None` on a check box is the mixed state.
    fn set_value(&self, widget: ControlRef, value: &Value);
    /// The value currently entered in the widget.
    fn value(&self, widget: ControlRef) -> Value;

    fn insert_row(&self, widget: ControlRef, index: usize, text: &str);
    fn remove_row(&self, widget: ControlRef, index: usize);
    fn clear_rows(&self, widget: ControlRef);
    fn set_row(&self, widget: ControlRef, index: usize, text: &str);
    fn select_row(&self, widget: ControlRef, index: usize, selected: bool);
    fn selected_rows(&self, widget: ControlRef) -> Vec<usize>;

    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;
}
