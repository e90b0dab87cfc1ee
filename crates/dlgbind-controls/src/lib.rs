#![forbid(unsafe_code)]

//! Declarative controls bound to observable view-models.
//!
//! A dialog hands a parsed markup tree to [`ControlFactory`], which builds a
//! tree of [`Control`]s rooted at a [`DataContext`]. Each control resolves
//! its property names up the context chain, subscribes to the resolved
//! observables and drives its widget through the [`WidgetHost`] seam. Host
//! events come back through an [`EventRouter`].
//!
//! # Control kinds
//!
//! | Tag | Type |
//! |-----|------|
//! | `Label`, `TextBox`, `IntegerBox`, `RealBox`, `CheckBox` | [`FieldControl`] |
//! | `ListBox`, `ListBrowser`, `ChoiceBox` | [`ListControl`] |
//! | `Group`, `GroupBox` | [`GroupControl`] |
//! | `Button` | [`ButtonControl`] |
//!
//! # Errors
//!
//! Markup/view-model mismatches found while building are returned as
//! [`BindError`]. Found later, during a context-driven rebind, they are
//! logged and the control detaches. Broken invariants panic.

pub mod align;
pub mod button;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod factory;
pub mod field;
pub mod group;
pub mod host;
pub mod list;
pub mod node;
pub mod property;
pub mod router;
pub mod value;
pub mod widgets;

pub use align::{AlignMode, Alignable, Alignment, Orientation};
pub use button::ButtonControl;
pub use config::BindingConfig;
pub use context::{Binding, DataContext};
pub use control::{Control, ControlCore, Toolkit, apply_enabled, attach, setup};
pub use error::{BindError, Result};
pub use factory::{Constructor, ControlFactory};
pub use field::{FieldControl, FieldWidget};
pub use group::GroupControl;
pub use host::{ControlId, ControlRef, DialogId, Layout, WidgetHost, WidgetKind, WidgetSpec};
pub use list::{ListControl, ListEvent, ListWidget};
pub use node::ControlNode;
pub use property::{Properties, Property};
pub use router::EventRouter;
pub use value::{Item, MULTI_VALUE, Value, ViewModel};
