#![forbid(unsafe_code)]

//! dlgbind public facade crate.
//!
//! Declarative dialogs bound to observable view-models. The observable
//! primitives live in [`reactive`]; controls, the factory and the host seam
//! in [`controls`]. Most users only need the [`prelude`].

pub use dlgbind_controls as controls;
pub use dlgbind_reactive as reactive;

pub mod prelude {
    pub use dlgbind_controls::{
        BindError, BindingConfig, Control, ControlFactory, ControlId, ControlNode, ControlRef,
        DataContext, DialogId, EventRouter, Item, MULTI_VALUE, Properties, Property, Value,
        ViewModel, WidgetHost, WidgetKind, WidgetSpec,
    };
    pub use dlgbind_reactive::{
        Dependency, Event, ObservableCommand, ObservableField, ObservableList, ObservableMethod,
        Subscription, ViewModelList,
    };
}
