#![forbid(unsafe_code)]

//! A dialog stand-in wiring a factory, a router and a recording host.

use std::rc::Rc;

use dlgbind_controls::{
    BindingConfig, Control, ControlFactory, ControlId, ControlNode, DataContext, EventRouter,
    Result, Value,
};

use crate::host::RecordingHost;

/// A built control tree plus everything needed to drive it.
pub struct TestDialog {
    pub host: Rc<RecordingHost>,
    pub router: EventRouter,
    pub root: DataContext,
    pub factory: ControlFactory,
    pub control: Rc<dyn Control>,
}

impl TestDialog {
    /// Build `markup` against `model` with the default configuration.
    pub fn build(markup: &ControlNode, model: Value) -> Result<Self> {
        Self::with_config(markup, model, BindingConfig::default())
    }

    pub fn with_config(markup: &ControlNode, model: Value, config: BindingConfig) -> Result<Self> {
        let host = Rc::new(RecordingHost::new());
        let router = EventRouter::new();
        let root = DataContext::root(model);
        let factory = ControlFactory::new(host.clone(), config);
        let control = factory.build(markup, &root, &router)?;
        Ok(Self {
            host,
            router,
            root,
            factory,
            control,
        })
    }

    /// Deliver a host event to control `id`.
    pub fn dispatch(&self, id: u32, payload: i64) -> bool {
        self.router.dispatch(ControlId(id), payload)
    }

    /// The user types `value` into control `id` and commits it.
    pub fn type_into(&self, id: u32, value: impl Into<Value>) -> bool {
        self.host.type_value(id, value);
        self.dispatch(id, 0)
    }

    /// The user selects exactly `rows` in list control `id`.
    pub fn click_rows(&self, id: u32, rows: &[usize]) -> bool {
        self.host.click_rows(id, rows);
        self.dispatch(id, dlgbind_controls::list::codes::SELECTION_CHANGED)
    }

    /// The control with identifier `id`, searched depth-first.
    #[must_use]
    pub fn find(&self, id: u32) -> Option<Rc<dyn Control>> {
        find(&self.control, id)
    }

    /// Every control identifier in pre-order.
    #[must_use]
    pub fn ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        collect_ids(&self.control, &mut ids);
        ids
    }
}

fn find(control: &Rc<dyn Control>, id: u32) -> Option<Rc<dyn Control>> {
    if control.core().id().control.0 == id {
        return Some(Rc::clone(control));
    }
    control.children().iter().find_map(|child| find(child, id))
}

fn collect_ids(control: &Rc<dyn Control>, ids: &mut Vec<u32>) {
    ids.push(control.core().id().control.0);
    for child in control.children() {
        collect_ids(&child, ids);
    }
}
