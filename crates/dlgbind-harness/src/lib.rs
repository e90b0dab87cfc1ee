#![forbid(unsafe_code)]

//! Test harness for dlgbind.
//!
//! - [`host::RecordingHost`]: an in-memory host toolkit logging every call
//!   and modelling the widgets' visible state.
//! - [`fixtures`]: view-models built on the property registry, plus the
//!   markup trees the scenarios use.
//! - [`dialog::TestDialog`]: builds a control tree and drives it with
//!   simulated user input.
//! - [`logging::capture`]: collects the structured events emitted while a
//!   closure runs.
//!
//! End-to-end scenarios live under `tests/`.

pub mod dialog;
pub mod fixtures;
pub mod host;
pub mod logging;

pub use dialog::TestDialog;
pub use host::{HostCall, RecordingHost, WidgetState};
