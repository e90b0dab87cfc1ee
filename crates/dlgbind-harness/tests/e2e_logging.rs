#![forbid(unsafe_code)]

//! Structured log events emitted at runtime.

use dlgbind_controls::list::codes;
use dlgbind_controls::{Binding, Control, Item, Properties, Value};
use dlgbind_harness::TestDialog;
use dlgbind_harness::fixtures::{Person, Roster, roster_dialog};
use dlgbind_harness::logging::{Captured, capture};
use tracing::Level;

fn with_message<'a>(events: &'a [Captured], message: &str) -> Vec<&'a Captured> {
    events.iter().filter(|event| event.message == message).collect()
}

fn open() -> (std::rc::Rc<Roster>, TestDialog) {
    let roster = Roster::new(&[Person::new("Ada", 36), Person::new("Bob", 41)]);
    let dialog = TestDialog::build(&roster_dialog(), roster.value()).expect("builds");
    (roster, dialog)
}

#[test]
fn rebind_failure_is_logged_and_detaches() {
    let (_roster, dialog) = open();

    // The new model lacks `is_locked`, which the root group needs.
    let bare = Value::from(Item::new(Properties::new()));
    let ((), events) = capture(|| dialog.root.set_value(bare));

    let failures = with_message(&events, "control.rebind_failed");
    assert_eq!(failures.len(), 1, "only the root group fails");
    assert_eq!(failures[0].level, Level::ERROR);
    assert_eq!(failures[0].field("control"), Some("3"));
    assert!(
        failures[0]
            .field("error")
            .is_some_and(|error| error.contains("is_locked"))
    );

    // Descendants saw a detached context and rebound quietly.
    assert_eq!(with_message(&events, "control.rebind").len(), 8);
    let root = dialog.find(3).expect("root control");
    assert_eq!(root.core().context().binding(), Binding::Bound(Value::None));
    assert!(dialog.host.rows(4).is_empty());
    assert_eq!(dialog.host.shown(6), Value::from(""));
}

#[test]
fn unknown_control_is_a_warning() {
    let (_roster, dialog) = open();
    let (delivered, events) = capture(|| dialog.dispatch(99, 0));
    assert!(!delivered);
    let warnings = with_message(&events, "router.unknown_control");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, Level::WARN);
}

#[test]
fn unmapped_payload_is_a_warning() {
    let (_roster, dialog) = open();
    let ((), events) = capture(|| {
        dialog.dispatch(4, -42);
        dialog.dispatch(4, codes::SORT_COLUMN);
    });
    let unmapped = with_message(&events, "list.unmapped_event");
    assert_eq!(unmapped.len(), 1);
    assert_eq!(unmapped[0].field("code"), Some("-42"));
    assert_eq!(with_message(&events, "list.event_ignored").len(), 1);
}

#[test]
fn delete_logs_confirmation_and_resume_outcome() {
    let (roster, dialog) = open();
    dialog.click_rows(4, &[1]);
    dialog.host.answer_confirm(true);

    let ((), events) = capture(|| {
        dialog.dispatch(4, codes::DELETE_KEY);
    });
    assert_eq!(roster.people.len(), 1);

    let deletes = with_message(&events, "list.delete_selected");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].field("confirmed"), Some("true"));
    assert_eq!(deletes[0].field("count"), Some("1"));

    let outcomes: Vec<&str> = with_message(&events, "list.resume")
        .iter()
        .filter_map(|event| event.field("outcome"))
        .collect();
    assert!(outcomes.contains(&"changed"));
}
