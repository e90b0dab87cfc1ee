#![forbid(unsafe_code)]

//! End-to-end scenarios on the people editor fixture.
//!
//! Control identifiers (pre-order from 3):
//!
//! | id | control |
//! |----|---------|
//! | 3  | root `Group`, disabled by `is_locked` |
//! | 4  | `ListBrowser` of people, selection `selected` |
//! | 5  | `GroupBox` "Selection" |
//! | 6  | `TextBox` aggregate over `selected.name` |
//! | 7  | `IntegerBox` aggregate over `selected.age` |
//! | 8  | `GroupBox` "Current", context `current` |
//! | 9  | `TextBox` `name` of the current person |
//! | 10 | `Button` running `remove_selected` |

use std::rc::Rc;

use dlgbind_controls::{MULTI_VALUE, Value};
use dlgbind_harness::TestDialog;
use dlgbind_harness::fixtures::{Person, Roster, roster_dialog};
use dlgbind_harness::logging::capture;

const ROOT: u32 = 3;
const PEOPLE: u32 = 4;
const NAMES: u32 = 6;
const AGES: u32 = 7;
const CURRENT_NAME: u32 = 9;
const REMOVE: u32 = 10;

fn open(people: &[Rc<Person>]) -> (Rc<Roster>, TestDialog) {
    let roster = Roster::new(people);
    let dialog = TestDialog::build(&roster_dialog(), roster.value()).expect("roster dialog builds");
    (roster, dialog)
}

fn ada_and_bob() -> (Rc<Person>, Rc<Person>) {
    (Person::new("Ada", 36), Person::new("Bob", 41))
}

// ── Initial state ───────────────────────────────────────────────────────

#[test]
fn initial_render() {
    let (ada, bob) = ada_and_bob();
    let (_roster, dialog) = open(&[ada, bob]);

    assert_eq!(dialog.ids(), (3..=10).collect::<Vec<_>>());
    assert_eq!(dialog.host.rows(PEOPLE), vec!["Ada", "Bob"]);
    assert_eq!(dialog.host.shown(NAMES), Value::from(""));
    assert_eq!(dialog.host.shown(AGES), Value::from(""));
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from(""));
    assert_eq!(dialog.host.is_enabled(ROOT), Some(true));
    assert_eq!(dialog.host.is_enabled(REMOVE), Some(false));
}

// ── Aggregate editing ───────────────────────────────────────────────────

#[test]
fn selection_drives_aggregate_fields() {
    let (ada, bob) = ada_and_bob();
    let (roster, dialog) = open(&[ada.clone(), bob.clone()]);

    dialog.click_rows(PEOPLE, &[0]);
    assert_eq!(roster.selected.snapshot(), vec![ada.value()]);
    assert_eq!(dialog.host.shown(NAMES), Value::from("Ada"));
    assert_eq!(dialog.host.shown(AGES), Value::from(36));
    assert_eq!(dialog.host.is_enabled(REMOVE), Some(true));

    dialog.click_rows(PEOPLE, &[0, 1]);
    assert_eq!(dialog.host.shown(NAMES), Value::from(MULTI_VALUE));
    assert_eq!(dialog.host.shown(AGES), Value::from(MULTI_VALUE));

    // Committing the untouched placeholder writes nothing.
    dialog.type_into(NAMES, MULTI_VALUE);
    assert_eq!(ada.name.get(), Value::from("Ada"));
    assert_eq!(bob.name.get(), Value::from("Bob"));

    dialog.type_into(AGES, "50");
    assert_eq!(ada.age.get(), Value::from(50));
    assert_eq!(bob.age.get(), Value::from(50));
    assert_eq!(dialog.host.shown(AGES), Value::from("50"));

    // A later model edit splits the aggregate again.
    bob.age.set(Value::from(51));
    assert_eq!(dialog.host.shown(AGES), Value::from(MULTI_VALUE));
}

#[test]
fn unparseable_numbers_are_ignored() {
    let (ada, bob) = ada_and_bob();
    let (_roster, dialog) = open(&[ada.clone(), bob]);
    dialog.click_rows(PEOPLE, &[0]);

    dialog.type_into(AGES, "forty");
    assert_eq!(ada.age.get(), Value::from(36));
}

#[test]
fn renaming_through_the_aggregate_updates_list_rows() {
    let (ada, bob) = ada_and_bob();
    let (_roster, dialog) = open(&[ada.clone(), bob]);
    dialog.click_rows(PEOPLE, &[0]);
    dialog.host.take_calls();

    dialog.type_into(NAMES, "Augusta");
    assert_eq!(ada.name.get(), Value::from("Augusta"));
    assert_eq!(dialog.host.rows(PEOPLE), vec!["Augusta", "Bob"]);
    // The text box already shows what was typed.
    assert!(dialog.host.calls_for(NAMES).is_empty());
}

// ── Data context ────────────────────────────────────────────────────────

#[test]
fn data_context_follows_the_bound_field() {
    let (ada, bob) = ada_and_bob();
    let (roster, dialog) = open(&[ada.clone(), bob.clone()]);

    roster.current.set(ada.value());
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from("Ada"));
    ada.name.set(Value::from("Ada L."));
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from("Ada L."));

    roster.current.set(bob.value());
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from("Bob"));

    // The old context no longer reaches the widget.
    dialog.host.take_calls();
    ada.name.set(Value::from("Ada K."));
    assert!(dialog.host.calls_for(CURRENT_NAME).is_empty());

    dialog.type_into(CURRENT_NAME, "Robert");
    assert_eq!(bob.name.get(), Value::from("Robert"));

    roster.current.set(Value::None);
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from(""));
    dialog.type_into(CURRENT_NAME, "ignored");
    assert_eq!(bob.name.get(), Value::from("Robert"));
}

#[test]
fn replacing_the_dialog_model_cascades_depth_first() {
    let (ada, bob) = ada_and_bob();
    let (_roster, dialog) = open(&[ada, bob]);
    let cleo = Person::new("Cleo", 29);
    let next = Roster::new(&[cleo.clone()]);
    next.current.set(cleo.value());

    let ((), events) = capture(|| dialog.root.set_value(next.value()));
    let rebinds: Vec<&str> = events
        .iter()
        .filter(|event| event.message == "control.rebind")
        .filter_map(|event| event.field("control"))
        .collect();
    assert_eq!(rebinds, vec!["3", "4", "5", "6", "7", "8", "9", "10"]);

    assert_eq!(dialog.host.rows(PEOPLE), vec!["Cleo"]);
    assert_eq!(dialog.host.shown(CURRENT_NAME), Value::from("Cleo"));
}

// ── Enabled state and commands ──────────────────────────────────────────

#[test]
fn lock_flag_disables_the_root_group() {
    let (ada, bob) = ada_and_bob();
    let (roster, dialog) = open(&[ada, bob]);

    roster.locked.set(Value::from(true));
    assert_eq!(dialog.host.is_enabled(ROOT), Some(false));
    roster.locked.set(Value::from(false));
    assert_eq!(dialog.host.is_enabled(ROOT), Some(true));
}

#[test]
fn remove_button_runs_its_command() {
    let (ada, bob) = ada_and_bob();
    let (roster, dialog) = open(&[ada, bob.clone()]);

    // Disabled: nothing happens.
    dialog.dispatch(REMOVE, 0);
    assert_eq!(roster.people.len(), 2);

    dialog.click_rows(PEOPLE, &[0]);
    assert!(dialog.dispatch(REMOVE, 0));
    assert_eq!(roster.people.snapshot(), vec![bob.value()]);
    assert!(roster.selected.is_empty());
    assert_eq!(dialog.host.rows(PEOPLE), vec!["Bob"]);
    assert_eq!(dialog.host.is_enabled(REMOVE), Some(false));
    assert_eq!(dialog.host.shown(NAMES), Value::from(""));
}
