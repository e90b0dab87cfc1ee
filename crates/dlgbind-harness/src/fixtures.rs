#![forbid(unsafe_code)]

//! View-model fixtures and markup trees shared by the end-to-end tests.

use std::rc::Rc;

use dlgbind_controls::{ControlNode, Item, Properties, Property, Value, ViewModel};
use dlgbind_reactive::{ObservableCommand, ObservableField, ObservableList, ObservableMethod};

/// Text values, in order.
#[must_use]
pub fn texts(values: &[&str]) -> Vec<Value> {
    values.iter().map(|value| Value::from(*value)).collect()
}

/// A row view-model: a name, an age and an active flag.
pub struct Person {
    pub name: ObservableField<Value>,
    pub age: ObservableField<Value>,
    pub active: ObservableField<Value>,
    properties: Properties,
}

impl Person {
    #[must_use]
    pub fn new(name: &str, age: i64) -> Rc<Self> {
        let name = ObservableField::new(Value::from(name));
        let age = ObservableField::new(Value::from(age));
        let active = ObservableField::new(Value::from(true));
        let properties = Properties::new()
            .field("name", name.clone())
            .field("age", age.clone())
            .field("active", active.clone());
        Rc::new(Self {
            name,
            age,
            active,
            properties,
        })
    }

    /// This person as a bindable value. Every call yields an equal value.
    #[must_use]
    pub fn value(self: &Rc<Self>) -> Value {
        let view_model: Rc<dyn ViewModel> = self.clone();
        Value::from(Item::from_rc(view_model))
    }
}

impl ViewModel for Person {
    fn property(&self, name: &str) -> Option<Property> {
        self.properties.get(name)
    }

    fn text(&self) -> String {
        self.name.get().display()
    }
}

/// A dialog view-model: a list of people, a selection, the person being
/// edited, a lock flag and a command removing the selection.
pub struct Roster {
    pub title: ObservableField<Value>,
    pub people: ObservableList<Value>,
    pub selected: ObservableList<Value>,
    pub current: ObservableField<Value>,
    pub locked: ObservableField<Value>,
    pub is_locked: ObservableMethod<Value>,
    pub remove_selected: ObservableCommand,
    properties: Properties,
}

impl Roster {
    #[must_use]
    pub fn new(people: &[Rc<Person>]) -> Rc<Self> {
        let title = ObservableField::new(Value::from("People"));
        let people = ObservableList::from_vec(people.iter().map(Person::value).collect());
        let selected = ObservableList::new();
        let current = ObservableField::new(Value::None);
        let locked = ObservableField::new(Value::from(false));

        let is_locked = {
            let flag = locked.clone();
            ObservableMethod::new(move || flag.get(), &[&locked])
        };
        let remove_selected = {
            let (people, from) = (people.clone(), selected.clone());
            let guard = selected.clone();
            ObservableCommand::guarded(
                move || {
                    let doomed = from.snapshot();
                    people.suspend_events();
                    for person in &doomed {
                        people.remove(person);
                    }
                    people.resume_events();
                    from.clear();
                },
                move || !guard.is_empty(),
                &[&selected],
            )
        };

        let properties = Properties::new()
            .field("title", title.clone())
            .list("people", people.clone())
            .list("selected", selected.clone())
            .field("current", current.clone())
            .field("locked", locked.clone())
            .method("is_locked", is_locked.clone())
            .command("remove_selected", remove_selected.clone());
        Rc::new(Self {
            title,
            people,
            selected,
            current,
            locked,
            is_locked,
            remove_selected,
            properties,
        })
    }

    #[must_use]
    pub fn value(self: &Rc<Self>) -> Value {
        let view_model: Rc<dyn ViewModel> = self.clone();
        Value::from(Item::from_rc(view_model))
    }
}

impl ViewModel for Roster {
    fn property(&self, name: &str) -> Option<Property> {
        self.properties.get(name)
    }

    fn text(&self) -> String {
        self.title.get().display()
    }
}

/// The people editor used by most scenarios:
///
/// ```text
/// Group (vertical)                       id 3
/// ├── ListBrowser  people / selected     id 4
/// ├── GroupBox "Selection"               id 5
/// │   ├── TextBox   selected.name        id 6
/// │   └── IntegerBox selected.age        id 7
/// ├── GroupBox "Current" context=current id 8
/// │   └── TextBox   name                 id 9
/// └── Button remove_selected             id 10
/// ```
#[must_use]
pub fn roster_dialog() -> ControlNode {
    ControlNode::new("Group")
        .attr("data-disabled", "is_locked")
        .child(
            ControlNode::new("ListBrowser")
                .attr("data-items", "people")
                .attr("data-selected-items", "selected")
                .attr("data-value", "name")
                .attr("height", "8")
                .attr("align-horizontal", "resize"),
        )
        .child(
            ControlNode::new("GroupBox")
                .attr("label", "Selection")
                .attr("layout", "horizontal")
                .child(
                    ControlNode::new("TextBox")
                        .attr("data-items", "selected")
                        .attr("data-value", "name"),
                )
                .child(
                    ControlNode::new("IntegerBox")
                        .attr("data-items", "selected")
                        .attr("data-value", "age"),
                ),
        )
        .child(
            ControlNode::new("GroupBox")
                .attr("label", "Current")
                .attr("data-context", "current")
                .child(ControlNode::new("TextBox").attr("data-value", "name")),
        )
        .child(
            ControlNode::new("Button")
                .attr("label", "Remove")
                .attr("data-command", "remove_selected")
                .attr("align-horizontal", "shift"),
        )
}
