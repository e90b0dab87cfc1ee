#![forbid(unsafe_code)]

//! Named observable properties and the registry view-models build from them.
//!
//! Markup names properties by string; the registry maps each name to a typed
//! observable once, at view-model construction. Binding then checks the kind
//! of the resolved property and reports a [`BindError`] on mismatch instead
//! of failing on first access.

use std::fmt;

use ahash::AHashMap;
use dlgbind_reactive::{ObservableCommand, ObservableField, ObservableList, ObservableMethod};

use crate::error::{BindError, Result};
use crate::value::{Value, ViewModel};

/// A bindable observable.
#[derive(Clone)]
pub enum Property {
    Field(ObservableField<Value>),
    List(ObservableList<Value>),
    Method(ObservableMethod<Value>),
    Command(ObservableCommand),
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
            Self::Method(method) => f.debug_tuple("Method").field(method).finish(),
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
        }
    }
}

impl Property {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Field(_) => "field",
            Self::List(_) => "list",
            Self::Method(_) => "method",
            Self::Command(_) => "command",
        }
    }

    fn mismatch(&self, name: &str, expected: &'static str) -> BindError {
        BindError::PropertyKind {
            name: name.to_string(),
            expected,
            found: self.kind(),
        }
    }

    pub fn into_field(self, name: &str) -> Result<ObservableField<Value>> {
        match self {
            Self::Field(field) => Ok(field),
            other => Err(other.mismatch(name, "field")),
        }
    }

    pub fn into_list(self, name: &str) -> Result<ObservableList<Value>> {
        match self {
            Self::List(list) => Ok(list),
            other => Err(other.mismatch(name, "list")),
        }
    }

    pub fn into_command(self, name: &str) -> Result<ObservableCommand> {
        match self {
            Self::Command(command) => Ok(command),
            other => Err(other.mismatch(name, "command")),
        }
    }
}

impl From<ObservableField<Value>> for Property {
    fn from(field: ObservableField<Value>) -> Self {
        Self::Field(field)
    }
}

impl From<ObservableList<Value>> for Property {
    fn from(list: ObservableList<Value>) -> Self {
        Self::List(list)
    }
}

impl From<ObservableMethod<Value>> for Property {
    fn from(method: ObservableMethod<Value>) -> Self {
        Self::Method(method)
    }
}

impl From<ObservableCommand> for Property {
    fn from(command: ObservableCommand) -> Self {
        Self::Command(command)
    }
}

/// Name → property registry.
///
/// Also usable directly as a property-bag [`ViewModel`].
#[derive(Clone, Default)]
pub struct Properties {
    entries: AHashMap<String, Property>,
    text: Option<String>,
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Properties")
            .field("names", &names)
            .field("text", &self.text)
            .finish()
    }
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `property` under `name`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn insert(&mut self, name: impl Into<String>, property: impl Into<Property>) {
        let name = name.into();
        assert!(
            !self.entries.contains_key(&name),
            "property `{name}` registered twice"
        );
        self.entries.insert(name, property.into());
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: ObservableField<Value>) -> Self {
        self.insert(name, field);
        self
    }

    #[must_use]
    pub fn list(mut self, name: impl Into<String>, list: ObservableList<Value>) -> Self {
        self.insert(name, list);
        self
    }

    #[must_use]
    pub fn method(mut self, name: impl Into<String>, method: ObservableMethod<Value>) -> Self {
        self.insert(name, method);
        self
    }

    #[must_use]
    pub fn command(mut self, name: impl Into<String>, command: ObservableCommand) -> Self {
        self.insert(name, command);
        self
    }

    /// Row text when the bag itself is listed.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Property> {
        self.entries.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ViewModel for Properties {
    fn property(&self, name: &str) -> Option<Property> {
        self.get(name)
    }

    fn text(&self) -> String {
        self.text.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_shared_handles() {
        let name = ObservableField::new(Value::from("a"));
        let props = Properties::new().field("name", name.clone());
        let found = props
            .get("name")
            .and_then(|p| p.into_field("name").ok())
            .map(|f| f.ptr_eq(&name));
        assert_eq!(found, Some(true));
        assert!(props.get("missing").is_none());
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let props = Properties::new().list("rows", ObservableList::new());
        let err = props
            .get("rows")
            .map(|p| p.into_field("rows"))
            .and_then(std::result::Result::err);
        assert_eq!(
            err,
            Some(BindError::PropertyKind {
                name: "rows".into(),
                expected: "field",
                found: "list",
            })
        );
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_names_panic() {
        let _ = Properties::new()
            .field("a", ObservableField::new(Value::None))
            .field("a", ObservableField::new(Value::None));
    }

    #[test]
    fn bag_text_defaults_empty() {
        assert_eq!(Properties::new().text(), "");
        assert_eq!(Properties::new().with_text("row").text(), "row");
    }
}
