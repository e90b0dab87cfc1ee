#![forbid(unsafe_code)]

//! The dynamic value carried by bound fields, lists and widgets.

use std::fmt;
use std::rc::Rc;

use crate::property::Property;

/// Shown for an aggregate whose items disagree.
///
/// A real value equal to this text is indistinguishable from a mismatch.
pub const MULTI_VALUE: &str = "<multiple values>";

/// An object exposing named observable properties to the binding layer.
pub trait ViewModel {
    /// The property registered under `name`, if any.
    fn property(&self, name: &str) -> Option<Property>;

    /// Text used when the view-model itself is shown as a list row.
    fn text(&self) -> String {
        String::new()
    }
}

/// A shared handle to a view-model. Equality is identity.
#[derive(Clone)]
pub struct Item(Rc<dyn ViewModel>);

impl Item {
    pub fn new(view_model: impl ViewModel + 'static) -> Self {
        Self(Rc::new(view_model))
    }

    #[must_use]
    pub fn from_rc(view_model: Rc<dyn ViewModel>) -> Self {
        Self(view_model)
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<Property> {
        self.0.property(name)
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.0.text()
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({:p}, {:?})", self.addr(), self.text())
    }
}

/// A bound value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Object(Item),
}

impl Value {
    /// The aggregate-mismatch sentinel.
    #[must_use]
    pub fn multi() -> Self {
        Self::Text(MULTI_VALUE.to_string())
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Text(text) if text == MULTI_VALUE)
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Truthiness as used by `data-disabled` bindings.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Real(r) => *r != 0.0,
            Self::Text(text) => !text.is_empty(),
            Self::Object(_) => true,
        }
    }

    /// Row/label text. `None` renders empty.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
            Self::Text(text) => text.clone(),
            Self::Object(item) => item.text(),
        }
    }

    #[must_use]
    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Self::Object(item) => Some(item),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Item> for Value {
    fn from(value: Item) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}
