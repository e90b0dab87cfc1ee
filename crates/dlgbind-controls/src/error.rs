#![forbid(unsafe_code)]

//! Configuration errors raised while building or rebinding a control tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("unknown control tag: {tag}")]
    UnknownTag { tag: String },

    #[error("<{tag}> is missing required attribute `{attribute}`")]
    MissingAttribute { tag: String, attribute: String },

    #[error("<{tag}> attribute `{attribute}` has invalid value {value:?}")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    #[error("property not found on the data-context chain: {name}")]
    UnknownProperty { name: String },

    #[error("property `{name}` is a {found}, expected a {expected}")]
    PropertyKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("item {index} bound through `{name}` is not a view-model")]
    NotAViewModel { name: String, index: usize },
}

impl BindError {
    #[must_use]
    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty { name: name.into() }
    }

    #[must_use]
    pub fn missing(tag: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            tag: tag.into(),
            attribute: attribute.into(),
        }
    }

    #[must_use]
    pub fn invalid(
        tag: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            tag: tag.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}
