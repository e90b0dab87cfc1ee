#![forbid(unsafe_code)]

//! Parsed markup nodes, as handed over by the dialog layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};

/// One markup element: a tag, its attributes and its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ControlNode>,
}

impl ControlNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: ControlNode) -> Self {
        self.children.push(child);
        self
    }

    /// A non-empty attribute value. Empty attributes count as absent.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| BindError::missing(&self.tag, name))
    }

    /// An optional unsigned attribute such as `width`.
    pub fn number(&self, name: &str) -> Result<Option<u32>> {
        self.attribute(name)
            .map(|text| {
                text.trim()
                    .parse()
                    .map_err(|_| BindError::invalid(&self.tag, name, text))
            })
            .transpose()
    }
}
