#![forbid(unsafe_code)]

//! Alignment capability of controls inside a container.

use crate::error::{BindError, Result};
use crate::node::ControlNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// The markup attribute carrying this orientation's mode.
    #[must_use]
    pub const fn attribute(self) -> &'static str {
        match self {
            Self::Horizontal => "align-horizontal",
            Self::Vertical => "align-vertical",
        }
    }
}

/// How a widget follows its container when the container grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignMode {
    Resize,
    Shift,
}

impl AlignMode {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "resize" => Some(Self::Resize),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }
}

/// Implemented by controls the host may stretch or move.
pub trait Alignable {
    fn alignment(&self, orientation: Orientation) -> Option<AlignMode>;
}

/// Per-orientation modes read from markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alignment {
    pub horizontal: Option<AlignMode>,
    pub vertical: Option<AlignMode>,
}

impl Alignment {
    /// Read both orientations, accepting only `allowed` modes.
    pub fn from_node(node: &ControlNode, allowed: &[AlignMode]) -> Result<Self> {
        let read = |orientation: Orientation| -> Result<Option<AlignMode>> {
            let attribute = orientation.attribute();
            let Some(text) = node.attribute(attribute) else {
                return Ok(None);
            };
            match AlignMode::parse(text) {
                Some(mode) if allowed.contains(&mode) => Ok(Some(mode)),
                _ => Err(BindError::invalid(&node.tag, attribute, text)),
            }
        };
        Ok(Self {
            horizontal: read(Orientation::Horizontal)?,
            vertical: read(Orientation::Vertical)?,
        })
    }
}

impl Alignable for Alignment {
    fn alignment(&self, orientation: Orientation) -> Option<AlignMode> {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }
}
