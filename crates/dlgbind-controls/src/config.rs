#![forbid(unsafe_code)]

//! Binding configuration shared by every control a factory builds.

use serde::{Deserialize, Serialize};

use crate::host::DialogId;
use crate::value::MULTI_VALUE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Host dialog stamped on every control.
    pub dialog_id: u32,
    /// First control identifier the factory hands out. The host reserves 1
    /// and 2 for its default OK/Cancel buttons.
    pub first_control_id: u32,
    /// Text-widget rendering of a disagreeing aggregate.
    pub multi_value_label: String,
    pub confirm_delete_message: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            dialog_id: 1,
            first_control_id: 3,
            multi_value_label: MULTI_VALUE.to_string(),
            confirm_delete_message: "Delete the selected items? This cannot be undone."
                .to_string(),
        }
    }
}

impl BindingConfig {
    #[must_use]
    pub fn dialog(&self) -> DialogId {
        DialogId(self.dialog_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: BindingConfig =
            serde_json::from_str(r#"{ "dialog_id": 9 }"#).expect("valid config");
        assert_eq!(config.dialog(), DialogId(9));
        assert_eq!(config.first_control_id, 3);
        assert_eq!(config.multi_value_label, MULTI_VALUE);
    }

    #[test]
    fn serializes_every_field() {
        let json = serde_json::to_value(BindingConfig::default()).expect("serializable");
        assert_eq!(json["first_control_id"], 3);
        assert!(json["confirm_delete_message"].is_string());
    }
}
