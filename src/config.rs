//! Gateway settings.
//!
//! The admin form is described by a list of [`SettingField`] declarations.
//! Stored option values (a flat map of strings, `"yes"`/`"no"` for checkboxes)
//! are turned into a typed [`GatewaySettings`] by applying the declared
//! defaults for anything missing.

use crate::domain::charge::ChargeType;
use crate::error::{GatewayError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Identifier of this gateway in the host's list of payment methods.
pub const GATEWAY_ID: &str = "cardgate";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Checkbox,
    Text,
    Textarea,
    Select { options: Vec<(String, String)> },
}

/// One entry of the admin settings form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingField {
    pub key: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub default: &'static str,
}

impl SettingField {
    fn new(key: &'static str, kind: FieldKind, title: &'static str, default: &'static str) -> Self {
        Self {
            key,
            kind,
            title,
            label: None,
            description: None,
            default,
        }
    }

    fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Declarations of every option the gateway reads, in form order.
pub fn settings_fields() -> Vec<SettingField> {
    vec![
        SettingField::new("enabled", FieldKind::Checkbox, "Enable/Disable", "yes")
            .label("Enable card payments"),
        SettingField::new("title", FieldKind::Text, "Title", "Credit Card Payment")
            .description("This controls the title which the user sees during checkout."),
        SettingField::new("description", FieldKind::Textarea, "Description", "")
            .description("This controls the description which the user sees during checkout."),
        SettingField::new(
            "charge_type",
            FieldKind::Select {
                options: vec![
                    ("capture".to_string(), "Authorize & Capture".to_string()),
                    ("authorize".to_string(), "Authorize Only".to_string()),
                ],
            },
            "Charge Type",
            "capture",
        )
        .description("Choose to capture payment at checkout, or authorize only to capture later."),
        SettingField::new("additional_fields", FieldKind::Checkbox, "Additional Fields", "no")
            .label("Use Additional Fields")
            .description("Add a Billing ZIP and a Name on Card for card authentication purposes."),
        SettingField::new("saved_cards", FieldKind::Checkbox, "Saved Cards", "yes")
            .description("Allow customers to use saved cards for future purchases."),
        SettingField::new("testmode", FieldKind::Checkbox, "Test Mode", "no")
            .label("Turn on testing")
            .description("Use the processor's test mode to verify everything works before going live."),
        SettingField::new("test_secret_key", FieldKind::Text, "API Test Secret key", ""),
        SettingField::new("test_publishable_key", FieldKind::Text, "API Test Publishable key", ""),
        SettingField::new("live_secret_key", FieldKind::Text, "API Live Secret key", ""),
        SettingField::new("live_publishable_key", FieldKind::Text, "API Live Publishable key", ""),
    ]
}

/// A secret/publishable key pair for one processor mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiCredentials {
    pub secret_key: String,
    pub publishable_key: String,
}

/// Typed view over the stored gateway options.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub charge_type: ChargeType,
    pub additional_fields: bool,
    pub saved_cards: bool,
    pub test_mode: bool,
    pub test_credentials: ApiCredentials,
    pub live_credentials: ApiCredentials,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Credit Card Payment".to_string(),
            description: String::new(),
            charge_type: ChargeType::Capture,
            additional_fields: false,
            saved_cards: true,
            test_mode: false,
            test_credentials: ApiCredentials::default(),
            live_credentials: ApiCredentials::default(),
        }
    }
}

impl GatewaySettings {
    /// Builds settings from stored option values, falling back to the declared
    /// default of every field that is absent.
    pub fn from_form_values(values: &HashMap<String, String>) -> Result<Self> {
        let fields = settings_fields();
        let mut resolved: HashMap<&str, String> = HashMap::new();

        for field in &fields {
            let value = values
                .get(field.key)
                .cloned()
                .unwrap_or_else(|| field.default.to_string());

            match &field.kind {
                FieldKind::Checkbox if value != "yes" && value != "no" => {
                    return Err(GatewayError::ConfigError(format!(
                        "{} must be \"yes\" or \"no\", got {:?}",
                        field.key, value
                    )));
                }
                FieldKind::Select { options } if !options.iter().any(|(k, _)| *k == value) => {
                    return Err(GatewayError::ConfigError(format!(
                        "{} has unknown option {:?}",
                        field.key, value
                    )));
                }
                _ => {}
            }
            resolved.insert(field.key, value);
        }

        let text = |key: &str| resolved.get(key).cloned().unwrap_or_default();
        let flag = |key: &str| resolved.get(key).is_some_and(|v| v == "yes");

        Ok(Self {
            enabled: flag("enabled"),
            title: text("title"),
            description: text("description"),
            charge_type: text("charge_type").parse()?,
            additional_fields: flag("additional_fields"),
            saved_cards: flag("saved_cards"),
            test_mode: flag("testmode"),
            test_credentials: ApiCredentials {
                secret_key: text("test_secret_key"),
                publishable_key: text("test_publishable_key"),
            },
            live_credentials: ApiCredentials {
                secret_key: text("live_secret_key"),
                publishable_key: text("live_publishable_key"),
            },
        })
    }

    /// Loads a JSON object of option values from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let values: HashMap<String, String> = serde_json::from_str(&raw)?;
        Self::from_form_values(&values)
    }

    /// The key pair for the active mode.
    pub fn credentials(&self) -> &ApiCredentials {
        if self.test_mode {
            &self.test_credentials
        } else {
            &self.live_credentials
        }
    }

    /// Enabled, and the active mode has at least one key configured.
    pub fn is_available(&self) -> bool {
        let creds = self.credentials();
        self.enabled && !(creds.secret_key.is_empty() && creds.publishable_key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_follow_declarations() {
        let settings = GatewaySettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.title, "Credit Card Payment");
        assert_eq!(settings.charge_type, ChargeType::Capture);
        assert!(!settings.additional_fields);
        assert!(settings.saved_cards);
        assert!(!settings.test_mode);
    }

    #[test]
    fn test_default_matches_empty_form() {
        let parsed = GatewaySettings::from_form_values(&HashMap::new()).unwrap();
        assert_eq!(parsed, GatewaySettings::default());
    }

    #[test]
    fn test_credentials_follow_test_mode() {
        let settings = GatewaySettings::from_form_values(&values(&[
            ("testmode", "yes"),
            ("test_secret_key", "sk_test_1"),
            ("live_secret_key", "sk_live_1"),
        ]))
        .unwrap();
        assert_eq!(settings.credentials().secret_key, "sk_test_1");

        let live = GatewaySettings {
            test_mode: false,
            ..settings
        };
        assert_eq!(live.credentials().secret_key, "sk_live_1");
    }

    #[test]
    fn test_unknown_select_option_rejected() {
        let result = GatewaySettings::from_form_values(&values(&[("charge_type", "later")]));
        assert!(matches!(result, Err(GatewayError::ConfigError(_))));
    }

    #[test]
    fn test_bad_checkbox_rejected() {
        let result = GatewaySettings::from_form_values(&values(&[("enabled", "true")]));
        assert!(matches!(result, Err(GatewayError::ConfigError(_))));
    }

    #[test]
    fn test_availability_requires_keys_and_enabled() {
        let mut settings = GatewaySettings::default();
        assert!(!settings.is_available());

        settings.live_credentials.publishable_key = "pk_live_1".to_string();
        assert!(settings.is_available());

        settings.enabled = false;
        assert!(!settings.is_available());
    }

    #[test]
    fn test_schema_serializes_select_options() {
        let json = serde_json::to_value(settings_fields()).unwrap();
        let charge_type = json
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["key"] == "charge_type")
            .unwrap();
        assert_eq!(charge_type["type"], "select");
        assert_eq!(charge_type["default"], "capture");
        assert_eq!(charge_type["options"][1][0], "authorize");
    }
}
