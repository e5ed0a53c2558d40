use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text used for any field the portal omits or sends as `null`.
pub const PLACEHOLDER: &str = "None";

/// Coerces an optional JSON field to text without ever failing.
///
/// Strings are taken verbatim, missing and `null` fields become
/// [`PLACEHOLDER`], anything else is rendered as its JSON text.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn field(raw: &Value, name: &str) -> String {
    coerce_text(raw.get(name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetadata {
    #[serde(rename = "AccountId")]
    pub account_id: String,
    #[serde(rename = "AccountName")]
    pub account_name: String,
    #[serde(rename = "AccountEmail")]
    pub account_email: String,
}

impl SearchMetadata {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            account_id: field(raw, "AccountId"),
            account_name: field(raw, "AccountName"),
            account_email: field(raw, "AccountEmail"),
        }
    }
}

/// An application instance listed by the portal directory.
///
/// Immutable once discovered; `name` is the display name used when building
/// deep-links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstance {
    pub id: String,
    pub name: String,
    pub description: String,
    pub application_id: String,
    pub application_name: String,
    pub icon: String,
    pub search_metadata: SearchMetadata,
}

impl AppInstance {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            description: field(raw, "description"),
            application_id: field(raw, "applicationId"),
            application_name: field(raw, "applicationName"),
            icon: field(raw, "icon"),
            search_metadata: raw
                .get("searchMetadata")
                .map(SearchMetadata::from_value)
                .unwrap_or_else(|| SearchMetadata::from_value(&Value::Null)),
        }
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for AppInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A launchable profile of an application instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub protocol: String,
    #[serde(rename = "relayState")]
    pub relay_state: String,
}

impl Profile {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            id: field(raw, "id"),
            name: field(raw, "name"),
            description: field(raw, "description"),
            url: field(raw, "url"),
            protocol: field(raw, "protocol"),
            relay_state: field(raw, "relayState"),
        }
    }

    /// Returns a copy of this profile pointing at `url`.
    pub fn with_url(&self, url: String) -> Self {
        Self {
            url,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerce_text_placeholders() {
        assert_eq!(coerce_text(None), PLACEHOLDER);
        assert_eq!(coerce_text(Some(&Value::Null)), PLACEHOLDER);
        assert_eq!(coerce_text(Some(&json!("abc"))), "abc");
        assert_eq!(coerce_text(Some(&json!(42))), "42");
    }

    #[test]
    fn app_instance_from_value() {
        let raw = json!({
            "id": "ins-1",
            "name": "My Team",
            "applicationId": "app-1",
            "searchMetadata": {
                "AccountId": "123456789012",
                "AccountName": "my-team",
                "AccountEmail": "team@example.com"
            }
        });
        let instance = AppInstance::from_value(&raw);
        assert_eq!(instance.id, "ins-1");
        assert_eq!(instance.display_name(), "My Team");
        assert_eq!(instance.description, PLACEHOLDER);
        assert_eq!(instance.search_metadata.account_id, "123456789012");
    }

    #[test]
    fn app_instance_without_search_metadata() {
        let instance = AppInstance::from_value(&json!({ "id": "ins-2" }));
        assert_eq!(instance.search_metadata.account_email, PLACEHOLDER);
    }

    #[test]
    fn profile_serializes_wire_names() {
        let profile = Profile::from_value(&json!({
            "id": "p-1",
            "relayState": "rs"
        }));
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["relayState"], "rs");
        assert_eq!(value["protocol"], PLACEHOLDER);
    }
}
