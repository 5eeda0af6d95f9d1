//! Feature toggle domain model
//!
//! A `FeatureToggle` can only be built through [`FeatureToggle::new`], which runs
//! identity validation, and its name can only change through
//! [`FeatureToggle::rename`], which re-runs it. The key is fixed for life.

use crate::orm::contexts::ContextName;
use crate::validation::{check_name, check_toggle_identity, ToggleError};
use serde::{Deserialize, Serialize};

/// A toggle's association with one deployment context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub id: i32,
    pub name: ContextName,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureToggle {
    id: i32,
    key: String,
    name: String,
    description: String,
    contexts: Vec<Context>,
}

impl FeatureToggle {
    pub fn new(
        id: i32,
        key: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        contexts: Vec<Context>,
    ) -> Result<Self, ToggleError> {
        let key = key.into();
        let name = name.into();
        check_toggle_identity(&key, &name)?;

        Ok(Self {
            id,
            key,
            name,
            description: description.into(),
            contexts,
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Replace the display name. The toggle is left untouched on error.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ToggleError> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Turn the toggle on or off in a context. Returns false when the toggle
    /// has no association for that context.
    pub fn set_active(&mut self, context: ContextName, active: bool) -> bool {
        match self.contexts.iter_mut().find(|c| c.name == context) {
            Some(c) => {
                c.active = active;
                true
            }
            None => false,
        }
    }

    pub fn add_context(&mut self, context: Context) {
        self.contexts.push(context);
    }

    /// Whether an active association exists for `context`.
    pub fn is_active_in(&self, context: ContextName) -> bool {
        self.contexts
            .iter()
            .any(|c| c.name == context && c.active)
    }
}

/// Body of `POST /feature-toggles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureToggleRequest {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A requested on/off state for one context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextActivation {
    pub name: ContextName,
    pub active: bool,
}

/// Body of `PATCH /feature-toggle/{id}`
///
/// Absent and `null` fields both leave the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggleUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contexts: Option<Vec<ContextActivation>>,
}

impl FeatureToggleUpdateRequest {
    /// Validate the parts of the request that can be checked without the stored toggle.
    pub fn check(&self) -> Result<(), ToggleError> {
        match &self.name {
            Some(name) => check_name(name),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts() -> Vec<Context> {
        vec![
            Context {
                id: 1,
                name: ContextName::Testing,
                label: "testing".into(),
                active: false,
            },
            Context {
                id: 2,
                name: ContextName::Production,
                label: "production".into(),
                active: false,
            },
        ]
    }

    #[test]
    fn test_construction_validates_identity() {
        assert!(FeatureToggle::new(1, "key", "name", "description", contexts()).is_ok());
        assert_eq!(
            FeatureToggle::new(1, "key1", "name", "description", vec![]),
            Err(ToggleError::InvalidKey("key1".into()))
        );
        assert_eq!(
            FeatureToggle::new(1, "key", "  ", "description", vec![]),
            Err(ToggleError::InvalidName)
        );
    }

    #[test]
    fn test_rename_rejects_blank_and_keeps_old_name() {
        let mut toggle = FeatureToggle::new(1, "key", "name", "d", vec![]).unwrap();
        assert_eq!(toggle.rename(" "), Err(ToggleError::InvalidName));
        assert_eq!(toggle.name(), "name");

        toggle.rename("updated").unwrap();
        assert_eq!(toggle.name(), "updated");
        assert_eq!(toggle.key(), "key");
    }

    #[test]
    fn test_activation_is_per_context() {
        let mut toggle = FeatureToggle::new(1, "key", "name", "d", contexts()).unwrap();
        assert!(!toggle.is_active_in(ContextName::Testing));

        assert!(toggle.set_active(ContextName::Testing, true));
        assert!(toggle.is_active_in(ContextName::Testing));
        assert!(!toggle.is_active_in(ContextName::Production));
    }

    #[test]
    fn test_set_active_without_association() {
        let mut toggle = FeatureToggle::new(1, "key", "name", "d", vec![]).unwrap();
        assert!(!toggle.set_active(ContextName::Production, true));
        assert!(!toggle.is_active_in(ContextName::Production));
    }

    #[test]
    fn test_serializes_expected_shape() {
        let toggle = FeatureToggle::new(7, "key", "name", "description", contexts()).unwrap();
        let json = serde_json::to_value(&toggle).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["key"], "key");
        assert_eq!(json["name"], "name");
        assert_eq!(json["description"], "description");
        assert_eq!(json["contexts"][0]["name"], "testing");
        assert_eq!(json["contexts"][1]["label"], "production");
        assert_eq!(json["contexts"][1]["active"], false);
    }

    #[test]
    fn test_update_request_absent_and_null_fields() {
        let request: FeatureToggleUpdateRequest =
            serde_json::from_str(r#"{"name": "updated", "description": null}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("updated"));
        assert!(request.description.is_none());
        assert!(request.contexts.is_none());

        let request: FeatureToggleUpdateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, FeatureToggleUpdateRequest::default());
    }

    #[test]
    fn test_update_request_context_activation() {
        let request: FeatureToggleUpdateRequest = serde_json::from_str(
            r#"{"contexts": [{"name": "production", "active": true}]}"#,
        )
        .unwrap();
        assert_eq!(
            request.contexts,
            Some(vec![ContextActivation {
                name: ContextName::Production,
                active: true,
            }])
        );
    }

    #[test]
    fn test_update_request_check() {
        let request = FeatureToggleUpdateRequest {
            name: Some("".into()),
            ..Default::default()
        };
        assert_eq!(request.check(), Err(ToggleError::InvalidName));
        assert!(FeatureToggleUpdateRequest::default().check().is_ok());
    }
}
