//! PRBAC access entities exchanged with callers

use serde::{Deserialize, Serialize};

/// The only attribute filter operation currently understood
pub const EQUALS_OPERATION: &str = "equals";

/// A scoped permission granted to a principal or requested for a role.
///
/// `resource_definitions` being absent means the grant is unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    /// `service:key`, e.g. `playbook-dispatcher:run:read`
    pub permission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_definitions: Option<Vec<ResourceDefinition>>,
}

impl Access {
    pub fn unrestricted(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            resource_definitions: None,
        }
    }

    pub fn scoped(permission: impl Into<String>, definitions: Vec<ResourceDefinition>) -> Self {
        Self {
            permission: permission.into(),
            resource_definitions: Some(definitions),
        }
    }

    /// True when no attribute constraint narrows this access. An explicitly
    /// empty definition list counts as unrestricted.
    pub fn is_unrestricted(&self) -> bool {
        self.resource_definitions
            .as_ref()
            .map_or(true, |defs| defs.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub attribute_filter: AttributeFilter,
}

impl ResourceDefinition {
    pub fn equals(key: &str, value: &str) -> Self {
        Self {
            attribute_filter: AttributeFilter {
                key: key.to_string(),
                operation: EQUALS_OPERATION.to_string(),
                value: value.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub key: String,
    pub operation: String,
    pub value: String,
}

/// `service:key`
pub fn qualified_permission(service: &str, key: &str) -> String {
    format!("{}:{}", service, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unrestricted_access_omits_definitions() {
        let access = Access::unrestricted("playbook-dispatcher:run:read");
        let value = serde_json::to_value(&access).unwrap();
        assert_eq!(value, json!({"permission": "playbook-dispatcher:run:read"}));
    }

    #[test]
    fn test_scoped_access_json_shape() {
        let access = Access::scoped(
            "playbook-dispatcher:run:read",
            vec![ResourceDefinition::equals("service", "svcA")],
        );
        let value = serde_json::to_value(&access).unwrap();
        assert_eq!(
            value,
            json!({
                "permission": "playbook-dispatcher:run:read",
                "resourceDefinitions": [
                    {"attributeFilter": {"key": "service", "operation": "equals", "value": "svcA"}}
                ]
            })
        );
    }

    #[test]
    fn test_empty_definitions_count_as_unrestricted() {
        let parsed: Access = serde_json::from_value(json!({
            "permission": "inventory:hosts:read",
            "resourceDefinitions": []
        }))
        .unwrap();
        assert!(parsed.is_unrestricted());
    }
}
