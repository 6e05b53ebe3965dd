use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalog permission (`service:key`) to backend system role id.
///
/// Attribute-scoped role grants are expressed by binding one of these
/// predefined backend roles under the scoped workspace. The table is
/// loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemRoleTable {
    roles: BTreeMap<String, String>,
}

impl Default for SystemRoleTable {
    fn default() -> Self {
        Self::inventory_defaults()
    }
}

impl SystemRoleTable {
    pub fn new(roles: BTreeMap<String, String>) -> Self {
        Self { roles }
    }

    /// System roles shipped with the backend schema for inventory groups
    pub fn inventory_defaults() -> Self {
        [
            ("inventory:hosts:read", "e18257ae-7506-11ee-8c9d-0242ac170005"),
            ("inventory:hosts:write", "c4eaa6fb-7506-11ee-8c9d-0242ac170005"),
            ("inventory:groups:read", "10d23bda-7507-11ee-8c9d-0242ac170005"),
            ("inventory:groups:write", "fca60508-7506-11ee-8c9d-0242ac170005"),
        ]
        .into_iter()
        .map(|(permission, role)| (permission.to_string(), role.to_string()))
        .collect()
    }

    pub fn backend_role(&self, permission: &str) -> Option<&str> {
        self.roles.get(permission).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, String)> for SystemRoleTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
