//! Static catalog of scoped permissions per service.
//!
//! The catalog document is a JSON object keyed by service name, then by
//! permission key:
//!
//! ```json
//! {
//!   "playbook-dispatcher": {
//!     "run:read": {
//!       "permission": "dispatcher_view_runs",
//!       "filter": {
//!         "name": "service",
//!         "operator": "equals",
//!         "resourceType": "dispatcher/service",
//!         "verb": "view"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! It is loaded once at startup and never mutated. Maps are ordered so every
//! walk over the catalog is sorted by service and then by key.

use crate::{
    access::{qualified_permission, EQUALS_OPERATION},
    error::{Result, ZanzibarError},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// How to narrow a permission to specific objects when the principal lacks
/// the unrestricted grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Filter {
    /// Attribute key reported in resource definitions
    pub name: String,
    pub operator: String,
    /// Backend object type to enumerate
    pub resource_type: String,
    /// Backend permission to enumerate `resource_type` objects by
    pub verb: String,
}

impl Filter {
    pub fn is_equals(&self) -> bool {
        self.operator.eq_ignore_ascii_case(EQUALS_OPERATION)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePerm {
    /// Permission name the relationship backend understands
    pub permission: String,
    pub filter: Filter,
}

pub type ServicePermissions = BTreeMap<String, ResourcePerm>;

#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    services: BTreeMap<String, ServicePermissions>,
    /// backend permission -> sorted `service:key` list
    by_backend_permission: BTreeMap<String, Vec<String>>,
}

impl PermissionCatalog {
    /// Build a catalog, rejecting entries that could never resolve.
    pub fn new(services: BTreeMap<String, ServicePermissions>) -> Result<Self> {
        let mut by_backend_permission: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (service, permissions) in &services {
            if service.trim().is_empty() {
                return Err(ZanzibarError::InvalidCatalog("empty service name".to_string()));
            }

            for (key, resource_perm) in permissions {
                validate_entry(service, key, resource_perm)?;

                by_backend_permission
                    .entry(resource_perm.permission.clone())
                    .or_default()
                    .push(qualified_permission(service, key));
            }
        }

        // BTreeMap walk already yields sorted keys; sort anyway so the
        // invariant doesn't depend on iteration order.
        for keys in by_backend_permission.values_mut() {
            keys.sort();
        }

        Ok(Self {
            services,
            by_backend_permission,
        })
    }

    pub fn from_json_str(document: &str) -> Result<Self> {
        let services: BTreeMap<String, ServicePermissions> = serde_json::from_str(document)
            .map_err(|e| ZanzibarError::InvalidCatalog(format!("malformed catalog document: {}", e)))?;
        Self::new(services)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            ZanzibarError::InvalidCatalog(format!("cannot read {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json_str(&document)?;
        info!(
            path = %path.display(),
            services = catalog.services.len(),
            permissions = catalog.len(),
            "Loaded permission catalog"
        );
        Ok(catalog)
    }

    pub fn service(&self, name: &str) -> Option<&ServicePermissions> {
        self.services.get(name)
    }

    /// Catalog keys (`service:key`) mapped onto a backend permission
    pub fn catalog_keys_for(&self, backend_permission: &str) -> &[String] {
        self.by_backend_permission
            .get(backend_permission)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of permission entries across services
    pub fn len(&self) -> usize {
        self.services.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_entry(service: &str, key: &str, resource_perm: &ResourcePerm) -> Result<()> {
    let invalid = |what: &str| -> Result<()> {
        Err(ZanzibarError::InvalidCatalog(format!(
            "{} has an empty {}",
            qualified_permission(service, key),
            what
        )))
    };

    if key.trim().is_empty() {
        return Err(ZanzibarError::InvalidCatalog(format!("service {} has an empty permission key", service)));
    }
    if resource_perm.permission.trim().is_empty() {
        return invalid("backend permission");
    }
    if resource_perm.filter.resource_type.trim().is_empty() {
        return invalid("filter resourceType");
    }
    if resource_perm.filter.verb.trim().is_empty() {
        return invalid("filter verb");
    }

    Ok(())
}
