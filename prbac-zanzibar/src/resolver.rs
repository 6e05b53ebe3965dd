use crate::{
    access::{qualified_permission, Access, ResourceDefinition},
    catalog::{Filter, PermissionCatalog},
    client::{collect_distinct, RelationshipClient},
    error::Result,
    models::Principal,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Answers "what can this principal do in this service" by translating
/// relationship grants into scoped permissions.
///
/// For every catalog key, in key order:
/// 1. an unrestricted grant on the org's root workspace yields a bare
///    `Access` and nothing else is asked for that key;
/// 2. otherwise the objects of the filter's resource type the principal can
///    reach with the filter's verb become one `equals` resource definition
///    each. Keys with no reachable objects are left out.
pub struct AccessResolver {
    client: Arc<dyn RelationshipClient>,
    catalog: Arc<PermissionCatalog>,
}

impl AccessResolver {
    pub fn new(client: Arc<dyn RelationshipClient>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { client, catalog }
    }

    pub async fn resolve_access(&self, service: &str, principal: &Principal) -> Result<Vec<Access>> {
        let Some(permissions) = self.catalog.service(service) else {
            debug!(service = service, "No catalog entries for service");
            return Ok(Vec::new());
        };

        let root = principal.root_workspace_ref();
        let subject = principal.subject();
        let mut accesses = Vec::new();

        for (key, resource_perm) in permissions {
            let permission = qualified_permission(service, key);

            let permissionship = self
                .client
                .check_permission(&root, &resource_perm.permission, &subject)
                .await?;

            if permissionship.is_granted() {
                debug!(permission = %permission, "Unrestricted grant on root workspace");
                accesses.push(Access::unrestricted(permission));
                continue;
            }

            let filter = &resource_perm.filter;
            let stream = self
                .client
                .lookup_resources(&filter.resource_type, &filter.verb, &subject)
                .await?;
            let bound = collect_distinct(stream).await?;

            if bound.is_empty() {
                continue;
            }

            let definitions = scoped_definitions(&permission, filter, &bound);
            if !definitions.is_empty() {
                debug!(permission = %permission, objects = definitions.len(), "Scoped grant");
                accesses.push(Access::scoped(permission, definitions));
            }
        }

        Ok(accesses)
    }
}

/// One definition per reachable object. Objects under an operator other
/// than `equals` are skipped.
fn scoped_definitions(permission: &str, filter: &Filter, object_ids: &[String]) -> Vec<ResourceDefinition> {
    object_ids
        .iter()
        .filter_map(|object_id| {
            if filter.is_equals() {
                Some(ResourceDefinition::equals(&filter.name, object_id))
            } else {
                warn!(
                    permission = permission,
                    operator = %filter.operator,
                    object_id = %object_id,
                    "Unsupported PRBAC operator, skipping object"
                );
                None
            }
        })
        .collect()
}
