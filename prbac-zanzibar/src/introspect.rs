use crate::{
    access::Access,
    catalog::PermissionCatalog,
    client::{collect_stream, RelationshipClient},
    error::Result,
    models::RelationshipFilter,
    schema,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Reads back which catalog permissions a role grants.
///
/// Only unrestricted grants (`role:R#perm@user:*`) are reported; scoped
/// grants live on bindings and carry no resource definitions here.
pub struct RoleAccessReader {
    client: Arc<dyn RelationshipClient>,
    catalog: Arc<PermissionCatalog>,
}

impl RoleAccessReader {
    pub fn new(client: Arc<dyn RelationshipClient>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { client, catalog }
    }

    pub async fn list_role_access(&self, role_id: Uuid) -> Result<Vec<Access>> {
        let filter = RelationshipFilter::new(schema::ROLE)
            .with_resource_id(&role_id.to_string())
            .with_subject_type(schema::USER);

        let relationships = collect_stream(self.client.read_relationships(&filter).await?).await?;

        let mut seen = HashSet::new();
        let mut accesses = Vec::new();

        for relationship in relationships {
            if !seen.insert(relationship.relation.clone()) {
                continue;
            }

            let keys = self.catalog.catalog_keys_for(&relationship.relation);
            if keys.is_empty() {
                debug!(role_id = %role_id, relation = %relationship.relation, "Relation has no catalog entry");
                continue;
            }

            accesses.extend(keys.iter().map(Access::unrestricted));
        }

        Ok(accesses)
    }
}
