use crate::{
    access::Access,
    catalog::PermissionCatalog,
    client::RelationshipClient,
    error::Result,
    introspect::RoleAccessReader,
    models::Principal,
    resolver::AccessResolver,
    role_graph::RoleGraphBuilder,
    system_roles::SystemRoleTable,
};
use std::sync::Arc;
use uuid::Uuid;

/// Entry point tying the catalog, the system role table and a relationship
/// client together.
///
/// The engine holds no mutable state; share it behind an `Arc` across
/// requests.
pub struct PrbacEngine {
    catalog: Arc<PermissionCatalog>,
    resolver: AccessResolver,
    graph: RoleGraphBuilder,
    reader: RoleAccessReader,
}

impl PrbacEngine {
    pub fn new(
        client: Arc<dyn RelationshipClient>,
        catalog: Arc<PermissionCatalog>,
        system_roles: Arc<SystemRoleTable>,
    ) -> Self {
        Self {
            resolver: AccessResolver::new(client.clone(), catalog.clone()),
            graph: RoleGraphBuilder::new(client.clone(), system_roles),
            reader: RoleAccessReader::new(client, catalog.clone()),
            catalog,
        }
    }

    pub fn catalog(&self) -> Arc<PermissionCatalog> {
        self.catalog.clone()
    }

    // =============================================================================
    // Query side
    // =============================================================================

    pub async fn resolve_access(&self, service: &str, principal: &Principal) -> Result<Vec<Access>> {
        self.resolver.resolve_access(service, principal).await
    }

    pub async fn list_role_access(&self, role_id: Uuid) -> Result<Vec<Access>> {
        self.reader.list_role_access(role_id).await
    }

    // =============================================================================
    // Write side
    // =============================================================================

    pub async fn create_role(&self, principal: &Principal, name: &str, access: &[Access]) -> Result<Uuid> {
        self.graph.create_role(principal, name, access).await
    }

    pub async fn add_principals_to_group(&self, group_id: Uuid, principals: &[String]) -> Result<()> {
        self.graph.add_principals_to_group(group_id, principals).await
    }

    pub async fn remove_principals_from_group(&self, group_id: Uuid, principals: &[String]) -> Result<()> {
        self.graph.remove_principals_from_group(group_id, principals).await
    }

    pub async fn add_roles_to_group(&self, group_id: Uuid, role_ids: &[Uuid]) -> Result<()> {
        self.graph.add_roles_to_group(group_id, role_ids).await
    }

    pub fn role_graph(&self) -> &RoleGraphBuilder {
        &self.graph
    }
}
