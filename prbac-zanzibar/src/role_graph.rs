//! Write side: expanding roles and group bindings into relationship tuples.
//!
//! A role `R` created in org `O` always owns four tuples:
//!
//! ```text
//! role_binding:R   #granted     @role:R
//! workspace:O_root #user_grant  @role_binding:R
//! rbac/v1role:R    #role        @role:R
//! rbac/v1role:R    #binding     @role_binding:R
//! ```
//!
//! An unrestricted permission `P` adds `role:R#normalize(P)@user:*`. A
//! permission scoped to inventory group `V` binds the matching system role
//! `S` through a dedicated binding `R_V`:
//!
//! ```text
//! workspace:V      #parent      @workspace:O_root
//! workspace:V      #user_grant  @role_binding:R_V
//! rbac/v1role:R    #binding     @role_binding:R_V
//! role_binding:R_V #granted     @role:S
//! ```
//!
//! Every update is a touch, so replaying the same input is a no-op.

use crate::{
    access::Access,
    client::{collect_stream, RelationshipClient},
    error::{Result, ZanzibarError},
    models::*,
    normalize::normalize,
    schema::{self, relations},
    system_roles::SystemRoleTable,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct RoleGraphBuilder {
    client: Arc<dyn RelationshipClient>,
    system_roles: Arc<SystemRoleTable>,
}

impl RoleGraphBuilder {
    pub fn new(client: Arc<dyn RelationshipClient>, system_roles: Arc<SystemRoleTable>) -> Self {
        Self { client, system_roles }
    }

    /// Compute the write batch for a role without touching the backend.
    pub fn plan_role(&self, principal: &Principal, role_id: Uuid, name: &str, access: &[Access]) -> Vec<RelationshipUpdate> {
        let role = role_id.to_string();
        let root = principal.root_workspace();
        let mut batch = UpdateBatch::default();

        batch.push(
            ObjectReference::new(schema::ROLE_BINDING, &role),
            relations::GRANTED,
            SubjectReference::new(schema::ROLE, &role),
        );
        batch.push(
            ObjectReference::new(schema::WORKSPACE, &root),
            relations::USER_GRANT,
            SubjectReference::new(schema::ROLE_BINDING, &role),
        );
        batch.push(
            ObjectReference::new(schema::RBAC_V1_ROLE, &role),
            relations::ROLE,
            SubjectReference::new(schema::ROLE, &role),
        );
        batch.push(
            ObjectReference::new(schema::RBAC_V1_ROLE, &role),
            relations::BINDING,
            SubjectReference::new(schema::ROLE_BINDING, &role),
        );

        for requested in access {
            if requested.is_unrestricted() {
                batch.push(
                    ObjectReference::new(schema::ROLE, &role),
                    &normalize(&requested.permission),
                    SubjectReference::all_users(),
                );
                continue;
            }

            for definition in requested.resource_definitions.iter().flatten() {
                let filter = &definition.attribute_filter;

                match filter.key.as_str() {
                    schema::GROUP_ID_FILTER_KEY => {
                        let Some(system_role) = self.system_roles.backend_role(&requested.permission) else {
                            warn!(
                                permission = %requested.permission,
                                role = name,
                                "No system role bound to permission, skipping group scope"
                            );
                            continue;
                        };

                        let binding = format!("{}_{}", role, filter.value);

                        batch.push(
                            ObjectReference::new(schema::WORKSPACE, &filter.value),
                            relations::PARENT,
                            SubjectReference::new(schema::WORKSPACE, &root),
                        );
                        batch.push(
                            ObjectReference::new(schema::WORKSPACE, &filter.value),
                            relations::USER_GRANT,
                            SubjectReference::new(schema::ROLE_BINDING, &binding),
                        );
                        batch.push(
                            ObjectReference::new(schema::RBAC_V1_ROLE, &role),
                            relations::BINDING,
                            SubjectReference::new(schema::ROLE_BINDING, &binding),
                        );
                        batch.push(
                            ObjectReference::new(schema::ROLE_BINDING, &binding),
                            relations::GRANTED,
                            SubjectReference::new(schema::ROLE, system_role),
                        );
                    }
                    other => {
                        info!(
                            permission = %requested.permission,
                            role = name,
                            key = other,
                            "Unhandled resource definition"
                        );
                    }
                }
            }
        }

        batch.into_updates()
    }

    /// Create a role under a fresh id and return that id.
    pub async fn create_role(&self, principal: &Principal, name: &str, access: &[Access]) -> Result<Uuid> {
        self.create_role_with_id(principal, Uuid::new_v4(), name, access).await
    }

    pub async fn create_role_with_id(
        &self,
        principal: &Principal,
        role_id: Uuid,
        name: &str,
        access: &[Access],
    ) -> Result<Uuid> {
        if name.trim().is_empty() {
            return Err(ZanzibarError::ValidationError("role name must not be empty".to_string()));
        }

        let updates = self.plan_role(principal, role_id, name, access);
        info!(role_id = %role_id, role = name, tuples = updates.len(), "Creating role");

        self.client.write_relationships(updates).await?;
        Ok(role_id)
    }

    pub async fn add_principals_to_group(&self, group_id: Uuid, principals: &[String]) -> Result<()> {
        let updates = membership_updates(group_id, principals, RelationshipUpdate::touch)?;
        info!(group_id = %group_id, principals = updates.len(), "Adding principals to group");
        self.client.write_relationships(updates).await
    }

    pub async fn remove_principals_from_group(&self, group_id: Uuid, principals: &[String]) -> Result<()> {
        let updates = membership_updates(group_id, principals, RelationshipUpdate::delete)?;
        info!(group_id = %group_id, principals = updates.len(), "Removing principals from group");
        self.client.write_relationships(updates).await
    }

    /// Make the group a subject of every binding currently attached to each
    /// role.
    ///
    /// Bindings are read first and written afterwards with no precondition,
    /// so bindings added to a role in between are not attached.
    pub async fn add_roles_to_group(&self, group_id: Uuid, role_ids: &[Uuid]) -> Result<()> {
        if role_ids.is_empty() {
            return Err(ZanzibarError::ValidationError("at least one role is required".to_string()));
        }

        let group = group_id.to_string();
        let mut batch = UpdateBatch::default();

        for role_id in role_ids {
            let role = ObjectReference::new(schema::RBAC_V1_ROLE, &role_id.to_string());
            let stream = self
                .client
                .lookup_subjects(&role, relations::BINDING, schema::ROLE_BINDING)
                .await?;
            let bindings = collect_stream(stream).await?;
            debug!(role_id = %role_id, bindings = bindings.len(), "Found role bindings");

            for binding in bindings {
                batch.push(
                    ObjectReference::new(schema::ROLE_BINDING, &binding),
                    relations::SUBJECT,
                    SubjectReference::userset(schema::GROUP, &group, relations::MEMBER),
                );
            }
        }

        let updates = batch.into_updates();
        if updates.is_empty() {
            warn!(group_id = %group_id, "Roles have no bindings, nothing to attach");
            return Ok(());
        }

        info!(group_id = %group_id, bindings = updates.len(), "Attaching group to role bindings");
        self.client.write_relationships(updates).await
    }
}

fn membership_updates(
    group_id: Uuid,
    principals: &[String],
    operation: fn(Relationship) -> RelationshipUpdate,
) -> Result<Vec<RelationshipUpdate>> {
    let group = group_id.to_string();
    let mut batch = UpdateBatch::with_operation(operation);

    for principal in principals {
        let username = principal.trim();
        if username.is_empty() {
            return Err(ZanzibarError::ValidationError("principal username must not be empty".to_string()));
        }
        batch.push(
            ObjectReference::new(schema::GROUP, &group),
            relations::MEMBER,
            SubjectReference::user(username),
        );
    }

    let updates = batch.into_updates();
    if updates.is_empty() {
        return Err(ZanzibarError::ValidationError("at least one principal is required".to_string()));
    }
    Ok(updates)
}

/// Ordered batch of updates that drops repeats, since the backend rejects a
/// write naming the same relationship twice.
struct UpdateBatch {
    operation: fn(Relationship) -> RelationshipUpdate,
    seen: HashSet<Relationship>,
    updates: Vec<RelationshipUpdate>,
}

impl Default for UpdateBatch {
    fn default() -> Self {
        Self::with_operation(RelationshipUpdate::touch)
    }
}

impl UpdateBatch {
    fn with_operation(operation: fn(Relationship) -> RelationshipUpdate) -> Self {
        Self {
            operation,
            seen: HashSet::new(),
            updates: Vec::new(),
        }
    }

    fn push(&mut self, resource: ObjectReference, relation: &str, subject: SubjectReference) {
        let relationship = Relationship::new(resource, relation, subject);
        if self.seen.insert(relationship.clone()) {
            self.updates.push((self.operation)(relationship));
        }
    }

    fn into_updates(self) -> Vec<RelationshipUpdate> {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ResourceDefinition;
    use crate::client::{stream_from_results, InMemoryRelationshipClient, MockRelationshipClient};

    fn builder() -> RoleGraphBuilder {
        RoleGraphBuilder::new(
            Arc::new(InMemoryRelationshipClient::new()),
            Arc::new(SystemRoleTable::default()),
        )
    }

    fn principal() -> Principal {
        Principal::new("aspian", "admin").unwrap()
    }

    fn rendered(updates: &[RelationshipUpdate]) -> Vec<String> {
        updates.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_plan_unrestricted_role() {
        let role_id = Uuid::new_v4();
        let updates = builder().plan_role(
            &principal(),
            role_id,
            "r",
            &[Access::unrestricted("dispatcher_view_runs")],
        );

        let r = role_id.to_string();
        assert_eq!(
            rendered(&updates),
            vec![
                format!("touch role_binding:{r}#granted@role:{r}"),
                format!("touch workspace:aspian_root#user_grant@role_binding:{r}"),
                format!("touch rbac/v1role:{r}#role@role:{r}"),
                format!("touch rbac/v1role:{r}#binding@role_binding:{r}"),
                format!("touch role:{r}#dispatcher_view_runs@user:*"),
            ]
        );
    }

    #[test]
    fn test_plan_normalizes_permission_names() {
        let role_id = Uuid::new_v4();
        let updates = builder().plan_role(&principal(), role_id, "r", &[Access::unrestricted("Inventory:Hosts:*")]);
        let last = updates.last().unwrap();
        assert_eq!(last.relationship.relation, "inventory_hosts_all");
    }

    #[test]
    fn test_plan_group_scoped_role() {
        let role_id = Uuid::new_v4();
        let updates = builder().plan_role(
            &principal(),
            role_id,
            "hosts in g1",
            &[Access::scoped(
                "inventory:hosts:read",
                vec![ResourceDefinition::equals("group.id", "g1")],
            )],
        );

        let r = role_id.to_string();
        let rendered = rendered(&updates);
        assert_eq!(rendered.len(), 8);
        assert_eq!(
            &rendered[4..],
            &[
                "touch workspace:g1#parent@workspace:aspian_root".to_string(),
                format!("touch workspace:g1#user_grant@role_binding:{r}_g1"),
                format!("touch rbac/v1role:{r}#binding@role_binding:{r}_g1"),
                format!("touch role_binding:{r}_g1#granted@role:e18257ae-7506-11ee-8c9d-0242ac170005"),
            ]
        );
    }

    #[test]
    fn test_plan_skips_unknown_filter_key_and_unmapped_permission() {
        let updates = builder().plan_role(
            &principal(),
            Uuid::new_v4(),
            "r",
            &[
                Access::scoped("inventory:hosts:read", vec![ResourceDefinition::equals("host.id", "h1")]),
                Access::scoped("playbook-dispatcher:run:read", vec![ResourceDefinition::equals("group.id", "g1")]),
            ],
        );
        assert_eq!(updates.len(), 4);
    }

    #[test]
    fn test_plan_deduplicates_shared_scope_tuples() {
        let updates = builder().plan_role(
            &principal(),
            Uuid::new_v4(),
            "r",
            &[
                Access::scoped("inventory:hosts:read", vec![ResourceDefinition::equals("group.id", "g1")]),
                Access::scoped("inventory:hosts:write", vec![ResourceDefinition::equals("group.id", "g1")]),
            ],
        );

        // The parent, user_grant and binding tuples are shared; only the
        // second system role grant is new.
        assert_eq!(updates.len(), 9);
        let unique: HashSet<&Relationship> = updates.iter().map(|u| &u.relationship).collect();
        assert_eq!(unique.len(), updates.len());
    }

    #[test]
    fn test_membership_rejects_blank_principal() {
        let result = membership_updates(Uuid::new_v4(), &["alice".to_string(), " ".to_string()], RelationshipUpdate::touch);
        assert!(matches!(result, Err(ZanzibarError::ValidationError(_))));

        let result = membership_updates(Uuid::new_v4(), &[], RelationshipUpdate::touch);
        assert!(matches!(result, Err(ZanzibarError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_create_role_rejects_blank_name() {
        let result = builder().create_role(&principal(), "  ", &[]).await;
        assert!(matches!(result, Err(ZanzibarError::ValidationError(_))));
    }

    fn mocked(mock: MockRelationshipClient) -> RoleGraphBuilder {
        RoleGraphBuilder::new(Arc::new(mock), Arc::new(SystemRoleTable::default()))
    }

    #[tokio::test]
    async fn test_create_role_fails_when_write_fails() {
        let mut mock = MockRelationshipClient::new();
        mock.expect_write_relationships()
            .withf(|updates| updates.len() == 5)
            .times(1)
            .returning(|_| Err(ZanzibarError::Backend("write rejected".to_string())));

        let result = mocked(mock)
            .create_role(&principal(), "r", &[Access::unrestricted("dispatcher_view_runs")])
            .await;

        assert!(matches!(result, Err(ZanzibarError::Backend(_))));
    }

    #[tokio::test]
    async fn test_add_roles_to_group_stops_on_stream_error() {
        let mut mock = MockRelationshipClient::new();
        mock.expect_lookup_subjects()
            .times(1)
            .returning(|_, _, _| {
                Ok(stream_from_results(vec![
                    Ok("b1".to_string()),
                    Err(ZanzibarError::Transport("stream reset".to_string())),
                ]))
            });
        mock.expect_write_relationships().times(0);

        let result = mocked(mock)
            .add_roles_to_group(Uuid::new_v4(), &[Uuid::new_v4(), Uuid::new_v4()])
            .await;

        assert!(matches!(result, Err(ZanzibarError::Transport(_))));
    }

    #[tokio::test]
    async fn test_add_roles_to_group_reads_every_role_before_writing() {
        let group = Uuid::new_v4();
        let mut mock = MockRelationshipClient::new();
        mock.expect_lookup_subjects()
            .withf(|resource, permission, subject_type| {
                resource.object_type == "rbac/v1role" && permission == "binding" && subject_type == "role_binding"
            })
            .times(2)
            .returning(|resource, _, _| Ok(stream_from_results(vec![Ok(resource.object_id.clone())])));
        mock.expect_write_relationships()
            .withf(move |updates| {
                updates.len() == 2
                    && updates
                        .iter()
                        .all(|u| u.relationship.subject.to_string() == format!("group:{}#member", group))
            })
            .times(1)
            .returning(|_| Ok(()));

        let result = mocked(mock).add_roles_to_group(group, &[Uuid::new_v4(), Uuid::new_v4()]).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_add_roles_to_group_without_bindings_writes_nothing() {
        let mut mock = MockRelationshipClient::new();
        mock.expect_lookup_subjects()
            .returning(|_, _, _| Ok(stream_from_results(Vec::new())));
        mock.expect_write_relationships().times(0);

        let result = mocked(mock).add_roles_to_group(Uuid::new_v4(), &[Uuid::new_v4()]).await;
        assert!(result.is_ok());
    }
}
