pub mod paths;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{access, groups, health, placeholders, roles},
    server::PrbacServer,
};

/// Create health check routes
pub fn health_routes() -> Router<PrbacServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Principal access resolution
pub fn access_routes() -> Router<PrbacServer> {
    Router::new().route(paths::access::ACCESS, get(access::get_principal_access))
}

/// Create role routes
pub fn role_routes() -> Router<PrbacServer> {
    Router::new()
        .route(
            paths::roles::ROLES,
            post(roles::create_role).get(placeholders::list_roles),
        )
        .route(
            paths::roles::ROLE_BY_ID,
            get(placeholders::get_role)
                .put(placeholders::update_role)
                .patch(placeholders::patch_role)
                .delete(placeholders::delete_role),
        )
        .route(paths::roles::ROLE_ACCESS, get(roles::get_role_access))
}

/// Create group routes
pub fn group_routes() -> Router<PrbacServer> {
    Router::new()
        .route(
            paths::groups::GROUPS,
            get(placeholders::list_groups).post(placeholders::create_group),
        )
        .route(
            paths::groups::GROUP_BY_ID,
            get(placeholders::get_group)
                .put(placeholders::update_group)
                .delete(placeholders::delete_group),
        )
        .route(
            paths::groups::GROUP_PRINCIPALS,
            post(groups::add_principals_to_group)
                .delete(groups::remove_principals_from_group)
                .get(placeholders::get_principals_from_group),
        )
        .route(
            paths::groups::GROUP_ROLES,
            post(groups::add_roles_to_group)
                .get(placeholders::list_roles_for_group)
                .delete(placeholders::delete_role_from_group),
        )
}

/// RBAC v1 operations without an implementation
pub fn placeholder_routes() -> Router<PrbacServer> {
    Router::new()
        .route(
            paths::cross_account::REQUESTS,
            get(placeholders::list_cross_account_requests).post(placeholders::create_cross_account_request),
        )
        .route(
            paths::cross_account::REQUEST_BY_ID,
            get(placeholders::get_cross_account_request)
                .patch(placeholders::patch_cross_account_request)
                .put(placeholders::update_cross_account_request),
        )
        .route(paths::permissions::PERMISSIONS, get(placeholders::list_permissions))
        .route(
            paths::permissions::PERMISSION_OPTIONS,
            get(placeholders::list_permission_options),
        )
        .route(
            paths::policies::POLICIES,
            get(placeholders::list_policies).post(placeholders::create_policy),
        )
        .route(
            paths::policies::POLICY_BY_ID,
            get(placeholders::get_policy)
                .put(placeholders::update_policy)
                .delete(placeholders::delete_policy),
        )
        .route(paths::principals::PRINCIPALS, get(placeholders::list_principals))
        .route(paths::status::STATUS, get(placeholders::get_status))
}

/// Create all routes
pub fn create_routes() -> Router<PrbacServer> {
    let api_v1 = Router::new()
        .merge(access_routes())
        .merge(role_routes())
        .merge(group_routes())
        .merge(placeholder_routes());

    Router::new()
        .merge(health_routes())
        .nest(paths::API_V1, api_v1)
}
