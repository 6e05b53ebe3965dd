use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use prbac_zanzibar::parse_object_id;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::server::PrbacServer;

#[derive(Debug, Deserialize)]
pub struct PrincipalIn {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct AddPrincipalsRequest {
    pub principals: Vec<PrincipalIn>,
}

#[derive(Debug, Deserialize)]
pub struct RemovePrincipalsParams {
    /// Comma-separated usernames
    pub usernames: String,
}

#[derive(Debug, Deserialize)]
pub struct AddRolesRequest {
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupPrincipalsResponse {
    pub uuid: Uuid,
    pub principals: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupRolesResponse {
    pub uuid: Uuid,
    pub roles: Vec<Uuid>,
}

/// `POST /groups/{uuid}/principals/`
pub async fn add_principals_to_group(
    State(server): State<PrbacServer>,
    Path(uuid): Path<String>,
    payload: Result<Json<AddPrincipalsRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<GroupPrincipalsResponse>>> {
    let group_id = parse_object_id("group", &uuid)?;
    let Json(request) = payload?;

    let principals: Vec<String> = request.principals.into_iter().map(|p| p.username).collect();
    server.engine.add_principals_to_group(group_id, &principals).await?;

    Ok(Json(api_success(GroupPrincipalsResponse {
        uuid: group_id,
        principals,
    })))
}

/// `DELETE /groups/{uuid}/principals/?usernames=a,b`
pub async fn remove_principals_from_group(
    State(server): State<PrbacServer>,
    Path(uuid): Path<String>,
    params: Result<Query<RemovePrincipalsParams>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let group_id = parse_object_id("group", &uuid)?;
    let Query(params) = params?;

    let principals = split_usernames(&params.usernames);
    if principals.is_empty() {
        return Err(ApiError::missing_field("usernames"));
    }

    server.engine.remove_principals_from_group(group_id, &principals).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /groups/{uuid}/roles/`
pub async fn add_roles_to_group(
    State(server): State<PrbacServer>,
    Path(uuid): Path<String>,
    payload: Result<Json<AddRolesRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<GroupRolesResponse>>> {
    let group_id = parse_object_id("group", &uuid)?;
    let Json(request) = payload?;

    let roles = request
        .roles
        .iter()
        .map(|role| parse_object_id("role", role))
        .collect::<Result<Vec<_>, _>>()?;

    server.engine.add_roles_to_group(group_id, &roles).await?;

    Ok(Json(api_success(GroupRolesResponse { uuid: group_id, roles })))
}

fn split_usernames(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_usernames_drops_blanks() {
        assert_eq!(split_usernames("alice, bob,,"), vec!["alice", "bob"]);
        assert!(split_usernames(" , ").is_empty());
    }
}
