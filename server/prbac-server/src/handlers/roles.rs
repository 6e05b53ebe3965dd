use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use prbac_zanzibar::{parse_object_id, Access};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{api_list, api_success, ApiError, ApiResponse, ApiResult};
use crate::middleware::Caller;
use crate::server::PrbacServer;

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access: Vec<Access>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoleResponse {
    pub uuid: Uuid,
}

/// `POST /roles/`
pub async fn create_role(
    State(server): State<PrbacServer>,
    caller: Caller,
    payload: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreateRoleResponse>>)> {
    let Json(request) = payload?;

    if request.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let principal = caller.principal()?;
    let uuid = server
        .engine
        .create_role(&principal, request.name.trim(), &request.access)
        .await?;

    tracing::info!(
        role_id = %uuid,
        org = %principal.org,
        has_description = request.description.is_some(),
        "Role created"
    );

    Ok((StatusCode::CREATED, Json(api_success(CreateRoleResponse { uuid }))))
}

/// `GET /roles/{uuid}/access/`
pub async fn get_role_access(
    State(server): State<PrbacServer>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Access>>>> {
    let role_id = parse_object_id("role", &uuid)?;
    let access = server.engine.list_role_access(role_id).await?;
    Ok(Json(api_list(access)))
}
