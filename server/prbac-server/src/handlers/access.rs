use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use prbac_zanzibar::Access;
use serde::Deserialize;
use tracing::debug;

use crate::error::{api_list, ApiError, ApiResponse, ApiResult};
use crate::middleware::Caller;
use crate::server::PrbacServer;

#[derive(Debug, Deserialize)]
pub struct AccessParams {
    /// Service whose catalog keys are resolved
    pub application: String,
    /// Principal to resolve for; defaults to the calling user
    pub username: Option<String>,
}

/// `GET /access/?application=&username=`
pub async fn get_principal_access(
    State(server): State<PrbacServer>,
    caller: Caller,
    params: Result<Query<AccessParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Access>>>> {
    let Query(params) = params?;

    let application = params.application.trim();
    if application.is_empty() {
        return Err(ApiError::missing_field("application"));
    }

    let username = params
        .username
        .or_else(|| caller.username.clone())
        .ok_or_else(|| ApiError::missing_field("username"))?;
    let principal = caller.principal_for(&username)?;

    let access = server.engine.resolve_access(application, &principal).await?;
    debug!(
        application = application,
        username = %principal.username,
        entries = access.len(),
        "Resolved principal access"
    );

    Ok(Json(api_list(access)))
}
