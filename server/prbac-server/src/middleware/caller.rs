//! Who is calling, and on behalf of which org.
//!
//! The org comes from the `x-prbac-org` header and falls back to the
//! configured default org. The username header is optional; operations that
//! only need the org scope (role creation) fall back to a service identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use prbac_zanzibar::Principal;

use crate::error::{ApiError, ApiResult};
use crate::server::PrbacServer;

pub const ORG_HEADER: &str = "x-prbac-org";
pub const USERNAME_HEADER: &str = "x-prbac-username";

/// Identity used for writes that carry no username
pub const SERVICE_USERNAME: &str = "prbac-server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub org: String,
    pub username: Option<String>,
}

impl Caller {
    /// Principal for `username` inside the caller's org
    pub fn principal_for(&self, username: &str) -> ApiResult<Principal> {
        Ok(Principal::new(&self.org, username)?)
    }

    /// The caller itself, or the service identity when no username was sent
    pub fn principal(&self) -> ApiResult<Principal> {
        self.principal_for(self.username.as_deref().unwrap_or(SERVICE_USERNAME))
    }
}

fn header_value(parts: &Parts, name: &str) -> ApiResult<Option<String>> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::validation(format!("{} header must be visible ASCII", name)))?
        .trim();

    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

#[axum::async_trait]
impl FromRequestParts<PrbacServer> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &PrbacServer) -> Result<Self, Self::Rejection> {
        let org = header_value(parts, ORG_HEADER)?.unwrap_or_else(|| state.config.default_org.clone());
        let username = header_value(parts, USERNAME_HEADER)?;

        Ok(Caller { org, username })
    }
}
