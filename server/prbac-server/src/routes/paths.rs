//! Centralized API route path constants
//!
//! Paths below are relative to [`API_V1`]; the RBAC v1 surface keeps its
//! trailing slashes.

/// API base path
pub const API_V1: &str = "/api/rbac/v1";

/// Health check endpoints (mounted at the root)
pub mod health {
    pub const HEALTH: &str = "/health";
}

pub mod access {
    pub const ACCESS: &str = "/access/";
}

pub mod roles {
    pub const ROLES: &str = "/roles/";
    pub const ROLE_BY_ID: &str = "/roles/:uuid/";
    pub const ROLE_ACCESS: &str = "/roles/:uuid/access/";
}

pub mod groups {
    pub const GROUPS: &str = "/groups/";
    pub const GROUP_BY_ID: &str = "/groups/:uuid/";
    pub const GROUP_PRINCIPALS: &str = "/groups/:uuid/principals/";
    pub const GROUP_ROLES: &str = "/groups/:uuid/roles/";
}

pub mod cross_account {
    pub const REQUESTS: &str = "/cross-account-requests/";
    pub const REQUEST_BY_ID: &str = "/cross-account-requests/:uuid/";
}

pub mod permissions {
    pub const PERMISSIONS: &str = "/permissions/";
    pub const PERMISSION_OPTIONS: &str = "/permissions/options/";
}

pub mod policies {
    pub const POLICIES: &str = "/policies/";
    pub const POLICY_BY_ID: &str = "/policies/:uuid/";
}

pub mod principals {
    pub const PRINCIPALS: &str = "/principals/";
}

pub mod status {
    pub const STATUS: &str = "/status/";
}
