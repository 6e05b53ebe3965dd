//! Object types and relations of the backend schema this crate writes to
//! and reads from.
//!
//! The schema itself lives in the relationship backend; these names must
//! match it exactly.

/// Workspaces form the scope tree. Every org has a root workspace named
/// `{org}_root`; attribute-scoped grants hang child workspaces below it.
pub const WORKSPACE: &str = "workspace";

/// Permission-bearing role object. Unrestricted grants are written as
/// `role:{id}#{permission}@user:*`.
pub const ROLE: &str = "role";

pub const ROLE_BINDING: &str = "role_binding";

/// Catalog-facing role object owning the bindings created for a role.
pub const RBAC_V1_ROLE: &str = "rbac/v1role";

pub const USER: &str = "user";
pub const GROUP: &str = "group";

/// Wildcard subject id granting a relation to every object of a type.
pub const WILDCARD: &str = "*";

pub mod relations {
    pub const GRANTED: &str = "granted";
    pub const USER_GRANT: &str = "user_grant";
    pub const ROLE: &str = "role";
    pub const BINDING: &str = "binding";
    pub const PARENT: &str = "parent";
    pub const SUBJECT: &str = "subject";
    pub const MEMBER: &str = "member";
}

/// Suffix appended to an org name to form its root workspace id.
pub const ROOT_WORKSPACE_SUFFIX: &str = "_root";

/// Attribute filter key that scopes a role to an inventory group.
pub const GROUP_ID_FILTER_KEY: &str = "group.id";
