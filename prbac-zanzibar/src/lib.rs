//! PRBAC on top of a Zanzibar-style relationship backend
//!
//! This crate translates between attribute-scoped permissions ("view runs
//! for service X") and a backend that only knows typed objects, relations
//! and subjects:
//! - Resolving a principal's relationship grants into scoped permissions
//! - Expanding roles into the relationship tuples that enforce them
//! - Group membership and role-to-group bindings
//! - Reading back which catalog permissions a role grants
//!
//! # Core Concepts
//!
//! - **Catalog**: per service, the backend permission and attribute filter
//!   behind each scoped permission key
//! - **Access**: a `service:key` permission, optionally narrowed by
//!   resource definitions
//! - **Relationship**: `resource#relation@subject`, the backend's only fact
//! - **Root workspace**: `{org}_root`, where unrestricted grants are checked
//!
//! # Example
//!
//! ```rust,no_run
//! use prbac_zanzibar::{InMemoryRelationshipClient, PermissionCatalog, PrbacEngine, Principal, SystemRoleTable};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = PermissionCatalog::from_path("services.json")?;
//!     let engine = PrbacEngine::new(
//!         Arc::new(InMemoryRelationshipClient::new()),
//!         Arc::new(catalog),
//!         Arc::new(SystemRoleTable::default()),
//!     );
//!
//!     let principal = Principal::new("aspian", "jdoe")?;
//!     let access = engine.resolve_access("playbook-dispatcher", &principal).await?;
//!     println!("{}", serde_json::to_string_pretty(&access)?);
//!
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod catalog;
pub mod client;
pub mod engine;
pub mod error;
pub mod introspect;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod role_graph;
pub mod schema;
pub mod system_roles;

pub use access::*;
pub use catalog::*;
pub use client::{InMemoryRelationshipClient, RelationshipClient, RelationshipStream, SpiceDbClient};
pub use engine::*;
pub use error::*;
pub use models::*;
pub use normalize::normalize;
pub use system_roles::*;
