use config_engine::Settings;
use error_common::{PrbacError, Result};
use prbac_zanzibar::{PermissionCatalog, PrbacEngine, RelationshipClient, SpiceDbClient, SystemRoleTable};
use std::sync::Arc;
use tracing::info;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct PrbacServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Resolution and role graph engine
    pub engine: Arc<PrbacEngine>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Org used when a request carries no `x-prbac-org` header
    pub default_org: String,
}

impl PrbacServer {
    /// Build the server from loaded settings: read the catalog and connect
    /// the SpiceDB gateway client. Any failure here stops startup.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let catalog = PermissionCatalog::from_path(&settings.catalog_path).map_err(|e| {
            PrbacError::ConfigError(format!(
                "failed to load permission catalog {}: {}",
                settings.catalog_path.display(),
                e
            ))
        })?;

        let system_roles = match &settings.system_roles {
            Some(roles) => SystemRoleTable::new(roles.clone()),
            None => SystemRoleTable::default(),
        };

        let client = SpiceDbClient::new(
            &settings.spicedb.url,
            &settings.spicedb.psk,
            settings.spicedb.connect_timeout(),
        )
        .map_err(|e| PrbacError::NetworkError(format!("failed to build SpiceDB client: {}", e)))?;

        info!(
            permissions = catalog.len(),
            system_roles = system_roles.len(),
            spicedb_url = %settings.spicedb.url,
            "Engine configured"
        );

        let config = ServerConfig {
            default_org: settings.default_org.clone(),
            ..ServerConfig::default()
        };

        Ok(Self::with_client(Arc::new(client), catalog, system_roles, config))
    }

    /// Build the server around any relationship client
    pub fn with_client(
        client: Arc<dyn RelationshipClient>,
        catalog: PermissionCatalog,
        system_roles: SystemRoleTable,
        config: ServerConfig,
    ) -> Self {
        let engine = PrbacEngine::new(client, Arc::new(catalog), Arc::new(system_roles));
        Self {
            config,
            engine: Arc::new(engine),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "PRBAC Zanzibar Bridge".to_string(),
            default_org: "aspian".to_string(),
        }
    }
}
