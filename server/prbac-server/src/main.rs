use clap::Parser;
use std::{env, io::IsTerminal, path::PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use config_engine::{SettingsLoader, SettingsOverrides, DEFAULT_CONFIG_FILE};
use error_common::{PrbacError, Result};
use prbac_server::{create_app, PrbacServer};

/// PRBAC permission API backed by SpiceDB
#[derive(Parser, Debug)]
#[command(name = "prbac-server")]
#[command(about = "RBAC v1 permission API over a Zanzibar relationship store")]
struct Args {
    /// Server bind address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Settings file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// SpiceDB HTTP gateway URL
    #[arg(long, env = "SPICEDB_URL")]
    spicedb_url: Option<String>,

    /// SpiceDB preshared key
    #[arg(long, env = "SPICEDB_PSK", hide_env_values = true)]
    spicedb_psk: Option<String>,

    /// Permission catalog JSON document
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Org used when requests carry none
    #[arg(long)]
    default_org: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the effective settings (secrets masked) and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env has to be in place before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_tracing(args.verbose)?;

    let config_required = args.config.as_os_str() != DEFAULT_CONFIG_FILE;
    let settings = SettingsLoader::new()
        .file(&args.config, config_required)
        .overrides(SettingsOverrides {
            host: args.host,
            port: args.port,
            spicedb_url: args.spicedb_url,
            spicedb_psk: args.spicedb_psk,
            catalog_path: args.catalog,
            default_org: args.default_org,
        })
        .load()
        .map_err(|e| PrbacError::ConfigError(e.to_string()))?;

    if args.print_config {
        let rendered = settings
            .to_redacted_yaml()
            .map_err(|e| PrbacError::ConfigError(e.to_string()))?;
        println!("{}", rendered);
        return Ok(());
    }

    info!("Starting PRBAC server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Bind address: {}", settings.bind_address());

    let server = match PrbacServer::from_settings(&settings) {
        Ok(server) => server,
        Err(e) => {
            error_common::log_error("startup", &e).await;
            return Err(e);
        }
    };

    let app = create_app(server);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PrbacError::NetworkError(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("PRBAC server running on http://{}", addr);
    info!("Health check available at: http://{}/health", addr);
    info!("RBAC v1 API available at: http://{}/api/rbac/v1", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PrbacError::ServerError(format!("HTTP server error: {}", e)))?;

    info!("PRBAC server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // Check if we're in development or production
    let is_development = env::var("PRBAC_ENV").unwrap_or_else(|_| "development".to_string()) == "development";
    let use_colors = env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "prbac_server={level},prbac_zanzibar={level},config_engine={level},tower_http=info,reqwest=info"
        )
        .into()
    });

    let result = if is_development {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(verbose)
                    .with_line_number(verbose)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_colors)
                    .with_level(true),
            )
            .try_init()
    } else {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    };

    result.map_err(|e| PrbacError::InternalError(format!("Failed to initialize tracing: {}", e)))
}
