//! `konveksid` — the konveksi server binary.
//!
//! Usage:
//!   konveksid -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/konveksi/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod login;
mod routes;
mod users;

use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::{DecodingKey, Validation};
use konveksi_core::Module;
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;
use routes::AppState;

/// Konveksi server.
#[derive(Parser, Debug)]
#[command(name = "konveksid", about = "Garment-manufacturing workflow server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sql: Arc<dyn konveksi_sql::SQLStore> = Arc::new(
        konveksi_sql::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Users + owner bootstrap.
    let user_store = Arc::new(
        users::UserStore::new(Arc::clone(&sql))
            .map_err(|e| anyhow::anyhow!("failed to init user store: {}", e))?,
    );
    bootstrap::ensure_owner_user(&user_store, &server_config)?;

    // Business modules.
    let production_module = production::ProductionModule::new(Arc::clone(&sql))
        .map_err(|e| anyhow::anyhow!("failed to init production module: {}", e))?;
    info!("Production module initialized");

    let module_routes = vec![(production_module.name(), production_module.routes())];

    // Build JWT state for middleware.
    let jwt_state = Arc::new(JwtState {
        decoding_key: DecodingKey::from_secret(server_config.jwt.secret.as_bytes()),
        validation: Validation::default(),
    });

    let server_config = Arc::new(server_config);

    // Build application state.
    let app_state = AppState {
        jwt_state,
        server_config,
        users: user_store,
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("konveksid listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
