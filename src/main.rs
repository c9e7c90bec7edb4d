//! CAS Backend - Main Entry Point

use std::sync::Arc;

use cas_backend::{
    api::{routes::create_router, AppState},
    bootstrap,
    config::Config,
    db,
    error::Result,
    services::{
        access_control_service::AccessControlService, registry_service::RegistryService,
    },
    store::postgres::{PostgresPermissionStore, PostgresPluginStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    telemetry::init_tracing(&config.log_level);
    tracing::info!("Starting CAS backend");

    // Connect to database. An unreachable store aborts startup here;
    // there is no in-memory fallback to silently lose state into.
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // Wire stores and services
    let registry = Arc::new(RegistryService::new(Arc::new(PostgresPluginStore::new(
        db_pool.clone(),
    ))));
    let access_control = Arc::new(AccessControlService::new(Arc::new(
        PostgresPermissionStore::new(db_pool.clone()),
    )));

    // Seed the shipped plugin catalog (idempotent)
    bootstrap::seed(&registry, &access_control).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        db_pool,
        registry,
        access_control,
    ));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Listening on {}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
