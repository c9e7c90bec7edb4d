//! Common test utilities.
//!
//! Builds the real router over in-memory stores so route-layer tests
//! run without a database. The state still carries a pool for the
//! readiness probe and best-effort audit writes; it points at a
//! refused port with a short acquire timeout, so those writes fail
//! fast and are downgraded to warnings.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use cas_backend::api::routes::create_router;
use cas_backend::api::AppState;
use cas_backend::config::Config;
use cas_backend::services::access_control_service::AccessControlService;
use cas_backend::services::registry_service::RegistryService;
use cas_backend::store::memory::{MemoryPermissionStore, MemoryPluginStore};

pub const JWT_SECRET: &str = "test-secret";

/// Test application wrapping the real router
pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    /// Build the app over fresh in-memory stores and seed the shipped
    /// plugin catalog.
    pub async fn new() -> Self {
        let config = Config {
            database_url: "postgres://nobody@127.0.0.1:1/unreachable".into(),
            bind_address: "127.0.0.1:0".into(),
            log_level: "debug".into(),
            jwt_secret: JWT_SECRET.into(),
            jwt_expiration_secs: 3600,
        };

        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");

        let registry = Arc::new(RegistryService::new(Arc::new(MemoryPluginStore::new())));
        let access_control = Arc::new(AccessControlService::new(Arc::new(
            MemoryPermissionStore::new(),
        )));
        cas_backend::bootstrap::seed(&registry, &access_control)
            .await
            .expect("seed");

        let state = Arc::new(AppState::new(config, pool, registry, access_control));
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Mint a bearer token for an admin user.
    pub fn admin_token(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = self
            .state
            .auth
            .issue_token(user_id, "admin", true)
            .expect("token");
        (user_id, token)
    }

    /// Mint a bearer token for a regular user.
    pub fn member_token(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        let token = self
            .state
            .auth
            .issue_token(user_id, "member", false)
            .expect("token");
        (user_id, token)
    }
}
