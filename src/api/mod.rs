//! API module - HTTP handlers and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::services::access_control_service::AccessControlService;
use crate::services::audit_service::AuditService;
use crate::services::auth_service::AuthService;
use crate::services::registry_service::RegistryService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: PgPool,
    pub registry: Arc<RegistryService>,
    pub access_control: Arc<AccessControlService>,
    pub audit: Arc<AuditService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: PgPool,
        registry: Arc<RegistryService>,
        access_control: Arc<AccessControlService>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            &config.jwt_secret,
            config.jwt_expiration_secs,
        ));
        let audit = Arc::new(AuditService::new(db.clone()));
        Self {
            config: Arc::new(config),
            db,
            registry,
            access_control,
            audit,
            auth,
        }
    }
}

pub type SharedState = Arc<AppState>;
