//! Business logic services.

pub mod access_control_service;
pub mod audit_service;
pub mod auth_service;
pub mod registry_service;

use uuid::Uuid;

/// Authenticated caller identity, as seen by the services.
///
/// Authentication itself happens upstream; services only consume the
/// resolved identity and its administrative capability.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}
