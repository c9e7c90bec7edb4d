//! OpenAPI document assembly.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto;
use crate::api::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CAS Backend API",
        description = "Plugin registry and access control service",
        version = "0.3.0",
    ),
    paths(
        handlers::health::health,
        handlers::health::ready,
        handlers::plugins::list_plugins,
        handlers::plugins::get_plugin,
        handlers::plugins::enable_plugin,
        handlers::plugins::disable_plugin,
        handlers::plugins::list_plugin_permissions,
        handlers::permissions::register_permission,
        handlers::permissions::grant_permission,
        handlers::permissions::revoke_permission,
        handlers::permissions::check_permission,
    ),
    components(schemas(
        models::PluginStatus,
        models::PluginCategory,
        models::ResourceType,
        models::PermissionDefinition,
        models::UserPermissionGrant,
        dto::PluginResponse,
        dto::PluginListResponse,
        dto::PermissionListResponse,
        dto::RegisterPermissionRequest,
        dto::GrantRequest,
        dto::GrantResponse,
        dto::CheckResponse,
        handlers::health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "plugins", description = "Plugin registry"),
        (name = "permissions", description = "Permission catalog and grants"),
        (name = "health", description = "Health checks"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the OpenAPI specification
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
