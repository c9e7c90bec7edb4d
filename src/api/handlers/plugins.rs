//! Plugin management handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::dto::{
    validate_plugin_id, ListPermissionsQuery, ListPluginsQuery, PermissionListResponse,
    PluginListResponse, PluginResponse,
};
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::services::audit_service::{AuditAction, AuditEntry};

/// Create plugin routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_plugins))
        .route("/:id", get(get_plugin))
        .route("/:id/enable", post(enable_plugin))
        .route("/:id/disable", post(disable_plugin))
        .route("/:id/permissions", get(list_plugin_permissions))
}

/// List registered plugins
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/plugins",
    tag = "plugins",
    params(ListPluginsQuery),
    responses(
        (status = 200, description = "List of plugins", body = PluginListResponse),
        (status = 503, description = "Backing store unavailable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_plugins(
    State(state): State<SharedState>,
    Query(query): Query<ListPluginsQuery>,
) -> Result<Json<PluginListResponse>> {
    let plugins = state.registry.list_plugins(query.category).await?;
    let items = plugins.into_iter().map(PluginResponse::from).collect();
    Ok(Json(PluginListResponse { items }))
}

/// Get a plugin by id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/plugins",
    tag = "plugins",
    responses(
        (status = 200, description = "Plugin details", body = PluginResponse),
        (status = 404, description = "Plugin not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_plugin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PluginResponse>> {
    validate_plugin_id(&id)?;
    let plugin = state.registry.get_plugin(&id).await?;
    Ok(Json(plugin.into()))
}

/// Enable a plugin
#[utoipa::path(
    post,
    path = "/{id}/enable",
    context_path = "/api/v1/plugins",
    tag = "plugins",
    responses(
        (status = 200, description = "Plugin enabled", body = PluginResponse),
        (status = 403, description = "Administrator capability required"),
        (status = 404, description = "Plugin not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enable_plugin(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
) -> Result<Json<PluginResponse>> {
    validate_plugin_id(&id)?;
    let plugin = state.registry.enable(&id, &auth.actor()).await?;

    state
        .audit
        .log_best_effort(
            AuditEntry::new(AuditAction::PluginEnabled, &plugin.id)
                .user(auth.user_id)
                .details(json!({ "status": plugin.status })),
        )
        .await;

    Ok(Json(plugin.into()))
}

/// Disable a plugin
#[utoipa::path(
    post,
    path = "/{id}/disable",
    context_path = "/api/v1/plugins",
    tag = "plugins",
    responses(
        (status = 200, description = "Plugin disabled", body = PluginResponse),
        (status = 403, description = "Administrator capability required"),
        (status = 404, description = "Plugin not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn disable_plugin(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
) -> Result<Json<PluginResponse>> {
    validate_plugin_id(&id)?;
    let plugin = state.registry.disable(&id, &auth.actor()).await?;

    state
        .audit
        .log_best_effort(
            AuditEntry::new(AuditAction::PluginDisabled, &plugin.id)
                .user(auth.user_id)
                .details(json!({ "status": plugin.status })),
        )
        .await;

    Ok(Json(plugin.into()))
}

/// List a plugin's declared permissions
#[utoipa::path(
    get,
    path = "/{id}/permissions",
    context_path = "/api/v1/plugins",
    tag = "plugins",
    params(ListPermissionsQuery),
    responses(
        (status = 200, description = "Declared permissions", body = PermissionListResponse),
        (status = 404, description = "Plugin not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_plugin_permissions(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<ListPermissionsQuery>,
) -> Result<Json<PermissionListResponse>> {
    validate_plugin_id(&id)?;
    // 404 for unknown plugins instead of an empty catalog.
    state.registry.get_plugin(&id).await?;
    let items = state
        .access_control
        .list_permissions(&id, query.resource_type)
        .await?;
    Ok(Json(PermissionListResponse { items }))
}
