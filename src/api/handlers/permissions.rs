//! Permission management handlers.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::dto::{CheckQuery, CheckResponse, GrantRequest, GrantResponse, RegisterPermissionRequest};
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::PermissionDefinition;
use crate::services::access_control_service::PermissionRef;
use crate::services::audit_service::{AuditAction, AuditEntry};

/// Routes available to any authenticated caller
pub fn router() -> Router<SharedState> {
    Router::new().route("/check", get(check_permission))
}

/// Routes requiring administrator capability
pub fn admin_router() -> Router<SharedState> {
    Router::new()
        .route("/", post(register_permission))
        .route("/grant", post(grant_permission))
        .route("/revoke", post(revoke_permission))
}

impl From<&GrantRequest> for PermissionRef {
    fn from(req: &GrantRequest) -> Self {
        Self {
            plugin_id: req.plugin_id.clone(),
            permission_name: req.permission_name.clone(),
            resource_type: req.resource_type,
            resource_id: req.resource_id.clone(),
        }
    }
}

/// Declare a permission in the catalog
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/permissions",
    tag = "permissions",
    request_body = RegisterPermissionRequest,
    responses(
        (status = 201, description = "Permission registered"),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Administrator capability required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_permission(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<RegisterPermissionRequest>,
) -> Result<StatusCode> {
    req.validate()?;
    // The catalog only describes installed plugins.
    state.registry.get_plugin(&req.plugin_id).await?;

    state
        .access_control
        .register_permission(PermissionDefinition {
            plugin_id: req.plugin_id.clone(),
            permission_name: req.permission_name.clone(),
            resource_type: req.resource_type,
            resource_id: req.resource_id.clone(),
            is_system_level: req.is_system_level,
        })
        .await?;

    state
        .audit
        .log_best_effort(
            AuditEntry::new(AuditAction::PermissionRegistered, &req.plugin_id)
                .user(auth.user_id)
                .details(json!({
                    "permission_name": req.permission_name,
                    "resource_type": req.resource_type,
                    "resource_id": req.resource_id,
                })),
        )
        .await;

    Ok(StatusCode::CREATED)
}

/// Grant a permission to a user
#[utoipa::path(
    post,
    path = "/grant",
    context_path = "/api/v1/permissions",
    tag = "permissions",
    request_body = GrantRequest,
    responses(
        (status = 200, description = "Grant recorded", body = GrantResponse),
        (status = 400, description = "Unknown permission"),
        (status = 403, description = "Administrator capability required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_permission(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<GrantResponse>> {
    req.validate()?;
    let row = state
        .access_control
        .grant(req.user_id, PermissionRef::from(&req), auth.user_id)
        .await?;

    state
        .audit
        .log_best_effort(
            AuditEntry::new(AuditAction::PermissionGranted, &req.plugin_id)
                .user(auth.user_id)
                .details(json!({
                    "target_user": req.user_id,
                    "permission_name": req.permission_name,
                    "resource_type": req.resource_type,
                    "resource_id": req.resource_id,
                })),
        )
        .await;

    Ok(Json(row.into()))
}

/// Revoke a permission from a user
#[utoipa::path(
    post,
    path = "/revoke",
    context_path = "/api/v1/permissions",
    tag = "permissions",
    request_body = GrantRequest,
    responses(
        (status = 200, description = "Denial recorded", body = GrantResponse),
        (status = 400, description = "Unknown permission"),
        (status = 403, description = "Administrator capability required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_permission(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(req): Json<GrantRequest>,
) -> Result<Json<GrantResponse>> {
    req.validate()?;
    let row = state
        .access_control
        .revoke(req.user_id, PermissionRef::from(&req), auth.user_id)
        .await?;

    state
        .audit
        .log_best_effort(
            AuditEntry::new(AuditAction::PermissionRevoked, &req.plugin_id)
                .user(auth.user_id)
                .details(json!({
                    "target_user": req.user_id,
                    "permission_name": req.permission_name,
                    "resource_type": req.resource_type,
                    "resource_id": req.resource_id,
                })),
        )
        .await;

    Ok(Json(row.into()))
}

/// Check whether a user holds a permission
#[utoipa::path(
    get,
    path = "/check",
    context_path = "/api/v1/permissions",
    tag = "permissions",
    params(CheckQuery),
    responses(
        (status = 200, description = "Check result", body = CheckResponse),
        (status = 403, description = "Checking another user requires administrator capability")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_permission(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>> {
    query.validate()?;

    let user_id = query.user_id.unwrap_or(auth.user_id);
    if user_id != auth.user_id && !auth.is_admin {
        return Err(AppError::Forbidden(
            "checking another user's permissions requires administrator capability".into(),
        ));
    }

    let allowed = state
        .access_control
        .check(
            user_id,
            &PermissionRef {
                plugin_id: query.plugin_id,
                permission_name: query.permission_name,
                resource_type: query.resource_type,
                resource_id: query.resource_id,
            },
        )
        .await?;

    Ok(Json(CheckResponse { user_id, allowed }))
}
