//! Audit logging service.
//!
//! Append-only trail of plugin status transitions and permission
//! mutations. Writes are best-effort from the handlers' point of
//! view: a failed audit insert is logged and never turned into a
//! request failure.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

/// Audit action types
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    PluginInstalled,
    PluginEnabled,
    PluginDisabled,
    PermissionRegistered,
    PermissionGranted,
    PermissionRevoked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PluginInstalled => "PLUGIN_INSTALLED",
            AuditAction::PluginEnabled => "PLUGIN_ENABLED",
            AuditAction::PluginDisabled => "PLUGIN_DISABLED",
            AuditAction::PermissionRegistered => "PERMISSION_REGISTERED",
            AuditAction::PermissionGranted => "PERMISSION_GRANTED",
            AuditAction::PermissionRevoked => "PERMISSION_REVOKED",
        }
    }
}

/// A single audit entry prior to insertion
#[derive(Debug)]
pub struct AuditEntry {
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub plugin_id: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, plugin_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action,
            plugin_id: plugin_id.into(),
            details: None,
        }
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Audit service
pub struct AuditService {
    db: PgPool,
}

impl AuditService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert an audit entry, returning its id.
    pub async fn log(&self, entry: AuditEntry) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO audit_log (user_id, action, plugin_id, details) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(&entry.plugin_id)
        .bind(&entry.details)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    /// Insert an audit entry, downgrading failure to a warning.
    pub async fn log_best_effort(&self, entry: AuditEntry) {
        let action = entry.action.as_str();
        if let Err(e) = self.log(entry).await {
            tracing::warn!(action, error = %e, "audit write failed");
        }
    }
}
