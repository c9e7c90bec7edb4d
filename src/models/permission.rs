//! Permission catalog and grant models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Resource type a permission applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "permission_resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Field,
    Object,
    Data,
    Action,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Field => "field",
            ResourceType::Object => "object",
            ResourceType::Data => "data",
            ResourceType::Action => "action",
        }
    }
}

/// Permission catalog entry.
///
/// Declares that a plugin exposes a permission; it is not a grant.
/// Unique on `(plugin_id, permission_name, resource_type, resource_id)`.
/// `resource_id = None` declares the permission for the whole resource
/// type.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct PermissionDefinition {
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub is_system_level: bool,
}

/// Per-user grant row.
///
/// At most one row per `(user, plugin, permission, type, resource)`
/// tuple; re-granting or revoking updates the row in place. Rows are
/// never hard-deleted so the audit trail of explicit denials survives.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct UserPermissionGrant {
    pub user_id: Uuid,
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub is_granted: bool,
    pub granted_by: Uuid,
    pub granted_at: DateTime<Utc>,
}

/// Fields for a grant/revoke upsert.
#[derive(Debug, Clone)]
pub struct GrantUpsert {
    pub user_id: Uuid,
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub is_granted: bool,
    pub granted_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_round_trips_through_serde() {
        for (variant, text) in [
            (ResourceType::Field, "\"field\""),
            (ResourceType::Object, "\"object\""),
            (ResourceType::Data, "\"data\""),
            (ResourceType::Action, "\"action\""),
        ] {
            assert_eq!(serde_json::to_string(&variant).unwrap(), text);
            let parsed: ResourceType = serde_json::from_str(text).unwrap();
            assert_eq!(parsed, variant);
        }
    }
}
