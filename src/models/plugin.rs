//! Plugin record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Plugin status enum.
///
/// `active`/`disabled` is the entire lifecycle; there are no
/// intermediate installing or error states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plugin_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Active,
    Disabled,
}

impl PluginStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Active => "active",
            PluginStatus::Disabled => "disabled",
        }
    }
}

/// Plugin category enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "plugin_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    /// Core plugin; only administrators may change its status.
    System,
    Application,
}

impl PluginCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginCategory::System => "system",
            PluginCategory::Application => "application",
        }
    }
}

/// Plugin entity.
///
/// One row per installed feature module (e.g. "ldap-auth"). The `id`
/// is a stable slug, immutable after creation.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct PluginRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: PluginCategory,
    pub status: PluginStatus,
    pub description: Option<String>,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PluginRecord {
    /// System plugins require administrative capability to enable/disable.
    pub fn is_system(&self) -> bool {
        self.category == PluginCategory::System
    }
}

/// Plugin fields supplied at install/bootstrap time.
///
/// `status` is the initial status only; installing over an existing
/// record updates metadata but preserves the stored status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlugin {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: PluginCategory,
    pub status: PluginStatus,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PluginStatus::Active).unwrap(),
            serde_json::json!("active")
        );
        assert_eq!(
            serde_json::to_value(PluginStatus::Disabled).unwrap(),
            serde_json::json!("disabled")
        );
    }

    #[test]
    fn test_is_system_follows_category() {
        let record = PluginRecord {
            id: "ldap-auth".into(),
            name: "LDAP Authentication".into(),
            version: "1.0.0".into(),
            category: PluginCategory::System,
            status: PluginStatus::Disabled,
            description: None,
            installed_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(record.is_system());
    }
}
