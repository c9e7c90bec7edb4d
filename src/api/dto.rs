//! Shared request/response types and boundary validation.
//!
//! Bodies are typed and validated here before any service is called,
//! so loosely shaped payloads never reach the registry or access
//! control layers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{PermissionDefinition, PluginCategory, PluginRecord, PluginStatus, ResourceType};

/// Plugin ids are lowercase slugs: `[a-z0-9]` separated by single dashes.
pub fn validate_plugin_id(id: &str) -> Result<()> {
    let valid_shape = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !id.starts_with('-')
        && !id.ends_with('-')
        && !id.contains("--");
    if !valid_shape {
        return Err(AppError::Validation(format!(
            "invalid plugin id '{id}': expected a lowercase slug"
        )));
    }
    Ok(())
}

fn validate_permission_name(name: &str) -> Result<()> {
    let valid_shape = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid_shape {
        return Err(AppError::Validation(format!(
            "invalid permission name '{name}': expected lowercase snake_case"
        )));
    }
    Ok(())
}

fn validate_resource_id(resource_id: &Option<String>) -> Result<()> {
    if let Some(id) = resource_id {
        if id.is_empty() || id.len() > 256 {
            return Err(AppError::Validation(
                "resource_id must be a non-empty string of at most 256 characters".into(),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPluginsQuery {
    /// Filter by plugin category
    pub category: Option<PluginCategory>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PluginResponse {
    pub id: String,
    pub name: String,
    pub version: String,
    pub category: PluginCategory,
    pub status: PluginStatus,
    pub description: Option<String>,
    pub installed_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PluginRecord> for PluginResponse {
    fn from(record: PluginRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            version: record.version,
            category: record.category,
            status: record.status,
            description: record.description,
            installed_at: record.installed_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PluginListResponse {
    pub items: Vec<PluginResponse>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPermissionsQuery {
    /// Filter by resource type
    pub resource_type: Option<ResourceType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionListResponse {
    pub items: Vec<PermissionDefinition>,
}

/// Declare a permission in the catalog.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterPermissionRequest {
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub is_system_level: bool,
}

impl RegisterPermissionRequest {
    pub fn validate(&self) -> Result<()> {
        validate_plugin_id(&self.plugin_id)?;
        validate_permission_name(&self.permission_name)?;
        validate_resource_id(&self.resource_id)
    }
}

/// Grant or revoke a permission for a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantRequest {
    pub user_id: Uuid,
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
}

impl GrantRequest {
    pub fn validate(&self) -> Result<()> {
        validate_plugin_id(&self.plugin_id)?;
        validate_permission_name(&self.permission_name)?;
        validate_resource_id(&self.resource_id)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GrantResponse {
    pub user_id: Uuid,
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub is_granted: bool,
    pub granted_by: Uuid,
    pub granted_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::models::UserPermissionGrant> for GrantResponse {
    fn from(row: crate::models::UserPermissionGrant) -> Self {
        Self {
            user_id: row.user_id,
            plugin_id: row.plugin_id,
            permission_name: row.permission_name,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            is_granted: row.is_granted,
            granted_by: row.granted_by,
            granted_at: row.granted_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckQuery {
    /// Defaults to the authenticated caller; checking another user
    /// requires administrator capability.
    pub user_id: Option<Uuid>,
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
}

impl CheckQuery {
    pub fn validate(&self) -> Result<()> {
        validate_plugin_id(&self.plugin_id)?;
        validate_permission_name(&self.permission_name)?;
        validate_resource_id(&self.resource_id)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub user_id: Uuid,
    pub allowed: bool,
}
