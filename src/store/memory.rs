//! In-memory store implementations for tests.
//!
//! Mirrors the uniqueness semantics of the Postgres schema. Not wired
//! into the server: losing plugin status on every restart is exactly
//! the failure mode the durable stores exist to prevent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    GrantUpsert, NewPlugin, PermissionDefinition, PluginCategory, PluginRecord, PluginStatus,
    ResourceType, UserPermissionGrant,
};
use crate::store::{PermissionStore, PluginStore};

/// In-memory plugin store.
#[derive(Default)]
pub struct MemoryPluginStore {
    plugins: RwLock<HashMap<String, PluginRecord>>,
}

impl MemoryPluginStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginStore for MemoryPluginStore {
    async fn list(&self, category: Option<PluginCategory>) -> Result<Vec<PluginRecord>> {
        let plugins = self.plugins.read().await;
        let mut records: Vec<PluginRecord> = plugins
            .values()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<PluginRecord>> {
        Ok(self.plugins.read().await.get(id).cloned())
    }

    async fn upsert(&self, plugin: &NewPlugin) -> Result<PluginRecord> {
        let mut plugins = self.plugins.write().await;
        let now = Utc::now();
        let record = match plugins.get(&plugin.id) {
            Some(existing) => PluginRecord {
                id: plugin.id.clone(),
                name: plugin.name.clone(),
                version: plugin.version.clone(),
                category: plugin.category,
                // Stored status survives reinstall, as in Postgres.
                status: existing.status,
                description: plugin.description.clone(),
                installed_at: existing.installed_at,
                updated_at: now,
            },
            None => PluginRecord {
                id: plugin.id.clone(),
                name: plugin.name.clone(),
                version: plugin.version.clone(),
                category: plugin.category,
                status: plugin.status,
                description: plugin.description.clone(),
                installed_at: now,
                updated_at: now,
            },
        };
        plugins.insert(plugin.id.clone(), record.clone());
        Ok(record)
    }

    async fn set_status(&self, id: &str, status: PluginStatus) -> Result<Option<PluginRecord>> {
        let mut plugins = self.plugins.write().await;
        match plugins.get_mut(id) {
            Some(record) => {
                record.status = status;
                record.updated_at = Utc::now();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

type DefKey = (String, String, ResourceType, Option<String>);
type GrantKey = (Uuid, String, String, ResourceType, Option<String>);

/// In-memory permission store.
#[derive(Default)]
pub struct MemoryPermissionStore {
    definitions: RwLock<HashMap<DefKey, PermissionDefinition>>,
    grants: RwLock<HashMap<GrantKey, UserPermissionGrant>>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn upsert_definition(&self, def: &PermissionDefinition) -> Result<()> {
        let key = (
            def.plugin_id.clone(),
            def.permission_name.clone(),
            def.resource_type,
            def.resource_id.clone(),
        );
        self.definitions.write().await.insert(key, def.clone());
        Ok(())
    }

    async fn list_definitions(
        &self,
        plugin_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<PermissionDefinition>> {
        let definitions = self.definitions.read().await;
        let mut defs: Vec<PermissionDefinition> = definitions
            .values()
            .filter(|d| d.plugin_id == plugin_id)
            .filter(|d| resource_type.map_or(true, |t| d.resource_type == t))
            .cloned()
            .collect();
        defs.sort_by(|a, b| {
            (&a.permission_name, &a.resource_id).cmp(&(&b.permission_name, &b.resource_id))
        });
        Ok(defs)
    }

    async fn definition_exists(
        &self,
        plugin_id: &str,
        permission_name: &str,
        resource_type: ResourceType,
        resource_id: Option<&str>,
    ) -> Result<bool> {
        let definitions = self.definitions.read().await;
        Ok(definitions.values().any(|d| {
            d.plugin_id == plugin_id
                && d.permission_name == permission_name
                && d.resource_type == resource_type
                && (d.resource_id.is_none() || d.resource_id.as_deref() == resource_id)
        }))
    }

    async fn upsert_grant(&self, grant: &GrantUpsert) -> Result<UserPermissionGrant> {
        let key = (
            grant.user_id,
            grant.plugin_id.clone(),
            grant.permission_name.clone(),
            grant.resource_type,
            grant.resource_id.clone(),
        );
        let row = UserPermissionGrant {
            user_id: grant.user_id,
            plugin_id: grant.plugin_id.clone(),
            permission_name: grant.permission_name.clone(),
            resource_type: grant.resource_type,
            resource_id: grant.resource_id.clone(),
            is_granted: grant.is_granted,
            granted_by: grant.granted_by,
            granted_at: Utc::now(),
        };
        self.grants.write().await.insert(key, row.clone());
        Ok(row)
    }

    async fn grants_for(&self, user_id: Uuid, plugin_id: &str) -> Result<Vec<UserPermissionGrant>> {
        let grants = self.grants.read().await;
        Ok(grants
            .values()
            .filter(|g| g.user_id == user_id && g.plugin_id == plugin_id)
            .cloned()
            .collect())
    }
}
