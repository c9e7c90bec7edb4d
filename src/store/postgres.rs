//! Postgres-backed store implementations.
//!
//! Every mutation is a single-row statement (plain update or
//! `ON CONFLICT` upsert), so concurrent writers are serialized by row
//! locks and the last commit wins without torn state.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    GrantUpsert, NewPlugin, PermissionDefinition, PluginCategory, PluginRecord, PluginStatus,
    ResourceType, UserPermissionGrant,
};
use crate::store::{PermissionStore, PluginStore};

const PLUGIN_COLUMNS: &str =
    "id, name, version, category, status, description, installed_at, updated_at";

/// Plugin records persisted in the `plugins` table.
pub struct PostgresPluginStore {
    db: PgPool,
}

impl PostgresPluginStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginStore for PostgresPluginStore {
    async fn list(&self, category: Option<PluginCategory>) -> Result<Vec<PluginRecord>> {
        let sql = format!(
            "SELECT {PLUGIN_COLUMNS} FROM plugins \
             WHERE ($1::plugin_category IS NULL OR category = $1) \
             ORDER BY id"
        );
        let plugins = sqlx::query_as::<_, PluginRecord>(&sql)
            .bind(category)
            .fetch_all(&self.db)
            .await?;
        Ok(plugins)
    }

    async fn get(&self, id: &str) -> Result<Option<PluginRecord>> {
        let sql = format!("SELECT {PLUGIN_COLUMNS} FROM plugins WHERE id = $1");
        let plugin = sqlx::query_as::<_, PluginRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(plugin)
    }

    async fn upsert(&self, plugin: &NewPlugin) -> Result<PluginRecord> {
        // Status is intentionally absent from the conflict update:
        // re-installing a plugin must not reset its stored status.
        let sql = format!(
            "INSERT INTO plugins (id, name, version, category, status, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 version = EXCLUDED.version, \
                 category = EXCLUDED.category, \
                 description = EXCLUDED.description, \
                 updated_at = now() \
             RETURNING {PLUGIN_COLUMNS}"
        );
        let record = sqlx::query_as::<_, PluginRecord>(&sql)
            .bind(&plugin.id)
            .bind(&plugin.name)
            .bind(&plugin.version)
            .bind(plugin.category)
            .bind(plugin.status)
            .bind(&plugin.description)
            .fetch_one(&self.db)
            .await?;
        Ok(record)
    }

    async fn set_status(&self, id: &str, status: PluginStatus) -> Result<Option<PluginRecord>> {
        let sql = format!(
            "UPDATE plugins SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PLUGIN_COLUMNS}"
        );
        let record = sqlx::query_as::<_, PluginRecord>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.db)
            .await?;
        Ok(record)
    }
}

/// Permission catalog and grants persisted in `plugin_permissions`
/// and `user_plugin_permissions`.
pub struct PostgresPermissionStore {
    db: PgPool,
}

impl PostgresPermissionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn upsert_definition(&self, def: &PermissionDefinition) -> Result<()> {
        sqlx::query(
            "INSERT INTO plugin_permissions \
                 (plugin_id, permission_name, resource_type, resource_id, is_system_level) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (plugin_id, permission_name, resource_type, COALESCE(resource_id, '')) \
             DO UPDATE SET is_system_level = EXCLUDED.is_system_level",
        )
        .bind(&def.plugin_id)
        .bind(&def.permission_name)
        .bind(def.resource_type)
        .bind(&def.resource_id)
        .bind(def.is_system_level)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn list_definitions(
        &self,
        plugin_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<PermissionDefinition>> {
        let defs = sqlx::query_as::<_, PermissionDefinition>(
            "SELECT plugin_id, permission_name, resource_type, resource_id, is_system_level \
             FROM plugin_permissions \
             WHERE plugin_id = $1 \
               AND ($2::permission_resource_type IS NULL OR resource_type = $2) \
             ORDER BY permission_name, resource_type, resource_id NULLS FIRST",
        )
        .bind(plugin_id)
        .bind(resource_type)
        .fetch_all(&self.db)
        .await?;
        Ok(defs)
    }

    async fn definition_exists(
        &self,
        plugin_id: &str,
        permission_name: &str,
        resource_type: ResourceType,
        resource_id: Option<&str>,
    ) -> Result<bool> {
        // A resource-specific grant is covered by an exact-id catalog
        // entry or by a type-wide (NULL resource_id) entry.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM plugin_permissions \
                 WHERE plugin_id = $1 \
                   AND permission_name = $2 \
                   AND resource_type = $3 \
                   AND (resource_id IS NULL OR resource_id = $4) \
             )",
        )
        .bind(plugin_id)
        .bind(permission_name)
        .bind(resource_type)
        .bind(resource_id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn upsert_grant(&self, grant: &GrantUpsert) -> Result<UserPermissionGrant> {
        let row = sqlx::query_as::<_, UserPermissionGrant>(
            "INSERT INTO user_plugin_permissions \
                 (user_id, plugin_id, permission_name, resource_type, resource_id, \
                  is_granted, granted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id, plugin_id, permission_name, resource_type, \
                          COALESCE(resource_id, '')) \
             DO UPDATE SET \
                 is_granted = EXCLUDED.is_granted, \
                 granted_by = EXCLUDED.granted_by, \
                 granted_at = now() \
             RETURNING user_id, plugin_id, permission_name, resource_type, resource_id, \
                       is_granted, granted_by, granted_at",
        )
        .bind(grant.user_id)
        .bind(&grant.plugin_id)
        .bind(&grant.permission_name)
        .bind(grant.resource_type)
        .bind(&grant.resource_id)
        .bind(grant.is_granted)
        .bind(grant.granted_by)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn grants_for(&self, user_id: Uuid, plugin_id: &str) -> Result<Vec<UserPermissionGrant>> {
        let rows = sqlx::query_as::<_, UserPermissionGrant>(
            "SELECT user_id, plugin_id, permission_name, resource_type, resource_id, \
                    is_granted, granted_by, granted_at \
             FROM user_plugin_permissions \
             WHERE user_id = $1 AND plugin_id = $2",
        )
        .bind(user_id)
        .bind(plugin_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
