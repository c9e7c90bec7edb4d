//! Store contracts and backends.
//!
//! All durable state goes through these two traits; route handlers
//! never touch the backing store directly. Implementations are
//! injected into the services at construction time, so there is no
//! module-level singleton standing in for persistence.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    GrantUpsert, NewPlugin, PermissionDefinition, PluginCategory, PluginRecord, PluginStatus,
    ResourceType, UserPermissionGrant,
};

/// Durable store for plugin records.
#[async_trait]
pub trait PluginStore: Send + Sync {
    /// List plugins, optionally filtered by category, ordered by id.
    async fn list(&self, category: Option<PluginCategory>) -> Result<Vec<PluginRecord>>;

    /// Fetch a plugin by id, `None` when unknown.
    async fn get(&self, id: &str) -> Result<Option<PluginRecord>>;

    /// Insert a plugin, or update its metadata if the id exists.
    ///
    /// An existing record keeps its stored status so enable/disable
    /// state survives restarts and reseeding.
    async fn upsert(&self, plugin: &NewPlugin) -> Result<PluginRecord>;

    /// Set a plugin's status as a single atomic row update.
    ///
    /// Returns `None` when the id is unknown.
    async fn set_status(&self, id: &str, status: PluginStatus) -> Result<Option<PluginRecord>>;
}

/// Durable store for the permission catalog and per-user grants.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Idempotent upsert of a catalog entry, keyed by its unique tuple.
    async fn upsert_definition(&self, def: &PermissionDefinition) -> Result<()>;

    /// List catalog entries for a plugin, optionally filtered by
    /// resource type.
    async fn list_definitions(
        &self,
        plugin_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<PermissionDefinition>>;

    /// Whether the catalog declares `(plugin, name, type)` for the
    /// given resource: an exact `resource_id` entry or a type-wide
    /// (`resource_id IS NULL`) entry both qualify.
    async fn definition_exists(
        &self,
        plugin_id: &str,
        permission_name: &str,
        resource_type: ResourceType,
        resource_id: Option<&str>,
    ) -> Result<bool>;

    /// Upsert a grant row by its unique tuple and return the stored row.
    async fn upsert_grant(&self, grant: &GrantUpsert) -> Result<UserPermissionGrant>;

    /// All grant rows for a `(user, plugin)` pair.
    async fn grants_for(&self, user_id: Uuid, plugin_id: &str) -> Result<Vec<UserPermissionGrant>>;
}
