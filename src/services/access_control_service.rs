//! Access control service.
//!
//! Answers authorization questions and manages the permission catalog
//! and per-user grants. `check` runs on the request hot path, so
//! grants are served from a read-through cache that is invalidated
//! synchronously inside every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    GrantUpsert, PermissionDefinition, ResourceType, UserPermissionGrant,
};
use crate::store::PermissionStore;

/// A `(plugin, permission, resource)` coordinate used by grant,
/// revoke and check.
#[derive(Debug, Clone)]
pub struct PermissionRef {
    pub plugin_id: String,
    pub permission_name: String,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
}

type CacheKey = (Uuid, String);

/// Entries are dropped wholesale once the map reaches this size.
const CHECK_CACHE_MAX_ENTRIES: usize = 4096;

/// Cached grants per (user, plugin).
///
/// `generation` is bumped inside every invalidation. A store fetch
/// started before a mutation observes the old generation and is not
/// allowed to populate the cache, so a pre-revoke snapshot can never
/// be installed after the revoke committed.
#[derive(Default)]
struct CheckCache {
    generation: u64,
    entries: HashMap<CacheKey, Arc<Vec<UserPermissionGrant>>>,
}

/// Access control service over an injected permission store.
pub struct AccessControlService {
    store: Arc<dyn PermissionStore>,
    // Grants per (user, plugin); populated on first check, dropped on
    // any grant/revoke for the same pair before the mutation returns.
    check_cache: RwLock<CheckCache>,
}

impl AccessControlService {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self {
            store,
            check_cache: RwLock::new(CheckCache::default()),
        }
    }

    /// Declare a permission in the catalog. Idempotent upsert keyed by
    /// the definition's unique tuple.
    pub async fn register_permission(&self, def: PermissionDefinition) -> Result<()> {
        self.store.upsert_definition(&def).await?;
        debug!(
            plugin_id = %def.plugin_id,
            permission = %def.permission_name,
            resource_type = def.resource_type.as_str(),
            "permission registered"
        );
        Ok(())
    }

    /// List catalog entries for a plugin.
    pub async fn list_permissions(
        &self,
        plugin_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<PermissionDefinition>> {
        self.store.list_definitions(plugin_id, resource_type).await
    }

    /// Grant a permission to a user. Fails with `UnknownPermission`
    /// when the catalog has no matching definition.
    pub async fn grant(
        &self,
        user_id: Uuid,
        perm: PermissionRef,
        granted_by: Uuid,
    ) -> Result<UserPermissionGrant> {
        self.write_grant(user_id, perm, true, granted_by).await
    }

    /// Revoke a permission from a user.
    ///
    /// Revoking a never-granted tuple records an explicit denial row
    /// rather than failing, so the negative decision is auditable.
    pub async fn revoke(
        &self,
        user_id: Uuid,
        perm: PermissionRef,
        revoked_by: Uuid,
    ) -> Result<UserPermissionGrant> {
        self.write_grant(user_id, perm, false, revoked_by).await
    }

    /// Whether `user_id` holds the permission.
    ///
    /// Absence of a grant is a normal outcome: the answer is `false`,
    /// never an error. Store failures still propagate so callers can
    /// tell infrastructure trouble apart from a denial. When both a
    /// resource-specific row and a type-wide row exist, the specific
    /// row wins.
    pub async fn check(&self, user_id: Uuid, perm: &PermissionRef) -> Result<bool> {
        let grants = self.grants_for(user_id, &perm.plugin_id).await?;

        let matching = grants
            .iter()
            .filter(|g| {
                g.permission_name == perm.permission_name && g.resource_type == perm.resource_type
            })
            .collect::<Vec<_>>();

        if let Some(resource_id) = perm.resource_id.as_deref() {
            if let Some(specific) = matching
                .iter()
                .find(|g| g.resource_id.as_deref() == Some(resource_id))
            {
                return Ok(specific.is_granted);
            }
        }

        Ok(matching
            .iter()
            .find(|g| g.resource_id.is_none())
            .map(|g| g.is_granted)
            .unwrap_or(false))
    }

    async fn write_grant(
        &self,
        user_id: Uuid,
        perm: PermissionRef,
        is_granted: bool,
        granted_by: Uuid,
    ) -> Result<UserPermissionGrant> {
        let known = self
            .store
            .definition_exists(
                &perm.plugin_id,
                &perm.permission_name,
                perm.resource_type,
                perm.resource_id.as_deref(),
            )
            .await?;
        if !known {
            return Err(AppError::UnknownPermission(format!(
                "plugin '{}' does not declare permission '{}' for resource type '{}'",
                perm.plugin_id,
                perm.permission_name,
                perm.resource_type.as_str()
            )));
        }

        let row = self
            .store
            .upsert_grant(&GrantUpsert {
                user_id,
                plugin_id: perm.plugin_id.clone(),
                permission_name: perm.permission_name.clone(),
                resource_type: perm.resource_type,
                resource_id: perm.resource_id.clone(),
                is_granted,
                granted_by,
            })
            .await?;

        // Invalidate before returning: once the mutation is visible to
        // the caller, no check may serve the stale answer. The bump
        // also fences any fetch currently in flight.
        {
            let mut cache = self.check_cache.write().await;
            cache.generation = cache.generation.wrapping_add(1);
            cache.entries.remove(&(user_id, perm.plugin_id.clone()));
        }

        info!(
            user_id = %user_id,
            plugin_id = %row.plugin_id,
            permission = %row.permission_name,
            resource_type = row.resource_type.as_str(),
            resource_id = row.resource_id.as_deref().unwrap_or("*"),
            is_granted,
            actor = %granted_by,
            "permission grant updated"
        );

        Ok(row)
    }

    async fn grants_for(
        &self,
        user_id: Uuid,
        plugin_id: &str,
    ) -> Result<Arc<Vec<UserPermissionGrant>>> {
        let key = (user_id, plugin_id.to_string());
        let observed_generation = {
            let cache = self.check_cache.read().await;
            if let Some(grants) = cache.entries.get(&key) {
                return Ok(grants.clone());
            }
            cache.generation
        };

        let grants = Arc::new(self.store.grants_for(user_id, plugin_id).await?);

        let mut cache = self.check_cache.write().await;
        // A mutation landed while this snapshot was in flight: serve
        // the rows to the current caller but do not cache them.
        if cache.generation == observed_generation {
            if cache.entries.len() >= CHECK_CACHE_MAX_ENTRIES {
                cache.entries.clear();
            }
            cache.entries.insert(key, grants.clone());
        }
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryPermissionStore;

    fn service() -> AccessControlService {
        AccessControlService::new(Arc::new(MemoryPermissionStore::new()))
    }

    fn def(name: &str, resource_type: ResourceType) -> PermissionDefinition {
        PermissionDefinition {
            plugin_id: "rag-assistant".into(),
            permission_name: name.into(),
            resource_type,
            resource_id: None,
            is_system_level: false,
        }
    }

    fn perm(name: &str, resource_type: ResourceType, resource_id: Option<&str>) -> PermissionRef {
        PermissionRef {
            plugin_id: "rag-assistant".into(),
            permission_name: name.into(),
            resource_type,
            resource_id: resource_id.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_check_without_any_grant_is_false() {
        let access = service();
        let allowed = access
            .check(Uuid::new_v4(), &perm("query_documents", ResourceType::Data, None))
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_grant_check_revoke_round_trip() {
        let access = service();
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();

        let p = perm("query_documents", ResourceType::Data, None);
        access.grant(user, p.clone(), admin).await.unwrap();
        assert!(access.check(user, &p).await.unwrap());

        access.revoke(user, p.clone(), admin).await.unwrap();
        assert!(!access.check(user, &p).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_for_undeclared_permission_fails() {
        let access = service();
        let err = access
            .grant(
                Uuid::new_v4(),
                perm("no_such_permission", ResourceType::Action, None),
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownPermission(_)));
    }

    #[tokio::test]
    async fn test_revoke_for_undeclared_permission_fails() {
        let access = service();
        let err = access
            .revoke(
                Uuid::new_v4(),
                perm("no_such_permission", ResourceType::Action, None),
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownPermission(_)));
    }

    #[tokio::test]
    async fn test_revoke_without_prior_grant_records_denial() {
        let access = service();
        let user = Uuid::new_v4();
        access
            .register_permission(def("upload_documents", ResourceType::Action))
            .await
            .unwrap();

        let p = perm("upload_documents", ResourceType::Action, None);
        let row = access.revoke(user, p.clone(), Uuid::new_v4()).await.unwrap();
        assert!(!row.is_granted);
        assert!(!access.check(user, &p).await.unwrap());
    }

    #[tokio::test]
    async fn test_specific_denial_beats_type_wide_grant() {
        let access = service();
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        access
            .register_permission(def("read_collection", ResourceType::Object))
            .await
            .unwrap();

        // Type-wide grant, then an explicit denial for collection X.
        access
            .grant(user, perm("read_collection", ResourceType::Object, None), admin)
            .await
            .unwrap();
        access
            .revoke(
                user,
                perm("read_collection", ResourceType::Object, Some("X")),
                admin,
            )
            .await
            .unwrap();

        assert!(!access
            .check(user, &perm("read_collection", ResourceType::Object, Some("X")))
            .await
            .unwrap());
        // Other collections fall back to the type-wide grant.
        assert!(access
            .check(user, &perm("read_collection", ResourceType::Object, Some("Y")))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_check_never_serves_stale_true_after_revoke() {
        let access = service();
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();

        let p = perm("query_documents", ResourceType::Data, None);
        access.grant(user, p.clone(), admin).await.unwrap();
        // Warm the cache.
        assert!(access.check(user, &p).await.unwrap());

        access.revoke(user, p.clone(), admin).await.unwrap();
        assert!(!access.check(user, &p).await.unwrap());
    }

    #[tokio::test]
    async fn test_check_cache_stays_bounded() {
        let access = service();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();

        // One distinct (user, plugin) pair per check.
        for _ in 0..(CHECK_CACHE_MAX_ENTRIES + 32) {
            access
                .check(
                    Uuid::new_v4(),
                    &perm("query_documents", ResourceType::Data, None),
                )
                .await
                .unwrap();
        }

        let len = access.check_cache.read().await.entries.len();
        assert!(len <= CHECK_CACHE_MAX_ENTRIES);
    }

    #[tokio::test]
    async fn test_register_permission_is_idempotent() {
        let access = service();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();

        let defs = access
            .list_permissions("rag-assistant", None)
            .await
            .unwrap();
        assert_eq!(defs.len(), 1);
    }

    #[tokio::test]
    async fn test_list_permissions_filters_by_resource_type() {
        let access = service();
        access
            .register_permission(def("query_documents", ResourceType::Data))
            .await
            .unwrap();
        access
            .register_permission(def("upload_documents", ResourceType::Action))
            .await
            .unwrap();

        let actions = access
            .list_permissions("rag-assistant", Some(ResourceType::Action))
            .await
            .unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].permission_name, "upload_documents");
    }
}
