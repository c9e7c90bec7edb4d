//! Plugin registry service.
//!
//! Single source of truth for which plugins exist and whether each is
//! currently active. All status transitions funnel through here.

use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{NewPlugin, PluginCategory, PluginRecord, PluginStatus};
use crate::services::Actor;
use crate::store::PluginStore;

/// Registry service over an injected plugin store.
pub struct RegistryService {
    store: Arc<dyn PluginStore>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn PluginStore>) -> Self {
        Self { store }
    }

    /// List known plugins, optionally filtered by category.
    pub async fn list_plugins(
        &self,
        category: Option<PluginCategory>,
    ) -> Result<Vec<PluginRecord>> {
        self.store.list(category).await
    }

    /// Fetch a plugin by id.
    pub async fn get_plugin(&self, id: &str) -> Result<PluginRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plugin '{id}' is not registered")))
    }

    /// Install or refresh a plugin record (bootstrap/install path).
    ///
    /// Metadata is updated in place for an existing id; the stored
    /// status is preserved so a restart never resets enable state.
    pub async fn install(&self, plugin: NewPlugin) -> Result<PluginRecord> {
        let record = self.store.upsert(&plugin).await?;
        info!(
            plugin_id = %record.id,
            version = %record.version,
            category = record.category.as_str(),
            status = record.status.as_str(),
            "plugin registered"
        );
        Ok(record)
    }

    /// Set a plugin's status to `active`.
    ///
    /// Idempotent: enabling an already-active plugin succeeds and
    /// returns the unchanged record.
    pub async fn enable(&self, id: &str, actor: &Actor) -> Result<PluginRecord> {
        self.transition(id, PluginStatus::Active, actor).await
    }

    /// Set a plugin's status to `disabled`. Idempotent.
    pub async fn disable(&self, id: &str, actor: &Actor) -> Result<PluginRecord> {
        self.transition(id, PluginStatus::Disabled, actor).await
    }

    async fn transition(
        &self,
        id: &str,
        status: PluginStatus,
        actor: &Actor,
    ) -> Result<PluginRecord> {
        let current = self.get_plugin(id).await?;

        if current.is_system() && !actor.is_admin {
            return Err(AppError::Forbidden(format!(
                "changing the status of system plugin '{id}' requires administrator capability"
            )));
        }

        let record = self
            .store
            .set_status(id, status)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plugin '{id}' is not registered")))?;

        info!(
            plugin_id = %record.id,
            previous_status = current.status.as_str(),
            new_status = record.status.as_str(),
            actor = %actor.user_id,
            actor_name = %actor.username,
            "plugin status transition"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryPluginStore;
    use uuid::Uuid;

    fn admin() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "admin".into(),
            is_admin: true,
        }
    }

    fn member() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "member".into(),
            is_admin: false,
        }
    }

    fn service() -> RegistryService {
        RegistryService::new(Arc::new(MemoryPluginStore::new()))
    }

    fn ldap_auth() -> NewPlugin {
        NewPlugin {
            id: "ldap-auth".into(),
            name: "LDAP Authentication".into(),
            version: "1.2.0".into(),
            category: PluginCategory::System,
            status: PluginStatus::Disabled,
            description: Some("Directory-backed login".into()),
        }
    }

    fn rag_assistant() -> NewPlugin {
        NewPlugin {
            id: "rag-assistant".into(),
            name: "Document Assistant".into(),
            version: "0.9.1".into(),
            category: PluginCategory::Application,
            status: PluginStatus::Active,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_get_unknown_plugin_is_not_found() {
        let registry = service();
        let err = registry.get_plugin("nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_enable_then_disable_round_trip() {
        let registry = service();
        registry.install(ldap_auth()).await.unwrap();

        let record = registry.enable("ldap-auth", &admin()).await.unwrap();
        assert_eq!(record.status, PluginStatus::Active);
        assert_eq!(
            registry.get_plugin("ldap-auth").await.unwrap().status,
            PluginStatus::Active
        );

        let record = registry.disable("ldap-auth", &admin()).await.unwrap();
        assert_eq!(record.status, PluginStatus::Disabled);
        assert_eq!(
            registry.get_plugin("ldap-auth").await.unwrap().status,
            PluginStatus::Disabled
        );
    }

    #[tokio::test]
    async fn test_enable_is_idempotent() {
        let registry = service();
        registry.install(ldap_auth()).await.unwrap();

        let first = registry.enable("ldap-auth", &admin()).await.unwrap();
        let second = registry.enable("ldap-auth", &admin()).await.unwrap();
        assert_eq!(first.status, PluginStatus::Active);
        assert_eq!(second.status, PluginStatus::Active);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_touch_system_plugin() {
        let registry = service();
        registry.install(ldap_auth()).await.unwrap();

        let err = registry.enable("ldap-auth", &member()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(
            registry.get_plugin("ldap-auth").await.unwrap().status,
            PluginStatus::Disabled
        );
    }

    #[tokio::test]
    async fn test_non_admin_may_toggle_application_plugin() {
        let registry = service();
        registry.install(rag_assistant()).await.unwrap();

        let record = registry.disable("rag-assistant", &member()).await.unwrap();
        assert_eq!(record.status, PluginStatus::Disabled);
    }

    #[tokio::test]
    async fn test_reinstall_preserves_status() {
        let registry = service();
        registry.install(ldap_auth()).await.unwrap();
        registry.enable("ldap-auth", &admin()).await.unwrap();

        // Same plugin, a newer version: a restart reseeding the
        // catalog must not flip it back to disabled.
        let mut upgraded = ldap_auth();
        upgraded.version = "1.3.0".into();
        let record = registry.install(upgraded).await.unwrap();
        assert_eq!(record.status, PluginStatus::Active);
        assert_eq!(record.version, "1.3.0");
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let registry = service();
        registry.install(ldap_auth()).await.unwrap();
        registry.install(rag_assistant()).await.unwrap();

        let all = registry.list_plugins(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let system = registry
            .list_plugins(Some(PluginCategory::System))
            .await
            .unwrap();
        assert_eq!(system.len(), 1);
        assert_eq!(system[0].id, "ldap-auth");
    }

    #[tokio::test]
    async fn test_concurrent_enables_do_not_corrupt_state() {
        let registry = Arc::new(service());
        registry.install(rag_assistant()).await.unwrap();
        registry.disable("rag-assistant", &admin()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.enable("rag-assistant", &member()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(
            registry.get_plugin("rag-assistant").await.unwrap().status,
            PluginStatus::Active
        );
    }
}
