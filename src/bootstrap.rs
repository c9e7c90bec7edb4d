//! Startup seeding of the shipped plugin catalog.
//!
//! CAS ships two feature modules. Both are registered idempotently on
//! every boot: metadata is refreshed, declared permissions are
//! upserted, and the stored enable/disable status is left untouched.

use tracing::info;

use crate::error::Result;
use crate::models::{NewPlugin, PermissionDefinition, PluginCategory, PluginStatus, ResourceType};
use crate::services::access_control_service::AccessControlService;
use crate::services::registry_service::RegistryService;

/// Shipped plugins and their declared permission surfaces.
fn shipped_plugins() -> Vec<(NewPlugin, Vec<PermissionDefinition>)> {
    vec![
        (
            NewPlugin {
                id: "ldap-auth".into(),
                name: "LDAP Authentication".into(),
                version: "1.2.0".into(),
                category: PluginCategory::System,
                status: PluginStatus::Disabled,
                description: Some("Directory-backed user authentication".into()),
            },
            vec![
                definition("ldap-auth", "manage_directory_config", ResourceType::Object, true),
                definition("ldap-auth", "sync_users", ResourceType::Action, true),
            ],
        ),
        (
            NewPlugin {
                id: "rag-assistant".into(),
                name: "Document Assistant".into(),
                version: "0.9.1".into(),
                category: PluginCategory::Application,
                status: PluginStatus::Active,
                description: Some("Retrieval-augmented document question answering".into()),
            },
            vec![
                definition("rag-assistant", "query_documents", ResourceType::Data, false),
                definition("rag-assistant", "upload_documents", ResourceType::Action, false),
                definition("rag-assistant", "read_collection", ResourceType::Object, false),
                definition("rag-assistant", "manage_collections", ResourceType::Object, false),
            ],
        ),
    ]
}

fn definition(
    plugin_id: &str,
    permission_name: &str,
    resource_type: ResourceType,
    is_system_level: bool,
) -> PermissionDefinition {
    PermissionDefinition {
        plugin_id: plugin_id.into(),
        permission_name: permission_name.into(),
        resource_type,
        resource_id: None,
        is_system_level,
    }
}

/// Seed the plugin registry and permission catalog.
pub async fn seed(registry: &RegistryService, access_control: &AccessControlService) -> Result<()> {
    for (plugin, permissions) in shipped_plugins() {
        let record = registry.install(plugin).await?;
        for def in permissions {
            access_control.register_permission(def).await?;
        }
        info!(plugin_id = %record.id, status = record.status.as_str(), "plugin seeded");
    }
    Ok(())
}
