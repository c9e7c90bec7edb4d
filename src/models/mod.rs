//! Data model shared by the stores and services.

pub mod permission;
pub mod plugin;

pub use permission::{GrantUpsert, PermissionDefinition, ResourceType, UserPermissionGrant};
pub use plugin::{NewPlugin, PluginCategory, PluginRecord, PluginStatus};
