//! Placeholder settings with global fallback.
//!
//! Resolution order for a service: its own `service_settings` row, then
//! the stored global row, then the built-in defaults.

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::settings::{SettingsDoc, GLOBAL_KEY};

use crate::errors::ServiceError;

/// Pure fallback policy, shared by the global and per-service paths.
pub fn resolve(per_service: Option<SettingsDoc>, global: Option<SettingsDoc>) -> SettingsDoc {
    per_service.or(global).unwrap_or_default()
}

pub async fn resolve_global(db: &DatabaseConnection) -> Result<SettingsDoc, ServiceError> {
    let global = models::settings::get(db, GLOBAL_KEY).await?;
    Ok(resolve(None, global))
}

pub async fn save_global(db: &DatabaseConnection, doc: &SettingsDoc) -> Result<(), ServiceError> {
    Ok(models::settings::upsert(db, GLOBAL_KEY, doc).await?)
}

pub async fn resolve_for_service(db: &DatabaseConnection, service_id: Uuid) -> Result<SettingsDoc, ServiceError> {
    let per_service = models::service_settings::get(db, service_id).await?;
    let global = if per_service.is_some() {
        None
    } else {
        models::settings::get(db, GLOBAL_KEY).await?
    };
    Ok(resolve(per_service, global))
}

pub async fn save_for_service(db: &DatabaseConnection, service_id: Uuid, doc: &SettingsDoc) -> Result<(), ServiceError> {
    Ok(models::service_settings::upsert(db, service_id, doc).await?)
}
