//! Global settings rows plus the shared settings document shape.
//!
//! The console stores one row keyed [`GLOBAL_KEY`]; per-service overrides
//! live in `service_settings` and reuse the same document.

use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const GLOBAL_KEY: &str = "global";

/// Display labels shown in place of raw account field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub user: String,
    pub pass: String,
    pub expiry: String,
    pub additional: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            user: "User".into(),
            pass: "Pass".into(),
            expiry: "Expiry".into(),
            additional: "Additional".into(),
        }
    }
}

/// The settings blob persisted in the JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDoc {
    #[serde(default)]
    pub placeholders: Placeholders,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Stored settings document for a key, if any. Rows that fail to decode
/// are treated as absent rather than surfaced as errors.
pub async fn get(db: &DatabaseConnection, key: &str) -> Result<Option<SettingsDoc>, errors::ModelError> {
    let row = Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(row.and_then(|m| serde_json::from_value(m.value).ok()))
}

pub async fn upsert(db: &DatabaseConnection, key: &str, doc: &SettingsDoc) -> Result<(), errors::ModelError> {
    let value = serde_json::to_value(doc).map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let existing = Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;

    match existing {
        Some(model) => {
            let mut am: ActiveModel = model.into();
            am.value = Set(value);
            am.updated_at = Set(now);
            am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
        }
        None => {
            let am = ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
            };
            am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
        }
    }
    Ok(())
}
