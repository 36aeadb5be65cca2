use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::settings::SettingsDoc;
use crate::service;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,
    pub settings: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Stored per-service settings document, if a row exists.
pub async fn get(db: &DatabaseConnection, service_id: Uuid) -> Result<Option<SettingsDoc>, errors::ModelError> {
    let row = Entity::find_by_id(service_id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(row.and_then(|m| serde_json::from_value(m.settings).ok()))
}

pub async fn upsert(db: &DatabaseConnection, service_id: Uuid, doc: &SettingsDoc) -> Result<(), errors::ModelError> {
    let value = serde_json::to_value(doc).map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let existing = Entity::find_by_id(service_id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;

    match existing {
        Some(model) => {
            let mut am: ActiveModel = model.into();
            am.settings = Set(value);
            am.updated_at = Set(now);
            am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
        }
        None => {
            let am = ActiveModel {
                service_id: Set(service_id),
                settings: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
            };
            am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
        }
    }
    Ok(())
}
