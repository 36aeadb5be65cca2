use sea_orm::{entity::prelude::*, Set, DatabaseConnection, ActiveModelTrait, EntityTrait, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountType};
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub icon_class: String,
    pub color: String,
    pub icon_url: Option<String>,
    pub account_type: String,
    pub accounts: Json,
    pub comments: String,
    pub has_new_accounts: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Settings }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Settings => crate::service_settings::Relation::Service.def().rev(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("service name must not be empty".into()));
    }
    Ok(())
}

fn accounts_json(accounts: &[Account]) -> Result<Json, errors::ModelError> {
    serde_json::to_value(accounts).map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// All services, public listing order (oldest first).
pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    icon_class: &str,
    color: &str,
    icon_url: Option<String>,
    account_type: AccountType,
    accounts: &[Account],
    comments: &str,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        icon_class: Set(icon_class.trim().to_string()),
        color: Set(color.trim().to_string()),
        icon_url: Set(icon_url),
        account_type: Set(account_type.as_str().to_string()),
        accounts: Set(accounts_json(accounts)?),
        comments: Set(comments.trim().to_string()),
        // freshly listed accounts are flagged until first public view
        has_new_accounts: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Update a service in place. `icon_url` is only replaced when a new one
/// is supplied; a non-empty account list re-raises the new-accounts flag.
/// Returns `None` when no row with this id exists.
#[allow(clippy::too_many_arguments)]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    name: &str,
    icon_class: &str,
    color: &str,
    icon_url: Option<String>,
    account_type: AccountType,
    accounts: &[Account],
    comments: &str,
) -> Result<Option<Model>, errors::ModelError> {
    validate_name(name)?;

    let row = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let Some(row) = row else { return Ok(None) };
    let mut found: ActiveModel = row.into();

    found.name = Set(name.trim().to_string());
    found.icon_class = Set(icon_class.trim().to_string());
    found.color = Set(color.trim().to_string());
    if let Some(url) = icon_url {
        found.icon_url = Set(Some(url));
    }
    found.account_type = Set(account_type.as_str().to_string());
    found.accounts = Set(accounts_json(accounts)?);
    found.comments = Set(comments.trim().to_string());
    if !accounts.is_empty() {
        found.has_new_accounts = Set(true);
    }
    found.updated_at = Set(Utc::now().into());

    found
        .update(db)
        .await
        .map(Some)
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

/// Clear the new-accounts flag after the listing has been served once.
pub async fn mark_viewed(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let Some(model) = found else { return Ok(()) };
    if !model.has_new_accounts {
        return Ok(());
    }
    let mut am: ActiveModel = model.into();
    am.has_new_accounts = Set(false);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
