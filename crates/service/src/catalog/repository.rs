use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::account::{Account, AccountType};

use crate::errors::ServiceError;

/// Fields a catalog write carries after the free-text accounts have been
/// parsed. `icon_url = None` on update leaves the stored icon untouched.
#[derive(Clone, Debug)]
pub struct ServiceRecord {
    pub name: String,
    pub icon_class: String,
    pub color: String,
    pub icon_url: Option<String>,
    pub account_type: AccountType,
    pub accounts: Vec<Account>,
    pub comments: String,
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<models::service::Model>, ServiceError>;
    async fn create(&self, record: ServiceRecord) -> Result<models::service::Model, ServiceError>;
    async fn update(&self, id: Uuid, record: ServiceRecord) -> Result<models::service::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn mark_viewed(&self, id: Uuid) -> Result<(), ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError> {
        Ok(models::service::list(&self.db).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<models::service::Model>, ServiceError> {
        Ok(models::service::get(&self.db, id).await?)
    }

    async fn create(&self, record: ServiceRecord) -> Result<models::service::Model, ServiceError> {
        Ok(models::service::create(
            &self.db,
            &record.name,
            &record.icon_class,
            &record.color,
            record.icon_url,
            record.account_type,
            &record.accounts,
            &record.comments,
        )
        .await?)
    }

    async fn update(&self, id: Uuid, record: ServiceRecord) -> Result<models::service::Model, ServiceError> {
        models::service::update(
            &self.db,
            id,
            &record.name,
            &record.icon_class,
            &record.color,
            record.icon_url,
            record.account_type,
            &record.accounts,
            &record.comments,
        )
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(models::service::delete(&self.db, id).await?)
    }

    async fn mark_viewed(&self, id: Uuid) -> Result<(), ServiceError> {
        Ok(models::service::mark_viewed(&self.db, id).await?)
    }
}
