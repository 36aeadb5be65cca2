use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::account::{parse_accounts, AccountType};
use models::service::validate_name;

use crate::catalog::repository::{CatalogRepository, ServiceRecord};
use crate::errors::ServiceError;

/// Admin form payload for creating or editing a service. `accounts_text`
/// is the raw multi-line listing; parsing happens server-side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    pub account_type: String,
    #[serde(default)]
    pub accounts_text: String,
    #[serde(default)]
    pub comments: String,
}

impl ServiceInput {
    /// Validate the scalar fields and parse the accounts listing.
    pub fn into_record(self) -> Result<ServiceRecord, ServiceError> {
        validate_name(&self.name)?;
        let account_type: AccountType = self
            .account_type
            .parse()
            .map_err(ServiceError::Model)?;
        let accounts = parse_accounts(account_type, &self.accounts_text);
        // blank form field means "keep / no icon", not an empty URL
        let icon_url = self.icon_url.filter(|u| !u.trim().is_empty());
        Ok(ServiceRecord {
            name: self.name,
            icon_class: self.icon_class,
            color: self.color,
            icon_url,
            account_type,
            accounts,
            comments: self.comments,
        })
    }
}

/// Application service encapsulating catalog business rules.
pub struct CatalogService<R: CatalogRepository> {
    repo: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<models::service::Model>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<models::service::Model>, ServiceError> {
        self.repo.get(id).await
    }

    /// Public detail read. Serves the record as stored, then clears the
    /// new-accounts flag so the badge disappears after the first view.
    pub async fn view(&self, id: Uuid) -> Result<models::service::Model, ServiceError> {
        let found = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        self.repo.mark_viewed(id).await?;
        Ok(found)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ServiceInput) -> Result<models::service::Model, ServiceError> {
        let record = input.into_record()?;
        let created = self.repo.create(record).await?;
        info!(service_id = %created.id, accounts = created.accounts.as_array().map(|a| a.len()).unwrap_or(0), "service_created");
        Ok(created)
    }

    #[instrument(skip(self, input), fields(service_id = %id))]
    pub async fn update(&self, id: Uuid, input: ServiceInput) -> Result<models::service::Model, ServiceError> {
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("service"));
        }
        let record = input.into_record()?;
        let updated = self.repo.update(id, record).await?;
        info!(service_id = %updated.id, "service_updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        self.repo.delete(id).await
    }
}
