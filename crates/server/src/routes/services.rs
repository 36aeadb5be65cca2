use axum::{extract::{Path, State}, Json};
use serde::Serialize;
use uuid::Uuid;

use models::settings::Placeholders;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// Detail payload for the public service page: the record plus the
/// resolved display labels.
#[derive(Serialize)]
pub struct ServiceDetail {
    pub service: models::service::Model,
    pub placeholders: Placeholders,
}

/// Public catalog listing, oldest first.
#[utoipa::path(get, path = "/api/services", tag = "catalog", responses((status = 200, description = "OK")))]
pub async fn list_services(
    State(state): State<ServerState>,
) -> Result<Json<Vec<models::service::Model>>, JsonApiError> {
    let services = state.catalog.list().await?;
    Ok(Json(services))
}

/// Public detail view. Serving it clears the service's new-accounts flag.
#[utoipa::path(get, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn service_detail(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceDetail>, JsonApiError> {
    let service = state.catalog.view(id).await?;
    let settings = service::settings::resolve_for_service(&state.db, id).await?;
    Ok(Json(ServiceDetail { service, placeholders: settings.placeholders }))
}
