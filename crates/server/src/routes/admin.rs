use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use models::settings::SettingsDoc;
use service::catalog::service::ServiceInput;
use service::errors::ServiceError;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

/// Full catalog for the dashboard (same rows the public list returns,
/// without the viewed side effect).
#[utoipa::path(get, path = "/admin/services", tag = "admin", responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn list_services(
    State(state): State<ServerState>,
) -> Result<Json<Vec<models::service::Model>>, JsonApiError> {
    Ok(Json(state.catalog.list().await?))
}

#[utoipa::path(post, path = "/admin/services", tag = "admin", request_body = crate::openapi::ServiceInputDoc, responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create_service(
    State(state): State<ServerState>,
    Json(input): Json<ServiceInput>,
) -> Result<Json<models::service::Model>, JsonApiError> {
    let created = state.catalog.create(input).await?;
    Ok(Json(created))
}

#[utoipa::path(put, path = "/admin/services/{id}", tag = "admin", request_body = crate::openapi::ServiceInputDoc, params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ServiceInput>,
) -> Result<Json<models::service::Model>, JsonApiError> {
    let updated = state.catalog.update(id, input).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/admin/services/{id}", tag = "admin", params(("id" = Uuid, Path, description = "service id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    if state.catalog.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::not_found("service").into())
    }
}

#[derive(Serialize)]
pub struct IconUploadOutput {
    pub icon_url: String,
}

/// Accept a multipart icon upload (`icon_file` field) and return the
/// public URL of the stored blob.
#[utoipa::path(post, path = "/admin/icons", tag = "admin", responses((status = 200, description = "Uploaded"), (status = 400, description = "Bad Request")))]
pub async fn upload_icon(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<IconUploadOutput>, JsonApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Multipart", Some(e.to_string())))?
    {
        if field.name() != Some("icon_file") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else { continue };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Multipart", Some(e.to_string())))?;
        let icon_url = state.icons.save(&filename, &bytes).await?;
        return Ok(Json(IconUploadOutput { icon_url }));
    }
    Err(JsonApiError::new(
        StatusCode::BAD_REQUEST,
        "Missing File",
        Some("multipart field `icon_file` with a filename is required".into()),
    ))
}

#[utoipa::path(get, path = "/admin/settings", tag = "settings", responses((status = 200, description = "OK")))]
pub async fn get_settings(State(state): State<ServerState>) -> Result<Json<SettingsDoc>, JsonApiError> {
    Ok(Json(service::settings::resolve_global(&state.db).await?))
}

#[utoipa::path(put, path = "/admin/settings", tag = "settings", request_body = crate::openapi::SettingsDocBody, responses((status = 200, description = "Saved")))]
pub async fn save_settings(
    State(state): State<ServerState>,
    Json(doc): Json<SettingsDoc>,
) -> Result<Json<SettingsDoc>, JsonApiError> {
    service::settings::save_global(&state.db, &doc).await?;
    Ok(Json(doc))
}

/// Per-service settings, resolved with the global row as fallback.
#[utoipa::path(get, path = "/admin/services/{id}/settings", tag = "settings", params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_service_settings(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettingsDoc>, JsonApiError> {
    ensure_service_exists(&state, id).await?;
    Ok(Json(service::settings::resolve_for_service(&state.db, id).await?))
}

#[utoipa::path(put, path = "/admin/services/{id}/settings", tag = "settings", request_body = crate::openapi::SettingsDocBody, params(("id" = Uuid, Path, description = "service id")), responses((status = 200, description = "Saved"), (status = 404, description = "Not Found")))]
pub async fn save_service_settings(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(doc): Json<SettingsDoc>,
) -> Result<Json<SettingsDoc>, JsonApiError> {
    ensure_service_exists(&state, id).await?;
    service::settings::save_for_service(&state.db, id, &doc).await?;
    Ok(Json(doc))
}

async fn ensure_service_exists(state: &ServerState, id: Uuid) -> Result<(), JsonApiError> {
    match state.catalog.get(id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::not_found("service").into()),
    }
}
