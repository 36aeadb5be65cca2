use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String }

#[derive(utoipa::ToSchema)]
pub struct ServiceInputDoc {
    pub name: String,
    pub icon_class: String,
    pub color: String,
    pub icon_url: Option<String>,
    pub account_type: String,
    pub accounts_text: String,
    pub comments: String,
}

#[derive(utoipa::ToSchema)]
pub struct PlaceholdersDoc {
    pub user: String,
    pub pass: String,
    pub expiry: String,
    pub additional: String,
}

#[derive(utoipa::ToSchema)]
pub struct SettingsDocBody {
    pub placeholders: PlaceholdersDoc,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::session,
        crate::routes::services::list_services,
        crate::routes::services::service_detail,
        crate::routes::admin::list_services,
        crate::routes::admin::create_service,
        crate::routes::admin::update_service,
        crate::routes::admin::delete_service,
        crate::routes::admin::upload_icon,
        crate::routes::admin::get_settings,
        crate::routes::admin::save_settings,
        crate::routes::admin::get_service_settings,
        crate::routes::admin::save_service_settings,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            ServiceInputDoc,
            PlaceholdersDoc,
            SettingsDocBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "catalog"),
        (name = "admin"),
        (name = "settings")
    )
)]
pub struct ApiDoc;
