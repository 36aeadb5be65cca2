use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi;

pub mod auth;
pub mod services;
pub mod admin;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: static frontend, public catalog
/// reads, the admin session routes, and the gated admin console API.
pub fn build_router(state: ServerState, cors: CorsLayer, icon_dir: &str) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Public routes (health + catalog reads + session endpoints)
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/services", get(services::list_services))
        .route("/api/services/:id", get(services::service_detail))
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/session", get(auth::session));

    // Admin console routes, gated by the session cookie
    let admin_routes = Router::new()
        .route("/admin/services", get(admin::list_services).post(admin::create_service))
        .route("/admin/services/:id", put(admin::update_service).delete(admin::delete_service))
        .route("/admin/services/:id/settings", get(admin::get_service_settings).put(admin::save_service_settings))
        .route("/admin/settings", get(admin::get_settings).put(admin::save_settings))
        .route("/admin/icons", post(admin::upload_icon))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_session,
        ));

    // Compose; uploaded icons and the static frontend are plain file services
    public
        .merge(admin_routes)
        .nest_service("/icons", ServeDir::new(icon_dir))
        .fallback_service(static_dir)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
