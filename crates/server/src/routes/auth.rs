use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use service::catalog::repository::SeaOrmCatalogRepository;
use service::catalog::service::CatalogService;
use service::storage::icon_store::IconStore;

use crate::errors::JsonApiError;

pub const SESSION_COOKIE: &str = "admin_session";

/// Admin gate configuration. One hardcoded admin identity: a submitted
/// email either matches or it does not.
#[derive(Clone)]
pub struct AdminGateConfig {
    pub email: String,
    pub session_secret: String,
    pub session_ttl_hours: u64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub admin: AdminGateConfig,
    pub catalog: Arc<CatalogService<SeaOrmCatalogRepository>>,
    pub icons: Arc<IconStore>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
}

#[derive(Serialize)]
pub struct SessionOutput {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    iat: usize,
    exp: usize,
}

fn issue_token(admin: &AdminGateConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: admin.email.clone(),
        role: "admin".into(),
        iat: now,
        exp: now + (admin.session_ttl_hours * 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(admin.session_secret.as_bytes()))
}

fn decode_session(admin: &AdminGateConfig, token: &str) -> Option<Claims> {
    let key = DecodingKey::from_secret(admin.session_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation).ok()?;
    if data.claims.role != "admin" {
        return None;
    }
    Some(data.claims)
}

/// The whole admin gate: trim + case-insensitive match against the
/// configured address. No password, no user table.
#[utoipa::path(post, path = "/admin/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<SessionOutput>), JsonApiError> {
    let submitted = input.email.trim().to_lowercase();
    if submitted.is_empty() || submitted != state.admin.email.trim().to_lowercase() {
        tracing::warn!("admin login rejected");
        return Err(JsonApiError::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            Some("invalid email address".into()),
        ));
    }

    let token = issue_token(&state.admin).map_err(|e| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
    })?;
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);

    tracing::info!(event = "admin_login", "admin session issued");
    Ok((jar, Json(SessionOutput { email: state.admin.email.clone(), role: "admin".into() })))
}

#[utoipa::path(post, path = "/admin/logout", tag = "auth", responses((status = 204, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

/// Session probe for the dashboard: 200 while the cookie is valid.
#[utoipa::path(get, path = "/admin/session", tag = "auth", responses((status = 200, description = "OK"), (status = 401, description = "Unauthorized")))]
pub async fn session(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<Json<SessionOutput>, StatusCode> {
    let token = jar.get(SESSION_COOKIE).ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = decode_session(&state.admin, token.value()).ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(SessionOutput { email: claims.sub, role: claims.role }))
}

/// Route-layer middleware guarding the admin catalog and settings routes.
/// Missing or invalid session cookie yields 401; failures are logged.
pub async fn require_admin_session(
    State(state): State<ServerState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let Some(token) = jar.get(SESSION_COOKIE) else {
        tracing::warn!(%path, "missing admin session cookie");
        return Err(StatusCode::UNAUTHORIZED);
    };
    if decode_session(&state.admin, token.value()).is_none() {
        tracing::warn!(%path, "invalid or expired admin session");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}
