use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, auth};
use service::catalog::{repository::SeaOrmCatalogRepository, service::CatalogService};
use service::storage::icon_store::IconStore;

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

const ADMIN_EMAIL: &str = "admin@access.com";

async fn build_app() -> anyhow::Result<Router> {
    if std::env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }
    let db = models::db::connect().await?;
    // Run migrations to ensure schema; tolerate an already-applied set
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }

    let icon_dir = format!("target/test-data/{}/icons", Uuid::new_v4());
    let icons = IconStore::new(&icon_dir, "/icons").await.map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let repo = SeaOrmCatalogRepository { db: db.clone() };
    let catalog = Arc::new(CatalogService::new(Arc::new(repo)));

    let state = auth::ServerState {
        db,
        admin: auth::AdminGateConfig {
            email: ADMIN_EMAIL.into(),
            session_secret: "test-secret".into(),
            session_ttl_hours: 1,
        },
        catalog,
        icons,
    };
    Ok(routes::build_router(state, cors(), &icon_dir))
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c.to_string());
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("encode body")))
        .expect("request")
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c.to_string());
    }
    builder.body(Body::empty()).expect("request")
}

/// Log in (mixed case on purpose) and return the session cookie pair.
async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/login", None, &json!({"email": " Admin@Access.COM "})))
        .await
        .expect("login call");
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("cookie str")
        .to_string();
    set_cookie.split(';').next().expect("cookie pair").to_string()
}

#[tokio::test]
async fn login_rejects_unknown_email() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/login", None, &json!({"email": "intruder@access.com"})))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_session() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };

    let resp = app.clone().oneshot(get_request("/admin/services", None)).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(get_request("/admin/services", Some("admin_session=forged-token")))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // public reads stay open
    let resp = app.clone().oneshot(get_request("/api/services", None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn catalog_crud_and_new_accounts_flag() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };
    let cookie = login(&app).await;

    // create with a mixed credentials listing
    let input = json!({
        "name": format!("Streaming {}", Uuid::new_v4()),
        "icon_class": "fa-tv",
        "color": "#e50914",
        "account_type": "credentials",
        "accounts_text": "alice@example.com:hunter2\nbob|pw|2026-01-01|profile 2\n\n",
        "comments": "two shared seats"
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/services", Some(&cookie), &input))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    let id = created["id"].as_str().expect("id").to_string();
    assert_eq!(created["has_new_accounts"], json!(true));
    assert_eq!(created["accounts"].as_array().expect("accounts").len(), 2);
    assert_eq!(created["accounts"][0]["user"], "alice@example.com");
    assert_eq!(created["accounts"][1]["additional"], "profile 2");

    // appears in the public list
    let resp = app.clone().oneshot(get_request("/api/services", None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let list = body_json(resp).await;
    assert!(list.as_array().expect("list").iter().any(|s| s["id"] == json!(id)));

    // first public view serves the flag, then clears it
    let detail_uri = format!("/api/services/{}", id);
    let resp = app.clone().oneshot(get_request(&detail_uri, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["service"]["has_new_accounts"], json!(true));
    assert!(detail["placeholders"]["user"].is_string());

    let resp = app.clone().oneshot(get_request(&detail_uri, None)).await?;
    let detail = body_json(resp).await;
    assert_eq!(detail["service"]["has_new_accounts"], json!(false));

    // update without accounts keeps the flag down and the icon untouched
    let update = json!({
        "name": "Streaming (renamed)",
        "icon_class": "fa-tv",
        "color": "#e50914",
        "account_type": "credentials",
        "accounts_text": "",
        "comments": "renamed"
    });
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &format!("/admin/services/{}", id), Some(&cookie), &update))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    assert_eq!(updated["name"], "Streaming (renamed)");
    assert_eq!(updated["has_new_accounts"], json!(false));

    // delete, then the detail read 404s
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/admin/services/{}", id))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.clone().oneshot(get_request(&detail_uri, None)).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_rejects_bad_input() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };
    let cookie = login(&app).await;

    let blank_name = json!({"name": "  ", "account_type": "credentials"});
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/services", Some(&cookie), &blank_name))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bad_type = json!({"name": "ok", "account_type": "tokens"});
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/services", Some(&cookie), &bad_type))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn errors_use_json_envelope() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };

    // rejected login carries the envelope, not a bare string
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/login", None, &json!({"email": "intruder@access.com"})))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["title"], "Unauthorized");

    let cookie = login(&app).await;

    // writes against an unknown id answer 404 with the same shape
    let missing = Uuid::new_v4();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/admin/services/{}", missing))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["title"], "Not Found");

    let update = json!({"name": "Ghost", "account_type": "credentials"});
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &format!("/admin/services/{}", missing), Some(&cookie), &update))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["title"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn service_settings_fall_back_to_global() -> anyhow::Result<()> {
    let app = match build_app().await { Ok(a) => a, Err(_) => return Ok(()) };
    let cookie = login(&app).await;

    // seed a distinctive global document
    let global = json!({"placeholders": {"user": "Login", "pass": "Secret", "expiry": "Valid Until", "additional": "Notes"}});
    let resp = app
        .clone()
        .oneshot(json_request("PUT", "/admin/settings", Some(&cookie), &global))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let input = json!({
        "name": format!("Cloud {}", Uuid::new_v4()),
        "account_type": "cookies",
        "accounts_text": "sess=abc"
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/admin/services", Some(&cookie), &input))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let id = body_json(resp).await["id"].as_str().expect("id").to_string();

    // no per-service row yet: the global document answers
    let settings_uri = format!("/admin/services/{}/settings", id);
    let resp = app.clone().oneshot(get_request(&settings_uri, Some(&cookie))).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["placeholders"]["user"], "Login");

    // a per-service row overrides it
    let per_service = json!({"placeholders": {"user": "Email", "pass": "Secret", "expiry": "Valid Until", "additional": "Notes"}});
    let resp = app
        .clone()
        .oneshot(json_request("PUT", &settings_uri, Some(&cookie), &per_service))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.clone().oneshot(get_request(&settings_uri, Some(&cookie))).await?;
    assert_eq!(body_json(resp).await["placeholders"]["user"], "Email");

    // the global document is untouched
    let resp = app.clone().oneshot(get_request("/admin/settings", Some(&cookie))).await?;
    assert_eq!(body_json(resp).await["placeholders"]["user"], "Login");

    // settings for an unknown service 404
    let resp = app
        .clone()
        .oneshot(get_request(&format!("/admin/services/{}/settings", Uuid::new_v4()), Some(&cookie)))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // cleanup
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/admin/services/{}", id))
                .header(header::COOKIE, cookie)
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    Ok(())
}
