use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth};
use service::{
    catalog::{repository::SeaOrmCatalogRepository, service::CatalogService},
    runtime,
    storage::icon_store::IconStore,
};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // Non-server config sections work without a config.toml
    let cfg = configs::load_default().unwrap_or_default();
    let storage = cfg.storage.clone();
    let mut admin = cfg.admin.clone();
    admin.normalize_from_env();
    admin.validate()?;

    runtime::ensure_env("frontend", &storage.icon_dir).await?;

    // Icon blob store backing /admin/icons uploads
    let icons = IconStore::new(&storage.icon_dir, &storage.icon_public_prefix).await?;

    // DB connection and catalog service
    let db = models::db::connect().await?;
    let repo = SeaOrmCatalogRepository { db: db.clone() };
    let catalog = Arc::new(CatalogService::new(Arc::new(repo)));

    let state = auth::ServerState {
        db,
        admin: auth::AdminGateConfig {
            email: admin.email,
            session_secret: admin.session_secret,
            session_ttl_hours: admin.session_ttl_hours,
        },
        catalog,
        icons,
    };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(state, cors, &storage.icon_dir);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting console server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
