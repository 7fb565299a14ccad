//! Tideline site server
//!
//! HTTP surface for the palette theming system: the admin palette change
//! endpoint, palette listings for the admin picker, and the stylesheet that
//! carries the active palette to every page.
//!
//! Routes:
//!
//! - `POST /api/palette-change` - admin only; `{ "paletteId": "..." }`
//! - `GET /api/palettes` - registry grouped by category, with the active id
//! - `GET /api/palette` - resolved context of the active palette
//! - `GET /theme.css` - `:root` custom properties of the active palette
//! - `GET /health`

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::Method, routing::get, Json, Router};
use palette::{builtin_registry, PaletteRegistry};
use serde::Serialize;
use storage::ConfigStore;
use theme_state::{ActiveThemeResolver, AdminIdentity, ResolverConfig, ThemeAdmin};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

pub use config::{ServerConfig, StoreBackend};
pub use error::{ApiError, AppError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Palette catalog
    pub registry: Arc<PaletteRegistry>,
    /// Active palette reader
    pub resolver: Arc<ActiveThemeResolver>,
    /// Admin palette mutator
    pub admin: Arc<ThemeAdmin>,
}

impl AppState {
    /// Wire the resolver and admin mutator over one store
    ///
    /// Successful palette changes invalidate the resolver's cache.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        registry: Arc<PaletteRegistry>,
        admin: Option<AdminIdentity>,
        resolver_config: ResolverConfig,
    ) -> Self {
        let resolver = Arc::new(ActiveThemeResolver::with_config(
            store.clone(),
            registry.clone(),
            resolver_config,
        ));
        let admin = ThemeAdmin::new(store, registry.clone(), admin).with_resolver(resolver.clone());

        Self {
            registry,
            resolver,
            admin: Arc::new(admin),
        }
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(routes::site_router())
        .nest("/api", routes::api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured store and serve until the listener fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let store = config.store.open()?;
    let state = AppState::new(store, Arc::new(builtin_registry()), config.admin, config.resolver);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting tideline site server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
