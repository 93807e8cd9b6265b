use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{CorsConfig, GatewayConfig};
use crate::error::GatewayError;
use crate::handler::{self, AppState};

/// Largest accepted request body (reference uploads)
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

const API_PREFIX: &str = "/api/";
const ASSETS_PATH: &str = "/assets";
const INDEX_FILE: &str = "index.html";

pub fn build_router(state: Arc<AppState>, config: &GatewayConfig) -> Router {
    let router = Router::new()
        .route(
            "/api/videos",
            get(handler::list_videos).post(handler::create_video),
        )
        .route(
            "/api/videos/{id}",
            get(handler::get_video).delete(handler::delete_video),
        )
        .route("/api/videos/{id}/content", get(handler::download_content))
        .route("/api/videos/{id}/remix", post(handler::remix_video))
        .route("/api/prompts/improve", post(handler::improve_prompt))
        .route("/health", get(handler::health));

    let router = match frontend_bundle(&config.frontend.static_dir) {
        Some(dir) => {
            info!("Serving frontend bundle from {}", dir.display());
            let index = dir.join(INDEX_FILE);
            router
                .nest_service(ASSETS_PATH, ServeDir::new(dir.join("assets")))
                .fallback(move |method: Method, uri: Uri| {
                    let index = index.clone();
                    async move { spa_fallback(method, uri, &index).await }
                })
        }
        None => {
            info!("No frontend bundle found, running in development mode");
            router
                .route("/", get(handler::dev_root))
                .fallback(|| async { GatewayError::NotFound })
        }
    };

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors))
        .with_state(state)
}

fn frontend_bundle(dir: &Path) -> Option<&Path> {
    dir.is_dir().then_some(dir)
}

/// Serve the entry document for client-side routes; API paths stay 404
async fn spa_fallback(method: Method, uri: Uri, index: &Path) -> Response {
    if is_api_path(uri.path()) {
        return GatewayError::NotFound.into_response();
    }
    if method != Method::GET && method != Method::HEAD {
        return GatewayError::MethodNotAllowed.into_response();
    }

    match tokio::fs::read(index).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!("Failed to read {}: {}", index.display(), e);
            GatewayError::NotFound.into_response()
        }
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with(API_PREFIX)
}

/// Allow-list CORS with credentials; `allow_any_origin` mirrors the caller instead
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allow_any_origin {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins()
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
