pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::handlers::fallback::route_not_found;
use crate::middleware::rate_limit::{self, RateLimiter};
use crate::middleware::security_headers::security_headers;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ReWaste API",
        version = "1.0.0",
        description = "Handicraft tutorials and activity records with photos"
    ),
    tags(
        (name = "Handicrafts", description = "Craft tutorials with steps, tags and a photo"),
        (name = "Kegiatan", description = "Activity records with a photo"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let server = state.config.server.clone();
    let development = state.config.mode.is_development();
    let limiter = Arc::new(RateLimiter::new(&server.rate_limit));

    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let router = api_router
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .method_not_allowed_fallback(route_not_found);

    let router = match server.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(route_not_found.into_service()),
        ),
        None => router.fallback(route_not_found),
    };

    // Outside the fallback so unmatched `/api` paths are counted too.
    let router = router
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::enforce,
        ))
        .layer(axum::middleware::from_fn(security_headers))
        .layer(cors_layer(&server.cors));

    if development {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allow_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .inspect_err(|_| tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(cors.max_age))
}
