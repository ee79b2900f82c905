pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);
    let upload_limit = state.settings.app.max_upload_mb * 1024 * 1024;

    // Dooray proxy routes
    let dooray_routes = Router::new()
        .route("/driveConnect", get(routes::dooray::drive_connect))
        .route("/driveDisconnect", get(routes::dooray::drive_disconnect))
        .route("/apiLoading", post(routes::dooray::api_loading))
        .route("/driveLoading", post(routes::dooray::drive_loading))
        .route("/userId", post(routes::dooray::member_name))
        .route("/downloadFile", get(routes::dooray::download_file))
        .route(
            "/uploadFile",
            post(routes::dooray::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        );

    // Recent file routes
    let recent_routes = Router::new()
        .route("/save", post(routes::recent::save))
        .route("/show", post(routes::recent::show));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api/dooray", dooray_routes)
        .nest("/recentFile", recent_routes)
        .merge(health)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
