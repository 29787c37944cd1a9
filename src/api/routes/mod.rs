pub mod agent;
pub mod conversations;
pub mod documents;
pub mod health;

use axum::http::{header, HeaderName, Method};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::{api_key_auth, request_logger};
use crate::api::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            post(documents::create_document).get(documents::list_documents),
        )
        .route(
            "/documents/upload",
            post(documents::upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/documents/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/documents/search", post(documents::search_documents))
        .route("/conversations", post(conversations::create_conversation))
        .route(
            "/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::reset_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(conversations::send_message),
        )
        .route("/agent/chat", post(agent::agent_chat))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth))
}
