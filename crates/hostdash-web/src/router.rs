//! Route table and middleware stack.

use axum::Router;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::openapi::ApiDoc;
use crate::state::SharedOrchestrator;

pub(crate) fn build_router(orchestrator: SharedOrchestrator) -> Router {
    Router::new()
        .route("/api/health", get(handlers::handle_health))
        .route("/api/status", get(handlers::handle_status))
        .route("/api/history", get(handlers::handle_history))
        .route("/api/metric/{path}", get(handlers::handle_metric))
        .route("/api/{domain}", get(handlers::handle_domain))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(get(handlers::serve_frontend))
        .with_state(orchestrator)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}
