use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod restaurants;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, restaurant routes and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let restaurant_routes = Router::new()
        .route("/restaurants", get(restaurants::list_restaurants).post(restaurants::create_restaurant))
        .route("/restaurants/:id", get(restaurants::get_restaurant).post(restaurants::add_reservation))
        .route(
            "/restaurants/:id/:resv_id",
            get(restaurants::get_reservation)
                .delete(restaurants::delete_reservation)
                .patch(restaurants::update_reservation),
        );

    Router::new()
        .route("/health", get(health))
        .merge(restaurant_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and friends at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
