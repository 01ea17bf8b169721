use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};
use crate::state::AppState;

pub mod auth;
pub mod media;
pub mod reviews;
pub mod users;
pub mod watchlist;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/reset", post(auth::reset))
        // Reviews
        .route("/reviews", post(reviews::create))
        .route("/reviews/:media_id/mine", get(reviews::mine))
        // Watchlist
        .route("/watchlist", post(watchlist::upsert).get(watchlist::list))
        .route("/watchlist/:kind/:media_id", delete(watchlist::remove))
        // Social graph
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/follow", post(users::follow))
        .route("/users/unfollow", post(users::unfollow))
        .route("/users/following", get(users::following))
        .route("/users/followers", get(users::followers))
        // Catalog metadata
        .route("/genres", get(media::genres))
        .route("/media/search", get(media::search))
        .route("/media/:kind/:media_id", get(media::details))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
