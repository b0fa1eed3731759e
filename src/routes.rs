// src/routes.rs
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{self, AppState};

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/polls", post(handlers::create_poll))
        .route(
            "/polls/{app_id}",
            get(handlers::get_poll).delete(handlers::delete_poll),
        )
        .route("/polls/{app_id}/join", post(handlers::join_poll))
        .route("/polls/{app_id}/leave", post(handlers::leave_poll))
        .route("/polls/{app_id}/votes", post(handlers::submit_vote))
        .route("/drafts/validate", post(handlers::validate_draft));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
