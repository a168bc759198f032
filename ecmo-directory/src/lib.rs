//! ecmo-directory library - CRUD service for the ECMO directory
//!
//! Thin JSON layer over `ecmo_common::db`: every handler validates input,
//! calls one store function and maps the result to a response.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/users", get(api::list_users).post(api::create_user))
        .route(
            "/api/users/:id",
            get(api::get_user)
                .patch(api::update_user)
                .delete(api::delete_user),
        )
        .route("/api/centers", get(api::list_centers).post(api::create_center))
        .route(
            "/api/centers/:id",
            get(api::get_center)
                .patch(api::update_center)
                .delete(api::delete_center),
        );

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
