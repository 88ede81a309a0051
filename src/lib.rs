//! REST backend for home energy management.
//!
//! Nine resource collections share one generic CRUD surface. Every record
//! outside `tariffs` belongs to a user through a chain of foreign keys, and
//! only that user's session token may read or change it.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod ownership;
pub mod state;
pub mod validation;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Build the full router over `state`.
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let mut router = Router::new()
        .route("/", get(handlers::status::root))
        .route("/health", get(handlers::status::health))
        .merge(auth_routes())
        .merge(data_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/login", post(auth::login_post))
        .route("/logout", post(auth::logout_post))
}

fn data_routes() -> Router<AppState> {
    use handlers::data;

    Router::new()
        // Plural segment lists, singular segment creates
        .route(
            "/:collection",
            get(data::collection_get).post(data::collection_post),
        )
        .route(
            "/:collection/:id",
            get(data::record_get)
                .patch(data::record_patch)
                .delete(data::record_delete),
        )
}
