//! HTTP server and routes.

mod access;
mod handlers;
mod state;

pub use state::AppState;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// Every path is served by one GET handler. The allow-list sits in front of
/// the routes, so any method from another address gets 403.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::serve))
        .route("/{*path}", get(handlers::serve))
        .layer(middleware::from_fn_with_state(state.clone(), access::ip_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
