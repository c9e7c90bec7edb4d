//! Route definitions for the API.

use axum::{middleware, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::auth::{admin_middleware, auth_middleware};
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    let openapi = super::openapi::build_openapi();

    let auth_service = state.auth.clone();

    // Admin-only mutation surface; the registry additionally enforces
    // the system-plugin rule itself, so application plugins stay
    // togglable by regular users through the authenticated routes.
    let admin_routes = Router::new()
        .nest("/permissions", handlers::permissions::admin_router())
        .route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            admin_middleware,
        ));

    let authenticated_routes = Router::new()
        .nest("/plugins", handlers::plugins::router())
        .nest("/permissions", handlers::permissions::router())
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            auth_middleware,
        ));

    let api_v1 = Router::new()
        .merge(authenticated_routes)
        .merge(admin_routes)
        .route("/openapi.json", get(move || async move { Json(openapi) }));

    Router::new()
        .nest("/api/v1", api_v1)
        .nest("/health", handlers::health::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
