//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the inkpress server:
//! - Auth endpoints (signup/signin/signout/me)
//! - User endpoints
//! - Post endpoints
//! - Comment endpoints
//! - Health endpoint

pub mod auth;
pub mod comments;
pub mod health;
pub mod middleware;
pub mod posts;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin flag)
    let admin_routes = Router::new()
        .route("/user", get(users::list_users))
        .route("/post", post(posts::create_post))
        .route("/comment", get(comments::list_comments))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route("/user/{id}", put(users::update_user))
        .route("/user/{id}", delete(users::delete_user))
        .route("/post/{id}", put(posts::update_post))
        .route("/post/{id}", delete(posts::delete_post))
        .route("/comment", post(comments::create_comment))
        .route("/comment/{id}/like", put(comments::toggle_like))
        .route("/comment/{id}", put(comments::edit_comment))
        .route("/comment/{id}", delete(comments::delete_comment))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Comment listing is public but carries liked flags for signed-in callers
    let viewer_routes = Router::new()
        .route("/comment/post/{post_id}", get(comments::get_post_comments))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .route("/user/{id}", get(users::get_user))
        .route("/post", get(posts::list_posts))
        .route("/health", get(health::health))
        .merge(admin_routes)
        .merge(protected_routes)
        .merge(viewer_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS configuration - the SPA sends the token cookie cross-origin
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
