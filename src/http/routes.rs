//! Route configuration.

use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::auth::middleware::session_middleware;
use crate::http::handlers;
use crate::http::state::AppState;
use crate::socket::ws_handler;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Authentication
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-out", delete(handlers::sign_out))
        .route("/auth/me", get(handlers::me))
        // Profiles
        .route("/profiles", get(handlers::list_profiles))
        .route("/profiles/{uuid}", patch(handlers::update_profile))
        .route(
            "/profiles/{uuid}/linkedin",
            patch(handlers::update_linkedin_profile),
        )
        .route(
            "/profiles/{uuid}/github",
            patch(handlers::update_github_profile),
        )
        // Skills
        .route(
            "/skills",
            get(handlers::list_skills).post(handlers::create_skill),
        )
        .route("/skills/{slug}", delete(handlers::delete_skill))
        .route("/contact-messages", post(handlers::create_contact_message))
        .route("/ws", get(ws_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}
