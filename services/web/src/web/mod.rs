pub mod auth;
pub mod listener;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod views;

pub use listener::{handle_auth_event, spawn_auth_listener};
pub use middleware::require_auth;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::AppError;
use rest::ApiDoc;
use state::AppState;

/// Builds the complete application: API routes, CORS and the Swagger UI.
pub fn router(state: Arc<AppState>) -> Result<Router, AppError> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| AppError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/api/auth/signup", post(auth::signup_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/logout", post(auth::logout_handler))
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/notifications", get(rest::notifications_handler));

    // Protected routes (signed-in user required)
    let protected_routes = Router::new()
        .route("/api/dashboard", get(rest::dashboard_handler))
        .route(
            "/api/jobs",
            get(rest::list_jobs_handler).post(rest::create_job_handler),
        )
        .route("/api/jobs/form", get(rest::new_job_form_handler))
        .route(
            "/api/jobs/{id}",
            put(rest::update_job_handler).delete(rest::delete_job_handler),
        )
        .route("/api/jobs/{id}/form", get(rest::edit_job_form_handler))
        .route("/api/preferences", put(rest::update_preferences_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
