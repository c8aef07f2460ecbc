//! services/web/src/web/auth.rs
//!
//! Authentication endpoints for sign-up, sign-in, sign-out and the current session.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use job_tracker_core::{PortError, Session};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::rest::{error_response, HandlerError};
use crate::web::state::AppState;
use crate::web::views::{SessionView, UserView};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: Option<UserView>,
    /// False when sign-up succeeded but the account still needs email confirmation.
    pub signed_in: bool,
}

impl AuthResponse {
    fn signed_in(session: &Session) -> Self {
        Self {
            user: Some(UserView::from(&session.user)),
            signed_in: true,
        }
    }
}

fn auth_failure(e: PortError, rejected: StatusCode) -> HandlerError {
    match e {
        PortError::Rejected(message) => error_response(rejected, message),
        PortError::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Not authorized"),
        other => error_response(StatusCode::BAD_GATEWAY, other.to_string()),
    }
}

fn require_credentials(req: &Credentials) -> Result<(), HandlerError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Email and password are required",
        ));
    }
    Ok(())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Rejected by the auth service"),
        (status = 502, description = "Auth service unavailable")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Credentials>,
) -> Result<impl IntoResponse, HandlerError> {
    require_credentials(&req)?;
    let outcome = state
        .session
        .sign_up(req.email.trim(), &req.password)
        .await
        .map_err(|e| auth_failure(e, StatusCode::BAD_REQUEST))?;

    let response = match outcome.session {
        Some(session) => {
            state.session.set_auth(session.clone()).await;
            AuthResponse::signed_in(&session)
        }
        None => AuthResponse {
            user: outcome.user.as_ref().map(UserView::from),
            signed_in: false,
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Auth service unavailable")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>, HandlerError> {
    require_credentials(&req)?;
    let session = state
        .session
        .sign_in(req.email.trim(), &req.password)
        .await
        .map_err(|e| auth_failure(e, StatusCode::UNAUTHORIZED))?;

    // The subscription delivers the same session; setting it here means the
    // very next request already sees it.
    state.session.set_auth(session.clone()).await;
    Ok(Json(AuthResponse::signed_in(&session)))
}

/// POST /api/auth/logout - Sign out and drop the cached records
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 502, description = "Auth service unavailable")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HandlerError> {
    state.session.sign_out().await.map_err(|e| {
        error!("Failed to sign out: {:?}", e);
        auth_failure(e, StatusCode::BAD_REQUEST)
    })?;

    state.session.clear_auth().await;
    state.jobs.clear().await;
    info!("Session cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me - The current session, if any
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session state", body = SessionView)
    )
)]
pub async fn me_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let user = state.session.user().await;
    Json(SessionView {
        authenticated: user.is_some(),
        loading: state.session.is_loading().await,
        user: user.as_ref().map(UserView::from),
    })
}
