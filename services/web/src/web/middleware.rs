//! services/web/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Rejects the request unless the session store holds a signed-in user.
///
/// On success the `User` is inserted into the request extensions for handlers to use.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = state.session.user().await.ok_or_else(|| {
        warn!("Rejected {} {}: not signed in", req.method(), req.uri().path());
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
