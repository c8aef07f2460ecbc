//! services/web/src/web/listener.rs
//!
//! The background task that consumes the auth subscription and keeps the
//! session and job stores in step with it.

use futures::StreamExt;
use job_tracker_core::{AuthEvent, AuthEventStream};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::web::state::AppState;

/// Applies one auth event: the session store always mirrors it; a sign-in
/// loads the user's records and a sign-out drops them.
pub async fn handle_auth_event(state: &AppState, event: AuthEvent) {
    let signed_in = match &event {
        AuthEvent::SignedIn(session) => Some(session.user.id),
        _ => None,
    };
    let signed_out = matches!(event, AuthEvent::SignedOut);

    state.session.handle_event(event).await;

    if let Some(user_id) = signed_in {
        state.jobs.fetch_jobs(user_id).await;
    } else if signed_out {
        state.jobs.clear().await;
    }
}

/// Spawns the listener. It runs until the stream ends or `cancel` fires.
pub fn spawn_auth_listener(
    state: Arc<AppState>,
    mut events: AuthEventStream,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Auth listener started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                next = events.next() => match next {
                    Some(event) => handle_auth_event(&state, event).await,
                    None => break,
                },
            }
        }
        info!("Auth listener stopped");
    })
}
