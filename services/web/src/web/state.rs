//! services/web/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::notifications::ToastQueue;
use job_tracker_core::{JobStore, SessionStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// The stores are process-wide: this service fronts a single user's browser.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub jobs: Arc<JobStore>,
    pub toasts: Arc<ToastQueue>,
}
