//! services/web/src/bin/web.rs

use job_tracker_core::{AuthService, JobStore, SessionStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_lib::{
    adapters::{GoTrueAuthAdapter, PostgrestJobAdapter, SupabaseClient},
    config::Config,
    error::AppError,
    notifications::ToastQueue,
    web::{router, spawn_auth_listener, state::AppState},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder().build()?;
    let supabase = Arc::new(SupabaseClient::new(
        http,
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let auth_adapter = Arc::new(GoTrueAuthAdapter::new(supabase.clone()));
    let job_adapter = Arc::new(PostgrestJobAdapter::new(
        supabase.clone(),
        config.jobs_table.clone(),
    ));
    let toasts = Arc::new(ToastQueue::new(config.toast_capacity));

    // --- 3. Build the Stores & Shared AppState ---
    let session = Arc::new(SessionStore::new(auth_adapter.clone(), toasts.clone()));
    let jobs = Arc::new(JobStore::new(job_adapter, toasts.clone()));
    let app_state = Arc::new(AppState {
        config: config.clone(),
        session: session.clone(),
        jobs: jobs.clone(),
        toasts,
    });

    // --- 4. Start Background Tasks ---
    // Subscribe before init so no event published during init is missed.
    let cancel = CancellationToken::new();
    let events = auth_adapter.subscribe();
    session.init().await;
    if let Some(user) = session.user().await {
        jobs.fetch_jobs(user.id).await;
    }
    let listener_task = spawn_auth_listener(app_state.clone(), events, cancel.clone());
    let refresh_task = tokio::spawn(auth_adapter.clone().run_refresh_loop(cancel.clone()));

    // --- 5. Create the Web Router ---
    let app = router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped. Shutting down background tasks...");
    cancel.cancel();
    listener_task
        .await
        .map_err(|e| AppError::Internal(format!("Auth listener failed: {}", e)))?;
    refresh_task
        .await
        .map_err(|e| AppError::Internal(format!("Token refresh task failed: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {}", e);
    }
}
