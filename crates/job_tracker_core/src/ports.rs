//! crates/job_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! stores independent of the hosted backend and of how notifications are shown.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

use crate::domain::{
    AuthEvent, JobApplication, JobApplicationUpdate, NewJobApplication, Session, SignUpOutcome,
};
use crate::filter::SortOrder;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g. HTTP, JSON).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The backend understood the request and refused it. The message is
    /// the backend's own and is fit to show to the user.
    #[error("{0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The stream of auth state changes handed out by [`AuthService::subscribe`].
pub type AuthEventStream = Pin<Box<dyn Stream<Item = AuthEvent> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// CRUD access to the job applications table.
#[async_trait]
pub trait JobRecordService: Send + Sync {
    /// Selects every record owned by `user_id`, ordered by applied date.
    async fn list_for_user(&self, user_id: Uuid, order: SortOrder)
        -> PortResult<Vec<JobApplication>>;

    /// Inserts a record and returns it as stored by the backend.
    async fn insert(&self, job: NewJobApplication) -> PortResult<JobApplication>;

    /// Patches the record with `id` and returns it as stored by the backend.
    async fn update(&self, id: Uuid, update: JobApplicationUpdate) -> PortResult<JobApplication>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;
}

/// The backend's authentication surface.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<SignUpOutcome>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<Session>;

    async fn sign_out(&self) -> PortResult<()>;

    /// Returns the session the service currently holds, if any.
    async fn get_session(&self) -> PortResult<Option<Session>>;

    /// Subscribes to auth state changes. Each call returns an independent stream.
    fn subscribe(&self) -> AuthEventStream;
}

/// Transient user-facing notifications ("toasts").
pub trait NotificationService: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}
