//! crates/job_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of the backend's wire format; adapters
//! translate their own record types into these.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Job Applications
//=========================================================================================

/// The lifecycle stage of a job application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
    Accepted,
}

impl JobStatus {
    /// Every status, in the order the UI lists them.
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
        JobStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
            JobStatus::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`JobStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown job status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A single job-application record as stored by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct JobApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub job_title: String,
    pub status: JobStatus,
    pub applied_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The payload for creating a record. The backend assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobApplication {
    pub user_id: Uuid,
    pub company_name: String,
    pub job_title: String,
    pub status: JobStatus,
    pub applied_date: NaiveDate,
    pub notes: Option<String>,
}

/// A partial update. Only the fields that are `Some` are sent to the backend.
///
/// `notes` is doubly optional: `Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobApplicationUpdate {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<JobStatus>,
    pub applied_date: Option<NaiveDate>,
    pub notes: Option<Option<String>>,
}

impl JobApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.job_title.is_none()
            && self.status.is_none()
            && self.applied_date.is_none()
            && self.notes.is_none()
    }
}

//=========================================================================================
// Identity and Sessions
//=========================================================================================

/// The authenticated owner of a set of records.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An authenticated session issued by the backend's auth service.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// A change in authentication state, delivered asynchronously by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    /// The session carried by the event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }
}

/// What a sign-up returns. The backend may withhold the session until the
/// email address is confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_from_its_display_form() {
        for status in JobStatus::ALL {
            assert_eq!(status.to_string().parse::<JobStatus>(), Ok(status));
        }
    }

    #[test]
    fn status_parsing_is_case_sensitive() {
        assert_eq!(
            "applied".parse::<JobStatus>(),
            Err(UnknownStatus("applied".to_string()))
        );
    }

    #[test]
    fn status_serializes_as_capitalised_name() {
        let json = serde_json::to_string(&JobStatus::Interview).unwrap();
        assert_eq!(json, "\"Interview\"");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(JobApplicationUpdate::default().is_empty());
        let update = JobApplicationUpdate {
            notes: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
