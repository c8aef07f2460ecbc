//! crates/job_tracker_core/src/memory.rs
//!
//! In-memory implementations of the ports, for tests and offline runs.
//! They behave like the hosted backend closely enough for the stores:
//! ids and timestamps are assigned on write, and failures can be injected.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    AuthEvent, JobApplication, JobApplicationUpdate, JobStatus, NewJobApplication, Session,
    SignUpOutcome, User,
};
use crate::events::AuthEventBus;
use crate::filter::SortOrder;
use crate::ports::{
    AuthEventStream, AuthService, JobRecordService, NotificationService, PortError, PortResult,
};

//=========================================================================================
// Job Records
//=========================================================================================

/// A table of job applications held in memory.
#[derive(Default)]
pub struct MemoryJobRepository {
    rows: Mutex<Vec<JobApplication>>,
    failing: AtomicBool,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<JobApplication>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing: AtomicBool::new(false),
        }
    }

    /// While set, every call fails with `PortError::Unexpected`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn rows(&self) -> Vec<JobApplication> {
        self.rows.lock().await.clone()
    }

    fn check_available(&self) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("backend unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobRecordService for MemoryJobRepository {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        order: SortOrder,
    ) -> PortResult<Vec<JobApplication>> {
        self.check_available()?;
        let mut jobs: Vec<JobApplication> = self
            .rows
            .lock()
            .await
            .iter()
            .filter(|job| job.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|job| job.applied_date);
        if !order.is_ascending() {
            jobs.reverse();
        }
        Ok(jobs)
    }

    async fn insert(&self, job: NewJobApplication) -> PortResult<JobApplication> {
        self.check_available()?;
        let now = Utc::now();
        let stored = JobApplication {
            id: Uuid::new_v4(),
            user_id: job.user_id,
            company_name: job.company_name,
            job_title: job.job_title,
            status: job.status,
            applied_date: job.applied_date,
            notes: job.notes,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, update: JobApplicationUpdate) -> PortResult<JobApplication> {
        self.check_available()?;
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Job application {} not found", id)))?;

        if let Some(company_name) = update.company_name {
            row.company_name = company_name;
        }
        if let Some(job_title) = update.job_title {
            row.job_title = job_title;
        }
        if let Some(status) = update.status {
            row.status = status;
        }
        if let Some(applied_date) = update.applied_date {
            row.applied_date = applied_date;
        }
        if let Some(notes) = update.notes {
            row.notes = notes;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        self.check_available()?;
        // Deleting a missing row is not an error, matching a filtered DELETE.
        self.rows.lock().await.retain(|job| job.id != id);
        Ok(())
    }
}

//=========================================================================================
// Auth
//=========================================================================================

struct Account {
    user: User,
    password: String,
}

/// An auth service with accounts held in memory. Tokens are random UUIDs.
#[derive(Default)]
pub struct MemoryAuthService {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Session>>,
    events: AuthEventBus,
    failing: AtomicBool,
}

impl MemoryAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Issues a fresh token pair for the signed-in user and publishes `TokenRefreshed`.
    pub async fn rotate_tokens(&self) -> PortResult<Session> {
        let mut current = self.current.lock().await;
        let session = current.as_ref().ok_or(PortError::Unauthorized)?;
        let rotated = issue_session(session.user.clone());
        *current = Some(rotated.clone());
        self.events.publish(AuthEvent::TokenRefreshed(rotated.clone()));
        Ok(rotated)
    }

    fn check_available(&self) -> PortResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("auth service unavailable".to_string()));
        }
        Ok(())
    }
}

fn issue_session(user: User) -> Session {
    Session {
        user,
        access_token: Uuid::new_v4().to_string(),
        refresh_token: Uuid::new_v4().to_string(),
        expires_at: Utc::now() + chrono::Duration::hours(1),
    }
}

#[async_trait]
impl AuthService for MemoryAuthService {
    async fn sign_up(&self, email: &str, password: &str) -> PortResult<SignUpOutcome> {
        self.check_available()?;
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(PortError::Rejected("User already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        let session = issue_session(user.clone());
        *self.current.lock().await = Some(session.clone());
        self.events.publish(AuthEvent::SignedIn(session.clone()));
        Ok(SignUpOutcome {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<Session> {
        self.check_available()?;
        let user = {
            let accounts = self.accounts.lock().await;
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(PortError::Rejected("Invalid login credentials".to_string())),
            }
        };
        let session = issue_session(user);
        *self.current.lock().await = Some(session.clone());
        self.events.publish(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> PortResult<()> {
        self.check_available()?;
        *self.current.lock().await = None;
        self.events.publish(AuthEvent::SignedOut);
        Ok(())
    }

    async fn get_session(&self) -> PortResult<Option<Session>> {
        self.check_available()?;
        Ok(self.current.lock().await.clone())
    }

    fn subscribe(&self) -> AuthEventStream {
        self.events.subscribe()
    }
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Remembers every notification, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: StdMutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<(NoticeKind, String)> {
        self.notices().pop()
    }

    fn push(&self, kind: NoticeKind, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((kind, message.to_string()));
    }
}

impl NotificationService for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(NoticeKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(NoticeKind::Error, message);
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

/// A stored record with the given company, status and `YYYY-MM-DD` date.
///
/// # Panics
/// If `applied_date` is not a valid date.
pub fn sample_job(company_name: &str, status: JobStatus, applied_date: &str) -> JobApplication {
    let created_at = Utc::now();
    JobApplication {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        company_name: company_name.to_string(),
        job_title: "Software Engineer".to_string(),
        status,
        applied_date: NaiveDate::parse_from_str(applied_date, "%Y-%m-%d")
            .expect("sample_job needs a YYYY-MM-DD date"),
        notes: None,
        created_at,
        updated_at: created_at,
    }
}
