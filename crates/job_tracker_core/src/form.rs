//! crates/job_tracker_core/src/form.rs
//!
//! The add/edit form for a job application: default values, pre-filling from
//! an existing record, and field validation before anything reaches the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{JobApplication, JobApplicationUpdate, JobStatus, NewJobApplication};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobForm {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default = "default_status")]
    pub status: JobStatus,
    /// `YYYY-MM-DD`, as produced by a date input.
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub notes: String,
}

fn default_status() -> JobStatus {
    JobStatus::Applied
}

/// A single failed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All failed fields of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// The trimmed, typed contents of a form that passed validation.
struct ValidJob {
    company_name: String,
    job_title: String,
    status: JobStatus,
    applied_date: NaiveDate,
    notes: Option<String>,
}

impl JobForm {
    /// An empty form for a new record: status `Applied`, dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            company_name: String::new(),
            job_title: String::new(),
            status: JobStatus::Applied,
            applied_date: today.format(DATE_FORMAT).to_string(),
            notes: String::new(),
        }
    }

    /// A form pre-filled for editing `job`.
    pub fn from_job(job: &JobApplication) -> Self {
        Self {
            company_name: job.company_name.clone(),
            job_title: job.job_title.clone(),
            status: job.status,
            applied_date: job.applied_date.format(DATE_FORMAT).to_string(),
            notes: job.notes.clone().unwrap_or_default(),
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.check().map(|_| ())
    }

    /// Builds the insert payload for `user_id`.
    pub fn into_new(self, user_id: Uuid) -> Result<NewJobApplication, ValidationErrors> {
        let valid = self.check()?;
        Ok(NewJobApplication {
            user_id,
            company_name: valid.company_name,
            job_title: valid.job_title,
            status: valid.status,
            applied_date: valid.applied_date,
            notes: valid.notes,
        })
    }

    /// Builds a patch that overwrites every editable field.
    pub fn into_update(self) -> Result<JobApplicationUpdate, ValidationErrors> {
        let valid = self.check()?;
        Ok(JobApplicationUpdate {
            company_name: Some(valid.company_name),
            job_title: Some(valid.job_title),
            status: Some(valid.status),
            applied_date: Some(valid.applied_date),
            notes: Some(valid.notes),
        })
    }

    fn check(&self) -> Result<ValidJob, ValidationErrors> {
        let mut errors = Vec::new();

        let company_name = self.company_name.trim();
        if company_name.is_empty() {
            errors.push(FieldError {
                field: "company_name",
                message: "Company name is required".to_string(),
            });
        }

        let job_title = self.job_title.trim();
        if job_title.is_empty() {
            errors.push(FieldError {
                field: "job_title",
                message: "Job title is required".to_string(),
            });
        }

        let raw_date = self.applied_date.trim();
        // Date inputs sometimes carry a time part; only the date matters.
        let raw_date = raw_date.split('T').next().unwrap_or(raw_date);
        let applied_date = if raw_date.is_empty() {
            errors.push(FieldError {
                field: "applied_date",
                message: "Applied date is required".to_string(),
            });
            None
        } else {
            match NaiveDate::parse_from_str(raw_date, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError {
                        field: "applied_date",
                        message: format!("'{}' is not a valid date", raw_date),
                    });
                    None
                }
            }
        };

        match applied_date {
            Some(applied_date) if errors.is_empty() => {
                let notes = self.notes.trim();
                Ok(ValidJob {
                    company_name: company_name.to_string(),
                    job_title: job_title.to_string(),
                    status: self.status,
                    applied_date,
                    notes: (!notes.is_empty()).then(|| notes.to_string()),
                })
            }
            _ => Err(ValidationErrors { errors }),
        }
    }
}
