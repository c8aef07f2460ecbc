//! services/web/src/adapters/postgrest.rs
//!
//! This module contains the record adapter, which is the concrete implementation
//! of the `JobRecordService` port from the `core` crate. It talks to the
//! job applications table through Supabase's PostgREST endpoint.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use job_tracker_core::domain::{
    JobApplication, JobApplicationUpdate, JobStatus, NewJobApplication,
};
use job_tracker_core::filter::SortOrder;
use job_tracker_core::ports::{JobRecordService, PortError, PortResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::supabase::{check, transport_error, SupabaseClient};

/// Asks PostgREST for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A record adapter that implements the `JobRecordService` port.
#[derive(Clone)]
pub struct PostgrestJobAdapter {
    client: Arc<SupabaseClient>,
    table: String,
}

impl PostgrestJobAdapter {
    /// Creates a new `PostgrestJobAdapter` for `table`.
    pub fn new(client: Arc<SupabaseClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    fn url(&self) -> String {
        self.client.rest_url(&self.table)
    }
}

/// Headers for writes that should answer with the stored row.
fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers.insert(ACCEPT, HeaderValue::from_static(SINGLE_OBJECT));
    headers
}

/// The query string for listing one user's records.
fn list_query(user_id: Uuid, order: SortOrder) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{}", user_id)),
        ("order", format!("applied_date.{}", order.as_str())),
    ]
}

fn id_query(id: Uuid) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct JobApplicationRecord {
    id: Uuid,
    user_id: Uuid,
    company_name: String,
    job_title: String,
    status: JobStatus,
    applied_date: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl JobApplicationRecord {
    fn to_domain(self) -> PortResult<JobApplication> {
        // The column may be a date or a timestamp; keep the date part.
        let date_part = self.applied_date.get(..10).unwrap_or(&self.applied_date);
        let applied_date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
            PortError::Unexpected(format!(
                "Invalid applied_date '{}' on record {}: {}",
                self.applied_date, self.id, e
            ))
        })?;
        Ok(JobApplication {
            id: self.id,
            user_id: self.user_id,
            company_name: self.company_name,
            job_title: self.job_title,
            status: self.status,
            applied_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize)]
struct InsertRecord<'a> {
    user_id: Uuid,
    company_name: &'a str,
    job_title: &'a str,
    status: JobStatus,
    applied_date: NaiveDate,
    notes: Option<&'a str>,
}
impl<'a> InsertRecord<'a> {
    fn from_domain(job: &'a NewJobApplication) -> Self {
        Self {
            user_id: job.user_id,
            company_name: &job.company_name,
            job_title: &job.job_title,
            status: job.status,
            applied_date: job.applied_date,
            notes: job.notes.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct UpdateRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied_date: Option<NaiveDate>,
    /// `Some(None)` is sent as `null` and clears the column.
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Option<String>>,
    updated_at: DateTime<Utc>,
}
impl UpdateRecord {
    fn from_domain(update: JobApplicationUpdate, now: DateTime<Utc>) -> Self {
        Self {
            company_name: update.company_name,
            job_title: update.job_title,
            status: update.status,
            applied_date: update.applied_date,
            notes: update.notes,
            updated_at: now,
        }
    }
}

//=========================================================================================
// `JobRecordService` Trait Implementation
//=========================================================================================

#[async_trait]
impl JobRecordService for PostgrestJobAdapter {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        order: SortOrder,
    ) -> PortResult<Vec<JobApplication>> {
        let request = self
            .client
            .http()
            .get(self.url())
            .query(&list_query(user_id, order));
        let response = self
            .client
            .authorize(request)
            .await
            .send()
            .await
            .map_err(transport_error)?;

        let records: Vec<JobApplicationRecord> = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn insert(&self, job: NewJobApplication) -> PortResult<JobApplication> {
        let request = self
            .client
            .http()
            .post(self.url())
            .headers(representation_headers())
            .json(&InsertRecord::from_domain(&job));
        let response = self
            .client
            .authorize(request)
            .await
            .send()
            .await
            .map_err(transport_error)?;

        let record: JobApplicationRecord = check(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        record.to_domain()
    }

    async fn update(&self, id: Uuid, update: JobApplicationUpdate) -> PortResult<JobApplication> {
        let request = self
            .client
            .http()
            .patch(self.url())
            .query(&id_query(id))
            .headers(representation_headers())
            .json(&UpdateRecord::from_domain(update, Utc::now()));
        let response = self
            .client
            .authorize(request)
            .await
            .send()
            .await
            .map_err(transport_error)?;

        let record: JobApplicationRecord = check(response)
            .await
            .map_err(|e| match e {
                PortError::NotFound(_) => {
                    PortError::NotFound(format!("Job application {} not found", id))
                }
                other => other,
            })?
            .json()
            .await
            .map_err(transport_error)?;
        record.to_domain()
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let request = self.client.http().delete(self.url()).query(&id_query(id));
        let response = self
            .client
            .authorize(request)
            .await
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await?;
        Ok(())
    }
}
