//! crates/job_tracker_core/src/store.rs
//!
//! The record store: the in-memory cache of the signed-in user's job
//! applications plus the UI's filter and sort preferences.
//!
//! Every mutating operation follows the same policy. The backend is called
//! first; only a successful response touches the cache. A failure is logged,
//! reported through the notification port, and leaves the cache as it was.
//! Nothing is retried and no error reaches the caller.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{JobApplication, JobApplicationUpdate, NewJobApplication};
use crate::filter::{filter_jobs, SortOrder, StatusFilter};
use crate::ports::{JobRecordService, NotificationService};

/// A point-in-time copy of the store's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobState {
    pub jobs: Vec<JobApplication>,
    pub loading: bool,
    pub filter: StatusFilter,
    pub sort_by: SortOrder,
}

pub struct JobStore {
    records: Arc<dyn JobRecordService>,
    notifier: Arc<dyn NotificationService>,
    state: RwLock<JobState>,
}

impl JobStore {
    pub fn new(records: Arc<dyn JobRecordService>, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            records,
            notifier,
            state: RwLock::new(JobState::default()),
        }
    }

    //-------------------------------------------------------------------------------------
    // Backend-backed operations
    //-------------------------------------------------------------------------------------

    /// Replaces the cache with the user's records, ordered by the current sort preference.
    pub async fn fetch_jobs(&self, user_id: Uuid) {
        let order = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.sort_by
        };

        let result = self.records.list_for_user(user_id, order).await;

        let mut state = self.state.write().await;
        match result {
            Ok(jobs) => {
                info!("Fetched {} job applications for user {}", jobs.len(), user_id);
                state.jobs = jobs;
            }
            Err(e) => {
                error!("Failed to fetch jobs for user {}: {:?}", user_id, e);
                self.notifier.error("Failed to fetch jobs");
            }
        }
        state.loading = false;
    }

    /// Creates a record and puts the stored copy at the front of the cache.
    pub async fn add_job(&self, job: NewJobApplication) -> Option<JobApplication> {
        match self.records.insert(job).await {
            Ok(created) => {
                self.state.write().await.jobs.insert(0, created.clone());
                self.notifier.success("Job application added successfully!");
                Some(created)
            }
            Err(e) => {
                error!("Failed to add job application: {:?}", e);
                self.notifier.error("Failed to add job application");
                None
            }
        }
    }

    /// Updates a record and swaps the stored copy into the cache.
    pub async fn update_job(&self, id: Uuid, update: JobApplicationUpdate) -> Option<JobApplication> {
        match self.records.update(id, update).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                for job in state.jobs.iter_mut().filter(|job| job.id == id) {
                    *job = updated.clone();
                }
                drop(state);
                self.notifier.success("Job application updated successfully!");
                Some(updated)
            }
            Err(e) => {
                error!("Failed to update job application {}: {:?}", id, e);
                self.notifier.error("Failed to update job application");
                None
            }
        }
    }

    /// Deletes a record and drops it from the cache. Returns whether the backend accepted.
    pub async fn delete_job(&self, id: Uuid) -> bool {
        match self.records.delete(id).await {
            Ok(()) => {
                self.state.write().await.jobs.retain(|job| job.id != id);
                self.notifier.success("Job application deleted successfully!");
                true
            }
            Err(e) => {
                error!("Failed to delete job application {}: {:?}", id, e);
                self.notifier.error("Failed to delete job application");
                false
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Local state
    //-------------------------------------------------------------------------------------

    pub async fn set_jobs(&self, jobs: Vec<JobApplication>) {
        self.state.write().await.jobs = jobs;
    }

    pub async fn set_filter(&self, filter: StatusFilter) {
        self.state.write().await.filter = filter;
    }

    /// Changes the sort preference. Callers re-fetch to apply it.
    pub async fn set_sort_by(&self, sort_by: SortOrder) {
        self.state.write().await.sort_by = sort_by;
    }

    /// Forgets every cached record, keeping the preferences.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.jobs.clear();
        state.loading = false;
    }

    pub async fn jobs(&self) -> Vec<JobApplication> {
        self.state.read().await.jobs.clone()
    }

    /// The cached records passing the current filter.
    pub async fn filtered_jobs(&self) -> Vec<JobApplication> {
        let state = self.state.read().await;
        filter_jobs(&state.jobs, state.filter)
    }

    pub async fn get(&self, id: Uuid) -> Option<JobApplication> {
        self.state.read().await.jobs.iter().find(|job| job.id == id).cloned()
    }

    pub async fn filter(&self) -> StatusFilter {
        self.state.read().await.filter
    }

    pub async fn sort_by(&self) -> SortOrder {
        self.state.read().await.sort_by
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn snapshot(&self) -> JobState {
        self.state.read().await.clone()
    }
}
