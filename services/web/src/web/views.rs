//! services/web/src/web/views.rs
//!
//! View models: what the front end renders, computed purely from store state.

use job_tracker_core::filter::filter_options;
use job_tracker_core::{JobApplication, JobState, JobStats, JobStatus, StatusFilter, User};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Job Cards
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct JobCardView {
    pub id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub status: String,
    /// Tailwind classes for the status badge.
    pub status_class: String,
    /// `YYYY-MM-DD`, for pre-filling the edit form.
    pub applied_date: String,
    /// e.g. `Mar 05, 2024`
    pub applied_date_display: String,
    pub notes: Option<String>,
    /// e.g. `Added Mar 05`
    pub added: String,
    /// Present only once the record has been edited.
    pub updated: Option<String>,
}

pub fn status_class(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Applied => "bg-blue-100 text-blue-800 border-blue-200",
        JobStatus::Interview => "bg-yellow-100 text-yellow-800 border-yellow-200",
        JobStatus::Offer => "bg-green-100 text-green-800 border-green-200",
        JobStatus::Rejected => "bg-red-100 text-red-800 border-red-200",
        JobStatus::Accepted => "bg-purple-100 text-purple-800 border-purple-200",
    }
}

impl From<&JobApplication> for JobCardView {
    fn from(job: &JobApplication) -> Self {
        Self {
            id: job.id,
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            status: job.status.to_string(),
            status_class: status_class(job.status).to_string(),
            applied_date: job.applied_date.format("%Y-%m-%d").to_string(),
            applied_date_display: job.applied_date.format("%b %d, %Y").to_string(),
            notes: job.notes.clone(),
            added: format!("Added {}", job.created_at.format("%b %d")),
            updated: (job.updated_at != job.created_at)
                .then(|| format!("Updated {}", job.updated_at.format("%b %d"))),
        }
    }
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatCardView {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardView {
    pub cards: Vec<StatCardView>,
    pub total: usize,
    pub success_rate: String,
}

impl DashboardView {
    pub fn render(jobs: &[JobApplication]) -> Self {
        let stats = JobStats::from_jobs(jobs);
        Self {
            cards: stats
                .cards()
                .into_iter()
                .map(|card| StatCardView {
                    title: card.title.to_string(),
                    value: card.value,
                })
                .collect(),
            total: stats.total,
            success_rate: stats.success_rate(),
        }
    }
}

//=========================================================================================
// Job List
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterOptionView {
    pub value: String,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmptyStateView {
    pub title: String,
    pub description: String,
    pub show_add_button: bool,
}

impl EmptyStateView {
    fn for_filter(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => Self {
                title: "No applications yet".to_string(),
                description: "Start tracking your job applications by adding your first one."
                    .to_string(),
                show_add_button: true,
            },
            StatusFilter::Status(status) => {
                let name = status.as_str().to_lowercase();
                Self {
                    title: format!("No {} applications", name),
                    description: format!(
                        "You don't have any applications with {} status.",
                        name
                    ),
                    show_add_button: false,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct JobListView {
    pub filter: String,
    pub sort_by: String,
    pub sort_label: String,
    pub loading: bool,
    pub filters: Vec<FilterOptionView>,
    pub jobs: Vec<JobCardView>,
    pub empty_state: Option<EmptyStateView>,
}

impl JobListView {
    pub fn render(state: &JobState) -> Self {
        let jobs: Vec<JobCardView> = state
            .jobs
            .iter()
            .filter(|job| state.filter.matches(job))
            .map(JobCardView::from)
            .collect();
        let empty_state = jobs
            .is_empty()
            .then(|| EmptyStateView::for_filter(state.filter));

        Self {
            filter: state.filter.to_string(),
            sort_by: state.sort_by.as_str().to_string(),
            sort_label: state.sort_by.label().to_string(),
            loading: state.loading,
            filters: filter_options(&state.jobs, state.filter)
                .into_iter()
                .map(|option| FilterOptionView {
                    value: option.value.to_string(),
                    label: option.label.to_string(),
                    count: option.count,
                    active: option.active,
                })
                .collect(),
            jobs,
            empty_state,
        }
    }
}

//=========================================================================================
// Session
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionView {
    pub authenticated: bool,
    pub loading: bool,
    pub user: Option<UserView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use job_tracker_core::memory::sample_job;
    use job_tracker_core::SortOrder;

    #[test]
    fn card_formats_dates_and_hides_unchanged_update() {
        let job = sample_job("Acme", JobStatus::Offer, "2024-03-05");
        let card = JobCardView::from(&job);
        assert_eq!(card.applied_date, "2024-03-05");
        assert_eq!(card.applied_date_display, "Mar 05, 2024");
        assert_eq!(card.status, "Offer");
        assert_eq!(card.status_class, "bg-green-100 text-green-800 border-green-200");
        assert!(card.added.starts_with("Added "));
        assert!(card.updated.is_none());
    }

    #[test]
    fn card_shows_update_after_edit() {
        let mut job = sample_job("Acme", JobStatus::Applied, "2024-03-05");
        job.updated_at = job.created_at + Duration::days(3);
        let card = JobCardView::from(&job);
        let expected = format!("Updated {}", job.updated_at.format("%b %d"));
        assert_eq!(card.updated.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn dashboard_has_four_cards() {
        let jobs = vec![
            sample_job("A", JobStatus::Offer, "2024-01-01"),
            sample_job("B", JobStatus::Applied, "2024-01-02"),
            sample_job("C", JobStatus::Applied, "2024-01-03"),
            sample_job("D", JobStatus::Interview, "2024-01-04"),
        ];
        let view = DashboardView::render(&jobs);
        assert_eq!(view.cards.len(), 4);
        assert_eq!(view.cards[3].value, "25.0%");
        assert_eq!(view.success_rate, "25.0");
    }

    #[test]
    fn empty_dashboard_rate_is_zero() {
        let view = DashboardView::render(&[]);
        assert_eq!(view.cards[3].value, "0%");
    }

    #[test]
    fn list_applies_filter_and_reports_empty_state() {
        let state = JobState {
            jobs: vec![sample_job("A", JobStatus::Applied, "2024-01-01")],
            loading: false,
            filter: StatusFilter::Status(JobStatus::Interview),
            sort_by: SortOrder::Asc,
        };
        let view = JobListView::render(&state);
        assert!(view.jobs.is_empty());
        assert_eq!(view.filter, "Interview");
        assert_eq!(view.sort_label, "Oldest First");
        let empty = view.empty_state.unwrap();
        assert_eq!(empty.title, "No interview applications");
        assert!(!empty.show_add_button);
        assert_eq!(view.filters[0].count, 1);
    }

    #[test]
    fn empty_list_under_all_offers_first_application() {
        let view = JobListView::render(&JobState::default());
        let empty = view.empty_state.unwrap();
        assert_eq!(empty.title, "No applications yet");
        assert!(empty.show_add_button);
        assert_eq!(view.sort_by, "desc");
    }
}
