//! crates/job_tracker_core/src/filter.rs
//!
//! The filter/sort view over the cached records. Filtering is a status
//! predicate computed locally; sorting is delegated to the backend query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{JobApplication, JobStatus, UnknownStatus};

/// Which records the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Status(JobStatus),
}

impl StatusFilter {
    /// Every filter value, in the order the filter bar shows them.
    pub fn options() -> impl Iterator<Item = StatusFilter> {
        std::iter::once(StatusFilter::All).chain(JobStatus::ALL.into_iter().map(StatusFilter::Status))
    }

    pub fn matches(&self, job: &JobApplication) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(status) => job.status == *status,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Status(status) => status.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Applications",
            StatusFilter::Status(status) => status.as_str(),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Status)
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Direction of the applied-date ordering requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Asc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Asc => "Oldest First",
            SortOrder::Desc => "Newest First",
        }
    }
}

/// Returns the records matching `filter`, preserving their order.
pub fn filter_jobs(jobs: &[JobApplication], filter: StatusFilter) -> Vec<JobApplication> {
    jobs.iter().filter(|job| filter.matches(job)).cloned().collect()
}

/// Number of records matching `filter`.
pub fn count_matching(jobs: &[JobApplication], filter: StatusFilter) -> usize {
    jobs.iter().filter(|job| filter.matches(job)).count()
}

/// One button of the filter bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOption {
    pub value: StatusFilter,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

pub fn filter_options(jobs: &[JobApplication], active: StatusFilter) -> Vec<FilterOption> {
    StatusFilter::options()
        .map(|value| FilterOption {
            value,
            label: value.label(),
            count: count_matching(jobs, value),
            active: value == active,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::sample_job;

    fn jobs() -> Vec<JobApplication> {
        vec![
            sample_job("Acme", JobStatus::Applied, "2024-03-01"),
            sample_job("Globex", JobStatus::Offer, "2024-02-01"),
            sample_job("Initech", JobStatus::Applied, "2024-01-15"),
            sample_job("Umbrella", JobStatus::Rejected, "2023-12-24"),
        ]
    }

    #[test]
    fn all_returns_every_record_in_order() {
        let jobs = jobs();
        assert_eq!(filter_jobs(&jobs, StatusFilter::All), jobs);
    }

    #[test]
    fn status_filter_returns_exact_subset() {
        let jobs = jobs();
        let applied = filter_jobs(&jobs, StatusFilter::Status(JobStatus::Applied));
        let names: Vec<_> = applied.iter().map(|j| j.company_name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Initech"]);
        assert!(applied.iter().all(|j| j.status == JobStatus::Applied));
    }

    #[test]
    fn status_filter_with_no_matches_is_empty() {
        let jobs = jobs();
        assert!(filter_jobs(&jobs, StatusFilter::Status(JobStatus::Accepted)).is_empty());
    }

    #[test]
    fn filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Interview".parse::<StatusFilter>(),
            Ok(StatusFilter::Status(JobStatus::Interview))
        );
        assert!("pending".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn filter_round_trips_through_json() {
        let json = serde_json::to_string(&StatusFilter::Status(JobStatus::Offer)).unwrap();
        assert_eq!(json, "\"Offer\"");
        let back: StatusFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, StatusFilter::All);
    }

    #[test]
    fn options_carry_counts_and_active_flag() {
        let jobs = jobs();
        let options = filter_options(&jobs, StatusFilter::Status(JobStatus::Applied));
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].label, "All Applications");
        assert_eq!(options[0].count, 4);
        assert!(!options[0].active);
        assert_eq!(options[1].value, StatusFilter::Status(JobStatus::Applied));
        assert_eq!(options[1].count, 2);
        assert!(options[1].active);
        assert_eq!(options[5].count, 0);
    }

    #[test]
    fn sort_order_defaults_to_newest_first() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert!(!SortOrder::default().is_ascending());
        let parsed: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(parsed, SortOrder::Asc);
    }
}
