//! crates/job_tracker_core/src/stats.rs
//!
//! Aggregate statistics derived from the cached records.

use serde::Serialize;

use crate::domain::{JobApplication, JobStatus};

/// Counts by status over a list of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: usize,
    pub applied: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    pub accepted: usize,
}

impl JobStats {
    pub fn from_jobs(jobs: &[JobApplication]) -> Self {
        jobs.iter().fold(
            JobStats {
                total: jobs.len(),
                ..Default::default()
            },
            |mut stats, job| {
                match job.status {
                    JobStatus::Applied => stats.applied += 1,
                    JobStatus::Interview => stats.interviews += 1,
                    JobStatus::Offer => stats.offers += 1,
                    JobStatus::Rejected => stats.rejected += 1,
                    JobStatus::Accepted => stats.accepted += 1,
                }
                stats
            },
        )
    }

    pub fn count(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Applied => self.applied,
            JobStatus::Interview => self.interviews,
            JobStatus::Offer => self.offers,
            JobStatus::Rejected => self.rejected,
            JobStatus::Accepted => self.accepted,
        }
    }

    /// Share of records that reached an offer or were accepted, as a percentage
    /// with one decimal place. An empty list yields `"0"`.
    pub fn success_rate(&self) -> String {
        if self.total == 0 {
            return "0".to_string();
        }
        let rate = (self.offers + self.accepted) as f64 / self.total as f64 * 100.0;
        // Ties round up, as a browser's toFixed(1) does; `{:.1}` alone rounds them to even.
        format!("{:.1}", (rate * 10.0).round() / 10.0)
    }

    /// The four cards shown at the top of the dashboard.
    pub fn cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "Total Applications",
                value: self.total.to_string(),
            },
            StatCard {
                title: "Pending Applications",
                value: self.applied.to_string(),
            },
            StatCard {
                title: "Interviews Scheduled",
                value: self.interviews.to_string(),
            },
            StatCard {
                title: "Success Rate",
                value: format!("{}%", self.success_rate()),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// Shorthand for `JobStats::from_jobs(jobs).success_rate()`.
pub fn success_rate(jobs: &[JobApplication]) -> String {
    JobStats::from_jobs(jobs).success_rate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::sample_job;

    #[test]
    fn empty_list_has_zero_rate() {
        let stats = JobStats::from_jobs(&[]);
        assert_eq!(stats, JobStats::default());
        assert_eq!(stats.success_rate(), "0");
    }

    #[test]
    fn one_offer_of_four_is_twenty_five_percent() {
        let jobs = vec![
            sample_job("A", JobStatus::Offer, "2024-01-01"),
            sample_job("B", JobStatus::Applied, "2024-01-02"),
            sample_job("C", JobStatus::Rejected, "2024-01-03"),
            sample_job("D", JobStatus::Interview, "2024-01-04"),
        ];
        assert_eq!(success_rate(&jobs), "25.0");
    }

    #[test]
    fn exact_ties_round_half_up() {
        let mut jobs = vec![sample_job("A", JobStatus::Offer, "2024-01-01")];
        jobs.extend((0..15).map(|_| sample_job("B", JobStatus::Applied, "2024-01-02")));
        // 1 / 16 = 6.25
        assert_eq!(success_rate(&jobs), "6.3");

        let mut jobs: Vec<_> = (0..5)
            .map(|_| sample_job("C", JobStatus::Accepted, "2024-01-03"))
            .collect();
        jobs.extend((0..11).map(|_| sample_job("D", JobStatus::Rejected, "2024-01-04")));
        // 5 / 16 = 31.25
        assert_eq!(success_rate(&jobs), "31.3");
    }

    #[test]
    fn accepted_counts_towards_success() {
        let jobs = vec![
            sample_job("A", JobStatus::Offer, "2024-01-01"),
            sample_job("B", JobStatus::Accepted, "2024-01-02"),
            sample_job("C", JobStatus::Rejected, "2024-01-03"),
        ];
        // 2 / 3 = 66.666...
        assert_eq!(success_rate(&jobs), "66.7");
    }

    #[test]
    fn counts_by_status() {
        let jobs = vec![
            sample_job("A", JobStatus::Applied, "2024-01-01"),
            sample_job("B", JobStatus::Applied, "2024-01-02"),
            sample_job("C", JobStatus::Interview, "2024-01-03"),
            sample_job("D", JobStatus::Accepted, "2024-01-04"),
        ];
        let stats = JobStats::from_jobs(&jobs);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(JobStatus::Applied), 2);
        assert_eq!(stats.count(JobStatus::Interview), 1);
        assert_eq!(stats.count(JobStatus::Offer), 0);
        assert_eq!(stats.count(JobStatus::Accepted), 1);
    }

    #[test]
    fn cards_render_counts_and_rate() {
        let jobs = vec![
            sample_job("A", JobStatus::Applied, "2024-01-01"),
            sample_job("B", JobStatus::Offer, "2024-01-02"),
        ];
        let cards = JobStats::from_jobs(&jobs).cards();
        let rendered: Vec<_> = cards.iter().map(|c| (c.title, c.value.as_str())).collect();
        assert_eq!(
            rendered,
            vec![
                ("Total Applications", "2"),
                ("Pending Applications", "1"),
                ("Interviews Scheduled", "0"),
                ("Success Rate", "50.0%"),
            ]
        );
    }
}
