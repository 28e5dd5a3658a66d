//! Derived figures for the dashboard and analytics views. Everything here is
//! a pure function of the loaded collections and is recomputed on every render.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Interview, InterviewStatus, Job, JobStatus};

pub const UNKNOWN_JOB: &str = "Unknown job";
pub const RECENT_LIMIT: usize = 5;

/// `part / whole` as a whole-number percentage; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub status: JobStatus,
    pub label: &'static str,
    pub count: usize,
    pub percentage: u8,
}

/// One bucket per status present, in lifecycle order. Each percentage is
/// rounded on its own, so the total can drift from 100.
pub fn status_distribution(jobs: &[Job]) -> Vec<StatusBucket> {
    let mut counts: BTreeMap<JobStatus, usize> = BTreeMap::new();
    for job in jobs {
        *counts.entry(job.status).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusBucket {
            status,
            label: status.label(),
            count,
            percentage: percent(count, jobs.len()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub count: usize,
}

/// Applications per calendar month of the applied date, oldest first.
pub fn monthly_applications(jobs: &[Job]) -> Vec<MonthlyCount> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for job in jobs {
        let key = (job.applied_date.year(), job.applied_date.month());
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((year, month), count)| MonthlyCount {
            year,
            month,
            label: month_label(year, month),
            count,
        })
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", year, month))
}

fn count_where(jobs: &[Job], pred: impl Fn(JobStatus) -> bool) -> usize {
    jobs.iter().filter(|j| pred(j.status)).count()
}

pub fn response_rate(jobs: &[Job]) -> u8 {
    percent(count_where(jobs, JobStatus::is_response), jobs.len())
}

pub fn interview_rate(jobs: &[Job]) -> u8 {
    percent(count_where(jobs, JobStatus::is_interviewing), jobs.len())
}

/// Offers out of jobs that reached an interview. Offers sit in both the
/// numerator and the interview set.
pub fn offer_rate(jobs: &[Job]) -> u8 {
    let offers = count_where(jobs, |s| s == JobStatus::Offer);
    percent(offers, count_where(jobs, JobStatus::is_interviewing))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total: usize,
    pub active: usize,
    /// Scheduled interviews, regardless of date.
    pub interviews: usize,
    pub offers: usize,
    pub rejections: usize,
    pub response_rate: u8,
}

pub fn dashboard_summary(jobs: &[Job], interviews: &[Interview]) -> DashboardSummary {
    DashboardSummary {
        total: jobs.len(),
        active: count_where(jobs, JobStatus::is_active),
        interviews: interviews
            .iter()
            .filter(|i| i.status == InterviewStatus::Scheduled)
            .count(),
        offers: count_where(jobs, |s| s == JobStatus::Offer),
        rejections: count_where(jobs, |s| s == JobStatus::Rejected),
        response_rate: response_rate(jobs),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_applications: usize,
    pub status_distribution: Vec<StatusBucket>,
    pub monthly_applications: Vec<MonthlyCount>,
    pub response_rate: u8,
    pub interview_rate: u8,
    pub offer_rate: u8,
    pub interviews: usize,
    pub offers: usize,
    pub rejections: usize,
}

pub fn analytics(jobs: &[Job]) -> Analytics {
    Analytics {
        total_applications: jobs.len(),
        status_distribution: status_distribution(jobs),
        monthly_applications: monthly_applications(jobs),
        response_rate: response_rate(jobs),
        interview_rate: interview_rate(jobs),
        offer_rate: offer_rate(jobs),
        interviews: count_where(jobs, JobStatus::is_interviewing),
        offers: count_where(jobs, |s| s == JobStatus::Offer),
        rejections: count_where(jobs, |s| s == JobStatus::Rejected),
    }
}

/// Scheduled interviews on or after `today`, soonest first.
pub fn upcoming_interviews(interviews: &[Interview], today: NaiveDate) -> Vec<Interview> {
    let mut upcoming: Vec<Interview> = interviews
        .iter()
        .filter(|i| i.status == InterviewStatus::Scheduled && i.date >= today)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
    upcoming
}

/// Most recently touched jobs first.
pub fn recent_jobs(jobs: &[Job], limit: usize) -> Vec<Job> {
    let mut recent = jobs.to_vec();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(limit);
    recent
}

/// Display name for an interview's job; dangling references get a placeholder.
pub fn job_label(jobs: &[Job], job_id: &str) -> String {
    jobs.iter()
        .find(|j| j.id == job_id)
        .map(|j| format!("{} at {}", j.position, j.company))
        .unwrap_or_else(|| UNKNOWN_JOB.to_string())
}
