//! In-progress form state. Every field is optional until submit, when the
//! draft is checked and turned into a finished record with defaults filled in.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::DraftError;
use crate::ids::generate_id;
use crate::models::{
    Company, Interview, InterviewStatus, InterviewType, Job, JobStatus, parse_time,
};

pub fn parse_date(raw: &str) -> Result<NaiveDate, DraftError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DraftError::InvalidDate(raw.to_string()))
}

pub fn parse_clock(raw: &str) -> Result<NaiveTime, DraftError> {
    parse_time(raw).ok_or_else(|| DraftError::InvalidTime(raw.to_string()))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, DraftError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(DraftError::MissingField(field))
}

/// Blank strings mean "not set".
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDraft {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub status: Option<JobStatus>,
    pub applied_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
}

impl JobDraft {
    /// Fields set in `patch` win; `Some("")` clears an optional field.
    pub fn overlay(self, patch: JobDraft) -> JobDraft {
        JobDraft {
            company: patch.company.or(self.company),
            position: patch.position.or(self.position),
            location: patch.location.or(self.location),
            salary: patch.salary.or(self.salary),
            status: patch.status.or(self.status),
            applied_date: patch.applied_date.or(self.applied_date),
            description: patch.description.or(self.description),
            notes: patch.notes.or(self.notes),
            url: patch.url.or(self.url),
            contact_person: patch.contact_person.or(self.contact_person),
            contact_email: patch.contact_email.or(self.contact_email),
        }
    }

    /// Finish the draft. `existing` is the job being edited, if any; its id
    /// and creation time carry over.
    pub fn into_job(
        self,
        existing: Option<&Job>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Job, DraftError> {
        Ok(Job {
            id: existing.map_or_else(generate_id, |j| j.id.clone()),
            company: required(self.company, "company")?,
            position: required(self.position, "position")?,
            location: optional(self.location),
            salary: optional(self.salary),
            status: self.status.unwrap_or(JobStatus::Applied),
            applied_date: self.applied_date.unwrap_or(today),
            description: optional(self.description),
            notes: optional(self.notes),
            url: optional(self.url),
            contact_person: optional(self.contact_person),
            contact_email: optional(self.contact_email),
            created_at: existing.map_or(now, |j| j.created_at),
            updated_at: now,
        })
    }
}

impl From<&Job> for JobDraft {
    fn from(job: &Job) -> Self {
        JobDraft {
            company: Some(job.company.clone()),
            position: Some(job.position.clone()),
            location: job.location.clone(),
            salary: job.salary.clone(),
            status: Some(job.status),
            applied_date: Some(job.applied_date),
            description: job.description.clone(),
            notes: job.notes.clone(),
            url: job.url.clone(),
            contact_person: job.contact_person.clone(),
            contact_email: job.contact_email.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterviewDraft {
    pub job_id: Option<String>,
    pub kind: Option<InterviewType>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub interviewer: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub status: Option<InterviewStatus>,
}

impl InterviewDraft {
    pub fn overlay(self, patch: InterviewDraft) -> InterviewDraft {
        InterviewDraft {
            job_id: patch.job_id.or(self.job_id),
            kind: patch.kind.or(self.kind),
            date: patch.date.or(self.date),
            time: patch.time.or(self.time),
            interviewer: patch.interviewer.or(self.interviewer),
            notes: patch.notes.or(self.notes),
            feedback: patch.feedback.or(self.feedback),
            status: patch.status.or(self.status),
        }
    }

    /// The job reference is not checked against stored jobs.
    pub fn into_interview(
        self,
        existing: Option<&Interview>,
        now: DateTime<Utc>,
    ) -> Result<Interview, DraftError> {
        Ok(Interview {
            id: existing.map_or_else(generate_id, |i| i.id.clone()),
            job_id: required(self.job_id, "job")?,
            kind: self.kind.unwrap_or(InterviewType::Phone),
            date: self.date.ok_or(DraftError::MissingField("date"))?,
            time: self.time.ok_or(DraftError::MissingField("time"))?,
            interviewer: optional(self.interviewer),
            notes: optional(self.notes),
            feedback: optional(self.feedback),
            status: self.status.unwrap_or(InterviewStatus::Scheduled),
            created_at: existing.map_or(now, |i| i.created_at),
        })
    }
}

impl From<&Interview> for InterviewDraft {
    fn from(interview: &Interview) -> Self {
        InterviewDraft {
            job_id: Some(interview.job_id.clone()),
            kind: Some(interview.kind),
            date: Some(interview.date),
            time: Some(interview.time),
            interviewer: interview.interviewer.clone(),
            notes: interview.notes.clone(),
            feedback: interview.feedback.clone(),
            status: Some(interview.status),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyDraft {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl CompanyDraft {
    pub fn into_company(self, existing: Option<&Company>) -> Result<Company, DraftError> {
        Ok(Company {
            id: existing.map_or_else(generate_id, |c| c.id.clone()),
            name: required(self.name, "name")?,
            industry: optional(self.industry),
            size: optional(self.size),
            website: optional(self.website),
            notes: optional(self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_job_draft_requires_company_and_position() {
        let draft = JobDraft {
            company: Some("   ".to_string()),
            position: Some("Engineer".to_string()),
            ..Default::default()
        };
        assert_eq!(
            draft.into_job(None, today(), now()),
            Err(DraftError::MissingField("company"))
        );

        let draft = JobDraft {
            company: Some("Acme".to_string()),
            ..Default::default()
        };
        assert_eq!(
            draft.into_job(None, today(), now()),
            Err(DraftError::MissingField("position"))
        );
    }

    #[test]
    fn test_job_draft_fills_defaults() {
        let draft = JobDraft {
            company: Some(" Acme ".to_string()),
            position: Some("Engineer".to_string()),
            location: Some("".to_string()),
            ..Default::default()
        };
        let job = draft.into_job(None, today(), now()).unwrap();
        assert_eq!(job.company, "Acme");
        assert_eq!(job.status, JobStatus::Applied);
        assert_eq!(job.applied_date, today());
        assert_eq!(job.location, None);
        assert_eq!(job.created_at, now());
        assert!(!job.id.is_empty());
    }

    #[test]
    fn test_editing_keeps_id_and_created_at() {
        let original = JobDraft {
            company: Some("Acme".to_string()),
            position: Some("Engineer".to_string()),
            location: Some("Berlin".to_string()),
            ..Default::default()
        }
        .into_job(None, today(), now())
        .unwrap();

        let later = now() + chrono::Duration::hours(3);
        let patch = JobDraft {
            status: Some(JobStatus::Interview),
            location: Some(String::new()),
            ..Default::default()
        };
        let edited = JobDraft::from(&original)
            .overlay(patch)
            .into_job(Some(&original), today(), later)
            .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.updated_at, later);
        assert_eq!(edited.status, JobStatus::Interview);
        assert_eq!(edited.location, None);
        assert_eq!(edited.company, "Acme");
    }

    #[test]
    fn test_interview_draft_defaults_and_required_fields() {
        let missing_time = InterviewDraft {
            job_id: Some("j1".to_string()),
            date: Some(today()),
            ..Default::default()
        };
        assert_eq!(
            missing_time.into_interview(None, now()),
            Err(DraftError::MissingField("time"))
        );

        let interview = InterviewDraft {
            job_id: Some("j1".to_string()),
            date: Some(today()),
            time: Some(parse_clock("09:30").unwrap()),
            ..Default::default()
        }
        .into_interview(None, now())
        .unwrap();
        assert_eq!(interview.kind, InterviewType::Phone);
        assert_eq!(interview.status, InterviewStatus::Scheduled);
    }

    #[test]
    fn test_company_draft_requires_name() {
        assert_eq!(
            CompanyDraft::default().into_company(None),
            Err(DraftError::MissingField("name"))
        );
    }

    #[test]
    fn test_parse_date_and_clock_errors() {
        assert_eq!(
            parse_date("2024-02-30"),
            Err(DraftError::InvalidDate("2024-02-30".to_string()))
        );
        assert!(parse_date("2024-02-29").is_ok());
        assert_eq!(parse_clock("noon"), Err(DraftError::InvalidTime("noon".to_string())));
    }
}
