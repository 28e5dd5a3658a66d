use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Applied,
    Screening,
    Interview,
    Technical,
    Final,
    Offer,
    Rejected,
    Withdrawn,
}

impl JobStatus {
    /// Lifecycle order, used wherever statuses are listed.
    pub const ALL: [JobStatus; 8] = [
        JobStatus::Applied,
        JobStatus::Screening,
        JobStatus::Interview,
        JobStatus::Technical,
        JobStatus::Final,
        JobStatus::Offer,
        JobStatus::Rejected,
        JobStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Applied => "applied",
            JobStatus::Screening => "screening",
            JobStatus::Interview => "interview",
            JobStatus::Technical => "technical",
            JobStatus::Final => "final",
            JobStatus::Offer => "offer",
            JobStatus::Rejected => "rejected",
            JobStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::Screening => "Screening",
            JobStatus::Interview => "Interview",
            JobStatus::Technical => "Technical",
            JobStatus::Final => "Final Round",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
            JobStatus::Withdrawn => "Withdrawn",
        }
    }

    /// Anything past the initial application counts as a response.
    pub fn is_response(self) -> bool {
        self != JobStatus::Applied
    }

    /// Reached at least one interview round.
    pub fn is_interviewing(self) -> bool {
        matches!(
            self,
            JobStatus::Interview | JobStatus::Technical | JobStatus::Final | JobStatus::Offer
        )
    }

    /// Still in play: not closed out by rejection, withdrawal, or an offer.
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            JobStatus::Rejected | JobStatus::Withdrawn | JobStatus::Offer
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ParseError {
                kind: "job status",
                value: s.to_string(),
                expected:
                    "applied, screening, interview, technical, final, offer, rejected, withdrawn",
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Phone,
    Video,
    Onsite,
    Technical,
}

impl InterviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewType::Phone => "phone",
            InterviewType::Video => "video",
            InterviewType::Onsite => "onsite",
            InterviewType::Technical => "technical",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phone" => Ok(InterviewType::Phone),
            "video" => Ok(InterviewType::Video),
            "onsite" => Ok(InterviewType::Onsite),
            "technical" => Ok(InterviewType::Technical),
            _ => Err(ParseError {
                kind: "interview type",
                value: s.to_string(),
                expected: "phone, video, onsite, technical",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            _ => Err(ParseError {
                kind: "interview status",
                value: s.to_string(),
                expected: "scheduled, completed, cancelled",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub company: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    pub status: JobStatus,
    pub applied_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: String,
    /// Soft reference; the job may no longer exist.
    pub job_id: String,
    #[serde(rename = "type")]
    pub kind: InterviewType,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub status: InterviewStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Accepts "14:30" and "14:30:00".
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

mod hhmm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Seconds are written only when present.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = if time.second() == 0 { "%H:%M" } else { "%H:%M:%S" };
        serializer.serialize_str(&time.format(format).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_parses_case_insensitively() {
        assert_eq!("Offer".parse::<JobStatus>(), Ok(JobStatus::Offer));
        assert_eq!(" final ".parse::<JobStatus>(), Ok(JobStatus::Final));
        assert!("ghosted".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_status_groups() {
        assert!(!JobStatus::Applied.is_response());
        assert!(JobStatus::Rejected.is_response());
        assert!(JobStatus::Offer.is_interviewing());
        assert!(!JobStatus::Screening.is_interviewing());
        assert!(!JobStatus::Offer.is_active());
        assert!(JobStatus::Technical.is_active());
    }

    #[test]
    fn test_job_reads_camel_case_layout_with_missing_optionals() {
        let raw = r#"{
            "id": "lq2x9k0abc",
            "company": "Acme Corp",
            "position": "Platform Engineer",
            "status": "screening",
            "appliedDate": "2024-01-10",
            "contactPerson": "Dana",
            "createdAt": "2024-01-10T09:00:00.000Z",
            "updatedAt": "2024-01-11T09:00:00.000Z"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.status, JobStatus::Screening);
        assert_eq!(job.applied_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(job.contact_person.as_deref(), Some("Dana"));
        assert!(job.location.is_none());

        let written = serde_json::to_value(&job).unwrap();
        assert!(written.get("location").is_none());
        assert_eq!(written["appliedDate"], "2024-01-10");
    }

    #[test]
    fn test_interview_kind_is_stored_as_type_and_time_as_hhmm() {
        let raw = r#"{
            "id": "i1",
            "jobId": "j1",
            "type": "video",
            "date": "2024-02-01",
            "time": "14:30",
            "status": "scheduled",
            "createdAt": "2024-01-20T10:00:00Z"
        }"#;
        let interview: Interview = serde_json::from_str(raw).unwrap();
        assert_eq!(interview.kind, InterviewType::Video);
        assert_eq!(interview.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());

        let written = serde_json::to_value(&interview).unwrap();
        assert_eq!(written["type"], "video");
        assert_eq!(written["time"], "14:30");
    }

    #[test]
    fn test_parse_time_accepts_seconds() {
        assert_eq!(parse_time("09:05:30"), NaiveTime::from_hms_opt(9, 5, 30));
        assert_eq!(parse_time("25:00"), None);
    }

    #[test]
    fn test_interview_time_keeps_seconds_when_present() {
        let raw = r#"{
            "id": "i1",
            "jobId": "j1",
            "type": "phone",
            "date": "2024-03-12",
            "time": "09:05:30",
            "status": "scheduled",
            "createdAt": "2024-03-01T08:00:00Z"
        }"#;
        let interview: Interview = serde_json::from_str(raw).unwrap();
        let written = serde_json::to_value(&interview).unwrap();
        assert_eq!(written["time"], "09:05:30");

        let mut on_the_minute = interview.clone();
        on_the_minute.time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(serde_json::to_value(&on_the_minute).unwrap()["time"], "09:05");
    }
}
