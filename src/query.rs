use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::models::{Job, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl StatusFilter {
    pub fn allows(self, status: JobStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    AppliedDate,
    Company,
    Position,
    Status,
    UpdatedAt,
    CreatedAt,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::AppliedDate,
        SortKey::Company,
        SortKey::Position,
        SortKey::Status,
        SortKey::UpdatedAt,
        SortKey::CreatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::AppliedDate => "applied",
            SortKey::Company => "company",
            SortKey::Position => "position",
            SortKey::Status => "status",
            SortKey::UpdatedAt => "updated",
            SortKey::CreatedAt => "created",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::AppliedDate => "Applied Date",
            SortKey::Company => "Company",
            SortKey::Position => "Position",
            SortKey::Status => "Status",
            SortKey::UpdatedAt => "Last Updated",
            SortKey::CreatedAt => "Created",
        }
    }

    /// The key after this one, wrapping around.
    pub fn next(self) -> SortKey {
        let idx = SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }

    /// Ascending comparison. Dates compare as instants, text case-insensitively.
    pub fn compare(self, a: &Job, b: &Job) -> Ordering {
        match self {
            SortKey::AppliedDate => a.applied_date.cmp(&b.applied_date),
            SortKey::Company => cmp_text(&a.company, &b.company),
            SortKey::Position => cmp_text(&a.position, &b.position),
            SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" | "applied-date" | "applieddate" | "date" => Ok(SortKey::AppliedDate),
            "company" => Ok(SortKey::Company),
            "position" => Ok(SortKey::Position),
            "status" => Ok(SortKey::Status),
            "updated" | "updated-at" | "updatedat" => Ok(SortKey::UpdatedAt),
            "created" | "created-at" | "createdat" => Ok(SortKey::CreatedAt),
            _ => Err(ParseError {
                kind: "sort key",
                value: s.to_string(),
                expected: "applied, company, position, status, updated, created",
            }),
        }
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Search, status filter, and ordering for the job list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub search: String,
    pub status: StatusFilter,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl JobQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, filter: StatusFilter) -> Self {
        self.status = filter;
        self
    }

    pub fn sort(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort = key;
        self.direction = direction;
        self
    }

    /// Case-insensitive match on company, position, or location. A blank
    /// search matches everything; a missing location never matches.
    pub fn matches(&self, job: &Job) -> bool {
        if !self.status.allows(job.status) {
            return false;
        }
        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        job.company.to_lowercase().contains(&term)
            || job.position.to_lowercase().contains(&term)
            || job
                .location
                .as_deref()
                .is_some_and(|loc| loc.to_lowercase().contains(&term))
    }

    /// Filter then stable-sort. Ties keep their input order in both directions.
    pub fn apply(&self, jobs: &[Job]) -> Vec<Job> {
        let mut view: Vec<Job> = jobs.iter().filter(|j| self.matches(j)).cloned().collect();
        let key = self.sort;
        match self.direction {
            SortDirection::Ascending => view.sort_by(|a, b| key.compare(a, b)),
            SortDirection::Descending => view.sort_by(|a, b| key.compare(b, a)),
        }
        view
    }
}
