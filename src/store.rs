//! Persistence for jobs, interviews, and companies.
//!
//! Each record type lives under its own key as one JSON array. Every operation
//! reads the whole collection, changes it in memory, and writes the whole
//! collection back. Reads never fail: a missing key, an unreadable store, or a
//! malformed payload all load as an empty collection so the analytics layer
//! always sees well-formed input. A single record that fails to decode is
//! skipped on read and carried through unchanged on write. Writes refuse to
//! replace a payload that is not a JSON array at all.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::models::{Company, Interview, Job};

pub const JOBS_KEY: &str = "job-tracker-jobs";
pub const INTERVIEWS_KEY: &str = "job-tracker-interviews";
pub const COMPANIES_KEY: &str = "job-tracker-companies";

/// A record type with its own keyed collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const KEY: &'static str;
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Apply this type's timestamp rule on write. `previous` is the stored
    /// record being replaced, if any.
    fn stamp(&mut self, previous: Option<&Self>, now: DateTime<Utc>);
}

impl Record for Job {
    const KEY: &'static str = JOBS_KEY;
    const KIND: &'static str = "job";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
        self.created_at = previous.map_or(now, |p| p.created_at);
        self.updated_at = now;
    }
}

impl Record for Interview {
    const KEY: &'static str = INTERVIEWS_KEY;
    const KIND: &'static str = "interview";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, previous: Option<&Self>, now: DateTime<Utc>) {
        self.created_at = previous.map_or(now, |p| p.created_at);
    }
}

impl Record for Company {
    const KEY: &'static str = COMPANIES_KEY;
    const KIND: &'static str = "company";

    fn id(&self) -> &str {
        &self.id
    }

    fn stamp(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {}
}

/// A stored entry as found on a write. Entries that no longer decode are kept
/// verbatim and written back untouched.
#[derive(Serialize)]
#[serde(untagged)]
enum Entry<R> {
    Known(R),
    Unreadable(Value),
}

impl<R> Entry<R> {
    fn known(&self) -> Option<&R> {
        match self {
            Entry::Known(record) => Some(record),
            Entry::Unreadable(_) => None,
        }
    }
}

fn decode<R: Record>(value: Value) -> Entry<R> {
    match R::deserialize(&value) {
        Ok(record) => Entry::Known(record),
        Err(e) => {
            warn!(key = R::KEY, error = %e, "skipping unreadable record");
            Entry::Unreadable(value)
        }
    }
}

/// Everything a render pass needs, loaded in one go.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub jobs: Vec<Job>,
    pub interviews: Vec<Interview>,
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobDeletion {
    pub job_removed: bool,
    pub interviews_removed: usize,
}

pub struct Tracker<K> {
    kv: K,
}

impl<K: KeyValueStore> Tracker<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn load_all<R: Record>(&self) -> Vec<R> {
        let raw = match self.kv.get(R::KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = R::KEY, error = %e, "store unavailable, treating collection as empty");
                return Vec::new();
            }
        };
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(key = R::KEY, error = %e, "malformed collection, treating as empty");
                return Vec::new();
            }
        };
        values
            .into_iter()
            .filter_map(|value| match decode::<R>(value) {
                Entry::Known(record) => Some(record),
                Entry::Unreadable(_) => None,
            })
            .collect()
    }

    /// Load for a read-modify-write. Unlike `load_all` this refuses a payload
    /// that is not a JSON array, so a write never replaces data it could not read.
    fn load_entries<R: Record>(&self) -> Result<Vec<Entry<R>>, StoreError> {
        let Some(raw) = self.kv.get(R::KEY)? else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Corrupt { key: R::KEY, source })?;
        Ok(values.into_iter().map(decode).collect())
    }

    fn write_all<R: Record>(&self, entries: &[Entry<R>]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return self.kv.remove(R::KEY);
        }
        let raw = serde_json::to_string(entries)?;
        self.kv.set(R::KEY, &raw)
    }

    /// Insert, or replace the record with the same id. Returns the record as stored.
    pub fn upsert<R: Record>(&self, record: R) -> Result<R, StoreError> {
        self.upsert_at(record, Utc::now())
    }

    pub fn upsert_at<R: Record>(&self, mut record: R, now: DateTime<Utc>) -> Result<R, StoreError> {
        let mut entries = self.load_entries::<R>()?;
        let existing = entries
            .iter()
            .position(|e| e.known().is_some_and(|r| r.id() == record.id()));
        match existing {
            Some(idx) => {
                record.stamp(entries[idx].known(), now);
                entries[idx] = Entry::Known(record.clone());
                debug!(kind = R::KIND, id = record.id(), "replaced record");
            }
            None => {
                record.stamp(None, now);
                entries.push(Entry::Known(record.clone()));
                debug!(kind = R::KIND, id = record.id(), "inserted record");
            }
        }
        self.write_all(&entries)?;
        Ok(record)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.load_entries::<R>()?;
        let before = entries.len();
        entries.retain(|e| e.known().is_none_or(|r| r.id() != id));
        if entries.len() == before {
            return Ok(false);
        }
        self.write_all(&entries)?;
        debug!(kind = R::KIND, id, "deleted record");
        Ok(true)
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.load_all()
    }

    pub fn interviews(&self) -> Vec<Interview> {
        self.load_all()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.load_all()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            jobs: self.jobs(),
            interviews: self.interviews(),
            companies: self.companies(),
        }
    }

    pub fn get_job(&self, id: &str) -> Option<Job> {
        self.jobs().into_iter().find(|job| job.id == id)
    }

    pub fn get_interview(&self, id: &str) -> Option<Interview> {
        self.interviews().into_iter().find(|i| i.id == id)
    }

    pub fn interviews_for_job(&self, job_id: &str) -> Vec<Interview> {
        self.interviews()
            .into_iter()
            .filter(|i| i.job_id == job_id)
            .collect()
    }

    pub fn save_job(&self, job: Job) -> Result<Job, StoreError> {
        self.upsert(job)
    }

    pub fn save_interview(&self, interview: Interview) -> Result<Interview, StoreError> {
        self.upsert(interview)
    }

    pub fn save_company(&self, company: Company) -> Result<Company, StoreError> {
        self.upsert(company)
    }

    /// Delete a job and every interview pointing at it. Interviews are swept
    /// even when the job itself is already gone.
    pub fn delete_job(&self, id: &str) -> Result<JobDeletion, StoreError> {
        let job_removed = self.delete::<Job>(id)?;

        let mut interviews = self.load_entries::<Interview>()?;
        let before = interviews.len();
        interviews.retain(|e| e.known().is_none_or(|i| i.job_id != id));
        let interviews_removed = before - interviews.len();
        if interviews_removed > 0 {
            self.write_all(&interviews)?;
            debug!(job_id = id, count = interviews_removed, "removed interviews for deleted job");
        }

        Ok(JobDeletion {
            job_removed,
            interviews_removed,
        })
    }

    pub fn delete_interview(&self, id: &str) -> Result<bool, StoreError> {
        self.delete::<Interview>(id)
    }

    pub fn delete_company(&self, id: &str) -> Result<bool, StoreError> {
        self.delete::<Company>(id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use crate::models::{Interview, InterviewStatus, InterviewType, Job, JobStatus};

    pub fn job(id: &str, company: &str, status: JobStatus, applied: &str) -> Job {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Job {
            id: id.to_string(),
            company: company.to_string(),
            position: "Engineer".to_string(),
            location: None,
            salary: None,
            status,
            applied_date: NaiveDate::parse_from_str(applied, "%Y-%m-%d").unwrap(),
            description: None,
            notes: None,
            url: None,
            contact_person: None,
            contact_email: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn interview(id: &str, job_id: &str, date: &str, status: InterviewStatus) -> Interview {
        Interview {
            id: id.to_string(),
            job_id: job_id.to_string(),
            kind: InterviewType::Phone,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            interviewer: None,
            notes: None,
            feedback: None,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{interview, job};
    use super::*;
    use crate::kv::{MemoryKv, SqliteKv};
    use crate::models::{InterviewStatus, JobStatus};
    use chrono::TimeZone;

    fn tracker() -> Tracker<MemoryKv> {
        Tracker::new(MemoryKv::new())
    }

    #[test]
    fn test_empty_store_loads_empty_collections() {
        let t = tracker();
        let snap = t.snapshot();
        assert!(snap.jobs.is_empty());
        assert!(snap.interviews.is_empty());
        assert!(snap.companies.is_empty());
    }

    #[test]
    fn test_malformed_collection_loads_empty() {
        let t = Tracker::new(
            MemoryKv::new()
                .with_raw(JOBS_KEY, "{not json")
                .with_raw(INTERVIEWS_KEY, r#"[{"id": 3}]"#),
        );
        assert!(t.jobs().is_empty());
        assert!(t.interviews().is_empty());
    }

    fn stored_jobs(t: &Tracker<MemoryKv>) -> Vec<Value> {
        serde_json::from_str(&t.kv().raw(JOBS_KEY).unwrap()).unwrap()
    }

    #[test]
    fn test_unreadable_record_is_skipped_on_read_and_kept_on_write() {
        let good = job("a", "Acme", JobStatus::Applied, "2024-01-10");
        let good = serde_json::to_value(good).unwrap();
        let mut ghosted = good.clone();
        ghosted["id"] = "b".into();
        ghosted["status"] = "ghosted".into();
        let raw = serde_json::to_string(&vec![good, ghosted]).unwrap();
        let t = Tracker::new(MemoryKv::new().with_raw(JOBS_KEY, &raw));

        let loaded: Vec<String> = t.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(loaded, vec!["a"]);

        t.save_job(job("c", "Globex", JobStatus::Applied, "2024-01-12")).unwrap();
        let loaded: Vec<String> = t.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(loaded, vec!["a", "c"]);

        let stored = stored_jobs(&t);
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1]["id"], "b");
        assert_eq!(stored[1]["status"], "ghosted");

        assert!(t.delete::<Job>("a").unwrap());
        assert_eq!(stored_jobs(&t).len(), 2);
    }

    #[test]
    fn test_write_refuses_to_replace_unparseable_collection() {
        let t = Tracker::new(MemoryKv::new().with_raw(JOBS_KEY, "{not json"));
        assert!(t.jobs().is_empty());

        let err = t
            .save_job(job("c", "Globex", JobStatus::Applied, "2024-01-12"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { key: JOBS_KEY, .. }));
        assert_eq!(t.kv().raw(JOBS_KEY).as_deref(), Some("{not json"));
        assert!(t.delete_job("c").is_err());
    }

    #[test]
    fn test_deleting_last_record_removes_the_key() {
        let t = tracker();
        t.save_job(job("j1", "Acme", JobStatus::Applied, "2024-01-10")).unwrap();
        assert!(t.delete_job("j1").unwrap().job_removed);
        assert_eq!(t.kv().raw(JOBS_KEY), None);
        assert!(t.jobs().is_empty());
    }

    #[test]
    fn test_upsert_inserts_then_replaces_preserving_created_at() {
        let t = tracker();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();

        let saved = t
            .upsert_at(job("j1", "Acme", JobStatus::Applied, "2024-03-01"), first)
            .unwrap();
        assert_eq!(saved.created_at, first);
        assert_eq!(saved.updated_at, first);

        let mut edited = saved.clone();
        edited.status = JobStatus::Screening;
        edited.created_at = later;
        t.upsert_at(edited, later).unwrap();

        let jobs = t.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Screening);
        assert_eq!(jobs[0].created_at, first);
        assert_eq!(jobs[0].updated_at, later);
    }

    #[test]
    fn test_upsert_interview_keeps_original_created_at() {
        let t = tracker();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        t.upsert_at(interview("i1", "j1", "2024-03-10", InterviewStatus::Scheduled), first)
            .unwrap();

        let mut done = t.get_interview("i1").unwrap();
        done.status = InterviewStatus::Completed;
        t.upsert_at(done, later).unwrap();

        let stored = t.get_interview("i1").unwrap();
        assert_eq!(stored.status, InterviewStatus::Completed);
        assert_eq!(stored.created_at, first);
    }

    #[test]
    fn test_delete_job_cascades_to_its_interviews_only() {
        let t = tracker();
        t.save_job(job("j1", "Acme", JobStatus::Interview, "2024-01-10")).unwrap();
        t.save_job(job("j2", "Globex", JobStatus::Applied, "2024-01-11")).unwrap();
        t.save_interview(interview("i1", "j1", "2024-02-01", InterviewStatus::Scheduled)).unwrap();
        t.save_interview(interview("i2", "j1", "2024-02-05", InterviewStatus::Completed)).unwrap();
        t.save_interview(interview("i3", "j2", "2024-02-07", InterviewStatus::Scheduled)).unwrap();

        let outcome = t.delete_job("j1").unwrap();
        assert_eq!(
            outcome,
            JobDeletion {
                job_removed: true,
                interviews_removed: 2
            }
        );

        let jobs = t.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "j2");
        let interviews = t.interviews();
        assert_eq!(interviews.len(), 1);
        assert_eq!(interviews[0].id, "i3");
    }

    #[test]
    fn test_delete_missing_job_still_sweeps_orphans() {
        let t = tracker();
        t.save_interview(interview("i1", "gone", "2024-02-01", InterviewStatus::Scheduled))
            .unwrap();
        let outcome = t.delete_job("gone").unwrap();
        assert!(!outcome.job_removed);
        assert_eq!(outcome.interviews_removed, 1);
        assert!(t.interviews().is_empty());
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let t = tracker();
        t.save_job(job("j1", "Acme", JobStatus::Applied, "2024-01-10")).unwrap();
        assert!(!t.delete::<Job>("nope").unwrap());
        assert_eq!(t.jobs().len(), 1);
    }

    #[test]
    fn test_company_round_trip_and_delete() {
        let t = tracker();
        let company = Company {
            id: "c1".to_string(),
            name: "Acme".to_string(),
            industry: Some("Robotics".to_string()),
            size: None,
            website: None,
            notes: None,
        };
        t.save_company(company.clone()).unwrap();
        assert_eq!(t.companies(), vec![company]);
        assert!(t.delete_company("c1").unwrap());
        assert!(t.companies().is_empty());
    }

    #[test]
    fn test_collections_are_stored_under_fixed_keys_as_arrays() {
        let t = tracker();
        t.save_job(job("j1", "Acme", JobStatus::Applied, "2024-01-10")).unwrap();
        let raw = t.kv().raw(JOBS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["company"], "Acme");
    }

    #[test]
    fn test_tracker_over_sqlite() {
        let t = Tracker::new(SqliteKv::open_in_memory().unwrap());
        t.save_job(job("j1", "Acme", JobStatus::Offer, "2024-01-10")).unwrap();
        assert_eq!(t.get_job("j1").map(|j| j.status), Some(JobStatus::Offer));
    }
}
