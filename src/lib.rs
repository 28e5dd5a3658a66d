//! Local job-application tracker: jobs, interviews, and companies kept in a
//! local key-value store, with the dashboard figures derived from them.

pub mod analytics;
pub mod draft;
pub mod error;
pub mod ids;
pub mod kv;
pub mod logging;
pub mod models;
pub mod query;
pub mod store;

pub use error::{DraftError, ParseError, StoreError};
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use models::{Company, Interview, InterviewStatus, InterviewType, Job, JobStatus};
pub use query::{JobQuery, SortDirection, SortKey, StatusFilter};
pub use store::{Record, Snapshot, Tracker};
