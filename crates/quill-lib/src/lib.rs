//! `quill-lib`: plain-text issue tracking.
//!
//! Issues are YAML records, one file per issue, next to a project record
//! holding components and releases. The [`ItemCache`] indexes them in
//! memory and derives display names (`component-N`) from creation order;
//! the [`Tracker`] runs user actions against a [`RecordStore`] and keeps
//! the cache in step.
//!
//! # Quick Start
//!
//! ```no_run
//! use quill_lib::{FileStore, NewIssue, Tracker};
//!
//! let store = FileStore::new("issues");
//! let mut tracker = Tracker::open(store, "Ada <ada@example.com>").unwrap();
//!
//! let issue = tracker
//!     .add_issue(NewIssue { title: "Crash on empty release".into(), ..Default::default() })
//!     .unwrap();
//! tracker.start_work(&issue.name, None).unwrap();
//! ```

pub mod cache;
pub mod error;
pub mod model;
pub mod query;
pub mod record;
pub mod storage;
pub mod tracker;
pub mod util;
pub mod validation;

pub use cache::ItemCache;
pub use error::{QuillError, Result, ValidationError};
pub use model::{Disposition, Issue, IssueType, LogEntry, Project, Release, ReleaseStatus, Status};
pub use query::{ChangelogSection, IssueUpdate, LogLine, NewIssue, ReleaseGroup};
pub use storage::{FileStore, RecordStore};
pub use tracker::{ArchiveReport, Tracker};
