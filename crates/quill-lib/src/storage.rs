//! Record storage.
//!
//! [`RecordStore`] is the seam between the tracker and the file system.
//! [`FileStore`] keeps one YAML file per issue plus one project file in a
//! single directory:
//!
//! ```text
//! issues/
//!   project.yaml
//!   issue-<id>.yaml
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{QuillError, Result};
use crate::model::{Issue, Project};
use crate::record;

/// File name of the project record.
pub const PROJECT_FILE: &str = "project.yaml";

const ISSUE_PREFIX: &str = "issue-";
const RECORD_EXT: &str = ".yaml";

/// Read and write access to issue and project records.
pub trait RecordStore {
    /// Identifiers of every issue record, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be listed.
    fn list_issue_ids(&self) -> Result<Vec<String>>;

    /// Read one issue. `None` when no record exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read or decoded.
    fn read_issue(&self, id: &str) -> Result<Option<Issue>>;

    /// Write one issue, replacing any previous record atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write_issue(&self, issue: &Issue) -> Result<()>;

    /// Delete one issue record. Reports whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be removed.
    fn delete_issue(&self, id: &str) -> Result<bool>;

    /// # Errors
    ///
    /// Returns `NotInitialized` when there is no project record.
    fn read_project(&self) -> Result<Project>;

    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write_project(&self, project: &Project) -> Result<()>;
}

/// Directory-backed record store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use an existing issue directory. Nothing is read until asked.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the issue directory and its first project record.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` if a project record exists, or `Io` if
    /// the directory cannot be created.
    pub fn init(dir: impl Into<PathBuf>, project_name: &str) -> Result<Self> {
        let store = Self::new(dir);
        let project_path = store.project_path();
        if project_path.exists() {
            return Err(QuillError::AlreadyInitialized { path: project_path });
        }

        fs::create_dir_all(&store.dir)?;
        store.write_project(&Project::new(project_name))?;
        tracing::debug!(path = %store.dir.display(), "initialized issue directory");
        Ok(store)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn project_path(&self) -> PathBuf {
        self.dir.join(PROJECT_FILE)
    }

    #[must_use]
    pub fn issue_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{ISSUE_PREFIX}{id}{RECORD_EXT}"))
    }

    fn read_text(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to temp file, then rename over the target.
    fn write_atomic(path: &Path, text: &str) -> Result<()> {
        let tmp_path = path.with_extension("yaml.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn record_error(path: &Path, err: &QuillError) -> QuillError {
    QuillError::Record {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl RecordStore for FileStore {
    fn list_issue_ids(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuillError::FileNotFound(self.dir.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(id) = name
                .strip_prefix(ISSUE_PREFIX)
                .and_then(|rest| rest.strip_suffix(RECORD_EXT))
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn read_issue(&self, id: &str) -> Result<Option<Issue>> {
        let path = self.issue_path(id);
        let Some(text) = Self::read_text(&path)? else {
            return Ok(None);
        };
        tracing::debug!(path = %path.display(), "reading issue record");
        let issue = record::decode_issue(&text).map_err(|e| record_error(&path, &e))?;
        Ok(Some(issue))
    }

    fn write_issue(&self, issue: &Issue) -> Result<()> {
        let path = self.issue_path(&issue.id);
        let text = record::encode_issue(issue)?;
        Self::write_atomic(&path, &text)?;
        tracing::debug!(path = %path.display(), "wrote issue record");
        Ok(())
    }

    fn delete_issue(&self, id: &str) -> Result<bool> {
        let path = self.issue_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted issue record");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read_project(&self) -> Result<Project> {
        let path = self.project_path();
        let text = Self::read_text(&path)?.ok_or(QuillError::NotInitialized)?;
        record::decode_project(&text).map_err(|e| record_error(&path, &e))
    }

    fn write_project(&self, project: &Project) -> Result<()> {
        let path = self.project_path();
        let text = record::encode_project(project)?;
        Self::write_atomic(&path, &text)?;
        tracing::debug!(path = %path.display(), "wrote project record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Release, Status};

    fn sample_issue(id: &str) -> Issue {
        Issue {
            id: id.to_string(),
            name: id.to_string(),
            title: format!("Issue {id}"),
            component: Some("quill".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_creates_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path().join("issues"), "quill").unwrap();

        assert!(store.project_path().exists());
        let project = store.read_project().unwrap();
        assert_eq!(project.name, "quill");
        assert_eq!(project.default_component(), Some("quill"));
        assert!(store.list_issue_ids().unwrap().is_empty());
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::init(dir.path(), "quill").unwrap();
        let err = FileStore::init(dir.path(), "quill").unwrap_err();
        assert!(matches!(err, QuillError::AlreadyInitialized { .. }));
    }

    #[test]
    fn test_issue_roundtrip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path(), "quill").unwrap();

        let mut b = sample_issue("bbbb");
        b.status = Status::Paused;
        store.write_issue(&b).unwrap();
        store.write_issue(&sample_issue("aaaa")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list_issue_ids().unwrap(), vec!["aaaa", "bbbb"]);
        let back = store.read_issue("bbbb").unwrap().unwrap();
        assert_eq!(back.status, Status::Paused);
        assert_eq!(back.title, "Issue bbbb");
        assert!(!dir.path().join("issue-bbbb.yaml.tmp").exists());
    }

    #[test]
    fn test_read_missing_issue_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path(), "quill").unwrap();
        assert!(store.read_issue("nope").unwrap().is_none());
    }

    #[test]
    fn test_delete_issue() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path(), "quill").unwrap();
        store.write_issue(&sample_issue("aaaa")).unwrap();

        assert!(store.delete_issue("aaaa").unwrap());
        assert!(!store.delete_issue("aaaa").unwrap());
        assert!(store.list_issue_ids().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_record_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path(), "quill").unwrap();
        fs::write(store.issue_path("bad"), "title: [unclosed").unwrap();

        let err = store.read_issue("bad").unwrap_err();
        match err {
            QuillError::Record { path, .. } => assert_eq!(path, store.issue_path("bad")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_project_is_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.read_project(),
            Err(QuillError::NotInitialized)
        ));
    }

    #[test]
    fn test_missing_dir_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent"));
        assert!(matches!(
            store.list_issue_ids(),
            Err(QuillError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_project_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path(), "quill").unwrap();
        let mut project = store.read_project().unwrap();
        project.releases.push(Release::new("0.1"));
        store.write_project(&project).unwrap();

        assert_eq!(store.read_project().unwrap(), project);
    }
}
