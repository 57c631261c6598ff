//! The tracker: user-level actions on top of a record store.
//!
//! Every mutating action follows the same steps: resolve the item,
//! validate, append one log entry, write the record, refresh the cache.
//! The cache is therefore always a faithful image of the store after an
//! action returns.

use std::fs;
use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use serde::Serialize;

use crate::cache::ItemCache;
use crate::error::{QuillError, Result};
use crate::model::{
    Component, Disposition, Issue, IssueType, Project, Release, ReleaseStatus, Status, stamp_now,
};
use crate::query::{ChangelogSection, IssueUpdate, LogLine, NewIssue, ReleaseGroup};
use crate::storage::{FileStore, PROJECT_FILE, RecordStore};
use crate::util::generate_id;
use crate::validation::{ComponentValidator, IssueValidator, ReleaseValidator};

/// Prefix of the default archive directory name.
pub const ARCHIVE_DIR_PREFIX: &str = "quill-archive-";

/// Result of archiving a release.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub release: String,
    pub dir: PathBuf,
    /// Identifiers of the issues moved into the archive.
    pub issues: Vec<String>,
}

/// Issue tracker over a record store.
pub struct Tracker<S: RecordStore> {
    store: S,
    cache: ItemCache,
    project: Project,
    actor: String,
}

impl<S: RecordStore> Tracker<S> {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load the project and every issue record.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the store has no project record, or any
    /// error raised while reading records.
    pub fn open(store: S, actor: impl Into<String>) -> Result<Self> {
        let project = store.read_project()?;
        let mut tracker = Self {
            store,
            cache: ItemCache::new(),
            project,
            actor: actor.into(),
        };
        tracker.refresh()?;
        Ok(tracker)
    }

    /// Rebuild the cache from the store.
    ///
    /// Only unreleased releases are cached; released ones stay reachable
    /// through [`Self::project`].
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be listed, read or decoded.
    pub fn refresh(&mut self) -> Result<()> {
        self.cache.clear();

        for id in self.store.list_issue_ids()? {
            match self.store.read_issue(&id)? {
                Some(issue) => {
                    if !self.cache.add_issue(issue) {
                        tracing::debug!(%id, "skipping record without title or id");
                    }
                }
                None => tracing::debug!(%id, "record vanished during refresh"),
            }
        }

        self.project = self.store.read_project()?;
        for release in self.project.unreleased() {
            self.cache.add_release(release.clone());
        }

        self.cache.sort_issues(true);
        tracing::debug!(
            issues = self.cache.issue_count(),
            releases = self.cache.release_count(),
            "refreshed cache"
        );
        Ok(())
    }

    #[must_use]
    pub const fn cache(&self) -> &ItemCache {
        &self.cache
    }

    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn resolve(&self, key: &str) -> Result<Issue> {
        self.cache
            .get_issue(key)
            .cloned()
            .ok_or_else(|| QuillError::issue_not_found(key))
    }

    fn release_ref(&self, name: &str) -> Result<&Release> {
        self.project
            .release(name)
            .ok_or_else(|| QuillError::release_not_found(name))
    }

    fn require_unreleased(&self, name: &str) -> Result<()> {
        if self.release_ref(name)?.is_released() {
            return Err(already_released(name));
        }
        Ok(())
    }

    fn require_component(&self, name: &str) -> Result<()> {
        if self.project.has_component(name) {
            Ok(())
        } else {
            Err(QuillError::ComponentNotFound {
                name: name.to_string(),
            })
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.cache.issues().iter().any(|i| i.id == id)
    }

    /// Validate, write and refresh. Returns the refreshed copy so the
    /// caller sees the display name the rename pass assigned.
    fn save_issue(&mut self, issue: Issue) -> Result<Issue> {
        IssueValidator::validate(&issue).map_err(QuillError::from_validation_errors)?;
        self.store.write_issue(&issue)?;
        self.refresh()?;
        Ok(self.cache.get_issue(&issue.id).cloned().unwrap_or(issue))
    }

    fn save_project(&mut self, project: &Project) -> Result<()> {
        self.store.write_project(project)?;
        self.refresh()
    }

    fn transition(issue: &Issue, action: &str) -> QuillError {
        QuillError::InvalidTransition {
            name: issue.name.clone(),
            action: action.to_string(),
            status: issue.status.to_string(),
        }
    }

    // ========================================================================
    // Issue actions
    // ========================================================================

    /// Create an issue.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad title, `ComponentNotFound` or
    /// `ReleaseNotFound` for unknown references, and `Validation` when the
    /// release has already been made.
    pub fn add_issue(&mut self, new: NewIssue) -> Result<Issue> {
        if let Some(release) = new.release.as_deref() {
            self.require_unreleased(release)?;
        }
        let component = match new.component {
            Some(component) => {
                self.require_component(&component)?;
                Some(component)
            }
            None => self.project.default_component().map(String::from),
        };

        let now = stamp_now();
        let id = generate_id(
            &new.title,
            new.description.as_deref(),
            Some(self.actor.as_str()),
            now,
            |id| self.id_taken(id),
        );

        let mut issue = Issue {
            name: id.clone(),
            id,
            title: new.title,
            issue_type: new.issue_type,
            component,
            status: Status::Unstarted,
            disposition: None,
            description: new.description.filter(|d| !d.trim().is_empty()),
            creator: Some(self.actor.clone()),
            created: now,
            release: new.release,
            references: new.references,
            log: Vec::new(),
        };
        issue.log_event(&self.actor, "created", new.comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(id = %issue.id, name = %issue.name, "created issue");
        Ok(issue)
    }

    /// Apply field changes.
    ///
    /// # Errors
    ///
    /// Returns `NothingToDo` for an empty update, `IssueNotFound` for an
    /// unknown key and `ComponentNotFound` for an unknown component.
    pub fn edit_issue(&mut self, key: &str, update: &IssueUpdate, comment: Option<String>) -> Result<Issue> {
        if update.is_empty() {
            return Err(QuillError::nothing_to_do("no fields to update"));
        }

        let mut issue = self.resolve(key)?;
        if let Some(title) = &update.title {
            issue.title.clone_from(title);
        }
        if let Some(description) = &update.description {
            issue.description = description.clone().filter(|d| !d.trim().is_empty());
        }
        if let Some(issue_type) = &update.issue_type {
            issue.issue_type = issue_type.clone();
        }
        if let Some(component) = &update.component {
            self.require_component(component)?;
            issue.component = Some(component.clone());
        }
        issue.log_event(&self.actor, "edited", comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, "edited issue");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` when the issue is in progress or closed.
    pub fn start_work(&mut self, key: &str, comment: Option<String>) -> Result<Issue> {
        let mut issue = self.resolve(key)?;
        if matches!(issue.status, Status::InProgress | Status::Closed) {
            return Err(Self::transition(&issue, "start work on"));
        }
        issue.status = Status::InProgress;
        issue.log_event(&self.actor, "started work", comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, "started work");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the issue is in progress.
    pub fn stop_work(&mut self, key: &str, comment: Option<String>) -> Result<Issue> {
        let mut issue = self.resolve(key)?;
        if issue.status != Status::InProgress {
            return Err(Self::transition(&issue, "stop work on"));
        }
        issue.status = Status::Paused;
        issue.log_event(&self.actor, "stopped work", comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, "stopped work");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` when the issue is already closed.
    pub fn close_issue(
        &mut self,
        key: &str,
        disposition: Disposition,
        comment: Option<String>,
    ) -> Result<Issue> {
        let mut issue = self.resolve(key)?;
        if issue.is_closed() {
            return Err(Self::transition(&issue, "close"));
        }
        issue.status = Status::Closed;
        issue.disposition = Some(disposition.as_str().to_string());
        issue.log_event(
            &self.actor,
            format!("closed with disposition {disposition}"),
            comment,
        );

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, %disposition, "closed issue");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the issue is closed.
    pub fn reopen_issue(&mut self, key: &str, comment: Option<String>) -> Result<Issue> {
        let mut issue = self.resolve(key)?;
        if !issue.is_closed() {
            return Err(Self::transition(&issue, "reopen"));
        }
        issue.status = Status::Unstarted;
        issue.disposition = None;
        issue.log_event(&self.actor, "reopened", comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, "reopened issue");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank comment.
    pub fn comment_issue(&mut self, key: &str, comment: &str) -> Result<Issue> {
        if comment.trim().is_empty() {
            return Err(QuillError::validation("comment", "cannot be empty"));
        }
        let mut issue = self.resolve(key)?;
        issue.log_event(&self.actor, "commented", Some(comment.to_string()));
        self.save_issue(issue)
    }

    /// Assign to a release, or unassign with `None`.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound` for an unknown release, `Validation` for a
    /// release that has been made, and `NothingToDo` when the assignment
    /// would not change.
    pub fn assign_issue(
        &mut self,
        key: &str,
        release: Option<&str>,
        comment: Option<String>,
    ) -> Result<Issue> {
        let mut issue = self.resolve(key)?;

        let action = match (release, issue.release.as_deref()) {
            (Some(new), Some(old)) if new == old => {
                return Err(QuillError::nothing_to_do(format!(
                    "{} is already assigned to release {new}",
                    issue.name
                )));
            }
            (Some(new), old) => {
                self.require_unreleased(new)?;
                format!(
                    "assigned to release {new} from {}",
                    old.unwrap_or("unassigned")
                )
            }
            (None, Some(old)) => format!("unassigned from release {old}"),
            (None, None) => {
                return Err(QuillError::nothing_to_do(format!(
                    "{} is not assigned to a release",
                    issue.name
                )));
            }
        };

        issue.release = release.map(String::from);
        issue.log_event(&self.actor, action, comment);

        let issue = self.save_issue(issue)?;
        tracing::info!(name = %issue.name, release = ?issue.release, "assigned issue");
        Ok(issue)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank reference.
    pub fn add_reference(&mut self, key: &str, reference: &str, comment: Option<String>) -> Result<Issue> {
        if reference.trim().is_empty() {
            return Err(QuillError::validation("reference", "cannot be empty"));
        }
        let mut issue = self.resolve(key)?;
        issue.references.push(reference.to_string());
        let n = issue.references.len();
        issue.log_event(&self.actor, format!("added reference {n}"), comment);
        self.save_issue(issue)
    }

    /// Delete an issue record and forget it.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` for an unknown key.
    pub fn drop_issue(&mut self, key: &str) -> Result<Issue> {
        let issue = self.resolve(key)?;
        self.store.delete_issue(&issue.id)?;
        self.cache.remove_issue(&issue.id);
        self.refresh()?;
        tracing::info!(id = %issue.id, name = %issue.name, "dropped issue");
        Ok(issue)
    }

    // ========================================================================
    // Release and component actions
    // ========================================================================

    /// # Errors
    ///
    /// Returns `Validation` for a bad name and `ReleaseExists` for a
    /// duplicate.
    pub fn add_release(&mut self, name: &str, comment: Option<String>) -> Result<Release> {
        ReleaseValidator::validate(name)?;
        if self.project.release(name).is_some() {
            return Err(QuillError::ReleaseExists {
                name: name.to_string(),
            });
        }

        let mut release = Release::new(name);
        release.log_event(&self.actor, "created", comment);

        let mut project = self.project.clone();
        project.releases.push(release.clone());
        self.save_project(&project)?;
        tracing::info!(release = %name, "created release");
        Ok(release)
    }

    /// Rename a release and move its issues along.
    ///
    /// Issue records are rewritten first and the project record last, so
    /// a failed run leaves the old release in place with some issues
    /// already moved. Running the rename again finishes the job. The cache
    /// is refreshed from disk whether or not the writes succeed.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound`, `ReleaseExists` for a taken new name,
    /// `Validation` for a bad name or a release that has been made, or the
    /// store error of a failed write.
    pub fn edit_release(&mut self, name: &str, new_name: &str, comment: Option<String>) -> Result<Release> {
        self.require_unreleased(name)?;
        ReleaseValidator::validate(new_name)?;
        if name == new_name {
            return Err(QuillError::nothing_to_do("release name unchanged"));
        }
        if self.project.release(new_name).is_some() {
            return Err(QuillError::ReleaseExists {
                name: new_name.to_string(),
            });
        }

        let moved: Vec<Issue> = self
            .cache
            .get_issues_by_release(Some(name), true)
            .into_iter()
            .cloned()
            .collect();

        let mut project = self.project.clone();
        let release = project
            .release_mut(name)
            .ok_or_else(|| QuillError::release_not_found(name))?;
        release.title = new_name.to_string();
        release.log_event(&self.actor, format!("renamed from {name}"), comment);
        let release = release.clone();

        let written = moved
            .into_iter()
            .try_for_each(|mut issue| {
                issue.release = Some(new_name.to_string());
                issue.log_event(
                    &self.actor,
                    format!("assigned to release {new_name} from {name}"),
                    None,
                );
                self.store.write_issue(&issue)
            })
            .and_then(|()| self.store.write_project(&project));

        self.refresh()?;
        if let Err(e) = written {
            tracing::warn!(from = %name, to = %new_name, error = %e, "release rename incomplete");
            return Err(e);
        }
        tracing::info!(from = %name, to = %new_name, "renamed release");
        Ok(release)
    }

    /// Mark a release as made.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound`, or `Validation` if already released.
    pub fn make_release(&mut self, name: &str, comment: Option<String>) -> Result<Release> {
        self.require_unreleased(name)?;

        let mut project = self.project.clone();
        let release = project
            .release_mut(name)
            .ok_or_else(|| QuillError::release_not_found(name))?;
        release.status = ReleaseStatus::Released;
        release.release_time = Some(stamp_now());
        release.log_event(&self.actor, "released", comment);
        let release = release.clone();

        self.save_project(&project)?;
        tracing::info!(release = %name, "made release");
        Ok(release)
    }

    /// Remove a release from the project. Issues keep their release string.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound` for an unknown release.
    pub fn remove_release(&mut self, name: &str) -> Result<()> {
        self.release_ref(name)?;
        let mut project = self.project.clone();
        project.releases.retain(|r| r.title != name);
        self.save_project(&project)?;
        tracing::info!(release = %name, "removed release");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Validation` for a bad name and `ComponentExists` for a
    /// duplicate.
    pub fn add_component(&mut self, name: &str) -> Result<()> {
        ComponentValidator::validate(name)?;
        if self.project.has_component(name) {
            return Err(QuillError::ComponentExists {
                name: name.to_string(),
            });
        }
        let mut project = self.project.clone();
        project.components.push(Component {
            name: name.to_string(),
        });
        self.save_project(&project)?;
        tracing::info!(component = %name, "added component");
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn issues_by_release(&self, release: Option<&str>, include_closed: bool) -> Vec<&Issue> {
        self.cache.get_issues_by_release(release, include_closed)
    }

    /// # Errors
    ///
    /// Returns `IssueNotFound` for an unknown key.
    pub fn show(&self, key: &str) -> Result<&Issue> {
        self.cache
            .get_issue(key)
            .ok_or_else(|| QuillError::issue_not_found(key))
    }

    /// Log entries across all issues, newest first.
    #[must_use]
    pub fn recent_log(&self, limit: usize) -> Vec<LogLine> {
        let mut lines: Vec<LogLine> = self
            .cache
            .issues()
            .iter()
            .flat_map(|issue| {
                issue.log.iter().map(|entry| LogLine {
                    time: entry.time,
                    actor: entry.actor.clone(),
                    action: entry.action.clone(),
                    comment: entry.comment.clone(),
                    issue_name: issue.name.clone(),
                    issue_title: issue.title.clone(),
                })
            })
            .collect();
        lines.sort_by(|a, b| b.time.cmp(&a.time));
        lines.truncate(limit);
        lines
    }

    /// Issues whose title or description matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `Regex` for an invalid pattern.
    pub fn grep(&self, pattern: &str, ignore_case: bool) -> Result<Vec<&Issue>> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(self
            .cache
            .issues()
            .iter()
            .filter(|i| re.is_match(&i.title) || i.description.as_deref().is_some_and(|d| re.is_match(d)))
            .collect())
    }

    /// Closed issues of a release, grouped by type. Bugfixes, features and
    /// tasks come first, custom types after in order of appearance.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound` for an unknown release.
    pub fn changelog(&self, release: &str) -> Result<Vec<ChangelogSection>> {
        self.release_ref(release)?;

        let mut sections: Vec<ChangelogSection> = Vec::new();
        for issue in self.cache.get_issues_by_release(Some(release), true) {
            if !issue.is_closed() {
                continue;
            }
            match sections.iter_mut().find(|s| s.issue_type == issue.issue_type) {
                Some(section) => section.issues.push(issue.clone()),
                None => sections.push(ChangelogSection {
                    issue_type: issue.issue_type.clone(),
                    issues: vec![issue.clone()],
                }),
            }
        }
        sections.sort_by_key(|s| type_rank(&s.issue_type));
        Ok(sections)
    }

    /// Issues grouped by unreleased release in project order, then the
    /// unassigned ones.
    #[must_use]
    pub fn todo(&self, include_closed: bool) -> Vec<ReleaseGroup> {
        let mut groups: Vec<ReleaseGroup> = self
            .cache
            .releases()
            .iter()
            .map(|release| ReleaseGroup {
                release: Some(release.title.clone()),
                issues: self
                    .cache
                    .get_issues_by_release(Some(release.title.as_str()), include_closed)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
            .collect();
        groups.push(ReleaseGroup {
            release: None,
            issues: self
                .cache
                .get_issues_by_release(None, include_closed)
                .into_iter()
                .cloned()
                .collect(),
        });
        groups
    }
}

impl Tracker<FileStore> {
    /// Move the issues of a released release into an archive directory.
    ///
    /// The archive receives a copy of the project record and the record of
    /// every issue assigned to the release. Those issues are then dropped.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseNotFound`, `Validation` if the release has not been
    /// made, `ArchiveExists` if the target directory exists, or `Io`.
    pub fn archive_release(&mut self, name: &str, dir: Option<PathBuf>) -> Result<ArchiveReport> {
        if !self.release_ref(name)?.is_released() {
            return Err(QuillError::validation(
                "release",
                format!("{name} has not been released"),
            ));
        }

        let target = dir.unwrap_or_else(|| default_archive_dir(self.store.dir(), name));
        if target.exists() {
            return Err(QuillError::ArchiveExists { path: target });
        }
        fs::create_dir_all(&target)?;
        fs::copy(self.store.project_path(), target.join(PROJECT_FILE))?;

        let archive = FileStore::new(&target);
        let ids: Vec<String> = self
            .cache
            .get_issues_by_release(Some(name), true)
            .iter()
            .map(|i| i.id.clone())
            .collect();

        let mut archived = Vec::new();
        for id in ids {
            let src = self.store.issue_path(&id);
            match fs::copy(&src, archive.issue_path(&id)) {
                Ok(_) => archived.push(id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %src.display(), "record missing, not archived");
                }
                Err(e) => return Err(e.into()),
            }
        }

        for id in &archived {
            self.store.delete_issue(id)?;
        }
        self.refresh()?;

        tracing::info!(
            release = %name,
            dir = %target.display(),
            count = archived.len(),
            "archived release"
        );
        Ok(ArchiveReport {
            release: name.to_string(),
            dir: target,
            issues: archived,
        })
    }
}

/// `<parent of issue dir>/quill-archive-<release>`.
#[must_use]
pub fn default_archive_dir(issue_dir: &Path, release: &str) -> PathBuf {
    issue_dir
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{ARCHIVE_DIR_PREFIX}{release}"))
}

fn already_released(name: &str) -> QuillError {
    QuillError::validation("release", format!("{name} is already released"))
}

const fn type_rank(issue_type: &IssueType) -> u8 {
    match issue_type {
        IssueType::Bugfix => 0,
        IssueType::Feature => 1,
        IssueType::Task => 2,
        IssueType::Custom(_) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    const ACTOR: &str = "Tester <test@example.com>";

    fn setup() -> (TempDir, Tracker<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::init(dir.path().join("issues"), "quill").unwrap();
        let tracker = Tracker::open(store, ACTOR).unwrap();
        (dir, tracker)
    }

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn last_action(issue: &Issue) -> &str {
        &issue.log.last().unwrap().action
    }

    #[test]
    fn test_add_issue_defaults() {
        let (_dir, mut tracker) = setup();
        let issue = tracker.add_issue(new_issue("First")).unwrap();

        assert_eq!(issue.name, "quill-1");
        assert_eq!(issue.status, Status::Unstarted);
        assert_eq!(issue.component.as_deref(), Some("quill"));
        assert_eq!(issue.creator.as_deref(), Some(ACTOR));
        assert_eq!(issue.log.len(), 1);
        assert_eq!(last_action(&issue), "created");
        assert_eq!(issue.log[0].actor, ACTOR);
        assert!(tracker.store().issue_path(&issue.id).exists());
    }

    #[test]
    fn test_add_issue_rejects_blank_title() {
        let (_dir, mut tracker) = setup();
        let err = tracker.add_issue(new_issue("  ")).unwrap_err();
        assert!(matches!(err, QuillError::Validation { .. }));
        assert_eq!(tracker.cache().issue_count(), 0);
    }

    #[test]
    fn test_add_issue_checks_references() {
        let (_dir, mut tracker) = setup();
        let mut bad_component = new_issue("x");
        bad_component.component = Some("nope".to_string());
        assert!(matches!(
            tracker.add_issue(bad_component),
            Err(QuillError::ComponentNotFound { .. })
        ));

        let mut bad_release = new_issue("x");
        bad_release.release = Some("9.9".to_string());
        assert!(matches!(
            tracker.add_issue(bad_release),
            Err(QuillError::ReleaseNotFound { .. })
        ));
    }

    #[test]
    fn test_reopen_and_refresh_from_disk() {
        let (dir, mut tracker) = setup();
        tracker.add_issue(new_issue("One")).unwrap();
        tracker.add_issue(new_issue("Two")).unwrap();

        let store = FileStore::new(dir.path().join("issues"));
        let reopened = Tracker::open(store, ACTOR).unwrap();
        let names: Vec<&str> = reopened
            .cache()
            .issues()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["quill-1", "quill-2"]);
        assert_eq!(reopened.show("quill-2").unwrap().title, "Two");
    }

    #[test]
    fn test_status_transitions() {
        let (_dir, mut tracker) = setup();
        tracker.add_issue(new_issue("Work")).unwrap();

        let issue = tracker.start_work("quill-1", None).unwrap();
        assert_eq!(issue.status, Status::InProgress);
        assert_eq!(last_action(&issue), "started work");
        assert!(matches!(
            tracker.start_work("quill-1", None),
            Err(QuillError::InvalidTransition { .. })
        ));

        let issue = tracker.stop_work("quill-1", Some("lunch".to_string())).unwrap();
        assert_eq!(issue.status, Status::Paused);
        assert_eq!(issue.log.last().unwrap().comment.as_deref(), Some("lunch"));
        assert!(tracker.stop_work("quill-1", None).is_err());

        let issue = tracker.start_work("quill-1", None).unwrap();
        assert_eq!(issue.status, Status::InProgress);

        let issue = tracker
            .close_issue("quill-1", Disposition::WontFix, None)
            .unwrap();
        assert_eq!(issue.status, Status::Closed);
        assert_eq!(issue.disposition.as_deref(), Some("won't fix"));
        assert_eq!(last_action(&issue), "closed with disposition won't fix");
        assert!(tracker.start_work("quill-1", None).is_err());
        assert!(tracker.close_issue("quill-1", Disposition::Fixed, None).is_err());

        let issue = tracker.reopen_issue("quill-1", None).unwrap();
        assert_eq!(issue.status, Status::Unstarted);
        assert!(issue.disposition.is_none());
        assert!(tracker.reopen_issue("quill-1", None).is_err());
        assert_eq!(issue.log.len(), 6);
    }

    #[test]
    fn test_edit_issue() {
        let (_dir, mut tracker) = setup();
        tracker.add_component("ui").unwrap();
        tracker.add_issue(new_issue("Old")).unwrap();

        assert!(matches!(
            tracker.edit_issue("quill-1", &IssueUpdate::default(), None),
            Err(QuillError::NothingToDo { .. })
        ));

        let update = IssueUpdate {
            title: Some("New".to_string()),
            description: Some(Some("Details".to_string())),
            issue_type: Some(IssueType::Feature),
            component: Some("ui".to_string()),
        };
        let issue = tracker.edit_issue("quill-1", &update, None).unwrap();
        assert_eq!(issue.title, "New");
        assert_eq!(issue.description.as_deref(), Some("Details"));
        assert_eq!(issue.issue_type, IssueType::Feature);
        assert_eq!(issue.name, "ui-1");
        assert_eq!(last_action(&issue), "edited");
    }

    #[test]
    fn test_unknown_key() {
        let (_dir, mut tracker) = setup();
        assert!(matches!(
            tracker.start_work("quill-9", None),
            Err(QuillError::IssueNotFound { .. })
        ));
        assert!(tracker.show("quill-9").is_err());
    }

    #[test]
    fn test_comment_and_reference() {
        let (_dir, mut tracker) = setup();
        tracker.add_issue(new_issue("Talk")).unwrap();

        assert!(tracker.comment_issue("quill-1", " ").is_err());
        let issue = tracker.comment_issue("quill-1", "looks good").unwrap();
        assert_eq!(last_action(&issue), "commented");
        assert_eq!(issue.log.last().unwrap().comment.as_deref(), Some("looks good"));

        let issue = tracker
            .add_reference("quill-1", "https://example.com/a", None)
            .unwrap();
        assert_eq!(last_action(&issue), "added reference 1");
        let issue = tracker
            .add_reference("quill-1", "https://example.com/b", None)
            .unwrap();
        assert_eq!(last_action(&issue), "added reference 2");
        assert_eq!(issue.references.len(), 2);
    }

    #[test]
    fn test_assign_and_unassign() {
        let (_dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        tracker.add_release("2.0", None).unwrap();
        tracker.add_issue(new_issue("Ship it")).unwrap();

        let issue = tracker.assign_issue("quill-1", Some("1.0"), None).unwrap();
        assert_eq!(last_action(&issue), "assigned to release 1.0 from unassigned");
        assert!(matches!(
            tracker.assign_issue("quill-1", Some("1.0"), None),
            Err(QuillError::NothingToDo { .. })
        ));

        let issue = tracker.assign_issue("quill-1", Some("2.0"), None).unwrap();
        assert_eq!(last_action(&issue), "assigned to release 2.0 from 1.0");

        let issue = tracker.assign_issue("quill-1", None, None).unwrap();
        assert_eq!(last_action(&issue), "unassigned from release 2.0");
        assert!(issue.release.is_none());
        assert!(tracker.assign_issue("quill-1", None, None).is_err());
        assert!(matches!(
            tracker.assign_issue("quill-1", Some("3.0"), None),
            Err(QuillError::ReleaseNotFound { .. })
        ));
    }

    #[test]
    fn test_drop_issue_renames_rest() {
        let (_dir, mut tracker) = setup();
        let first = tracker.add_issue(new_issue("One")).unwrap();
        tracker.add_issue(new_issue("Two")).unwrap();

        let dropped = tracker.drop_issue("quill-1").unwrap();
        assert_eq!(dropped.id, first.id);
        assert!(!tracker.store().issue_path(&first.id).exists());
        assert_eq!(tracker.cache().issue_count(), 1);
        assert_eq!(tracker.show("quill-1").unwrap().title, "Two");
    }

    #[test]
    fn test_release_lifecycle() {
        let (_dir, mut tracker) = setup();
        let release = tracker.add_release("1.0", None).unwrap();
        assert_eq!(release.log[0].action, "created");
        assert!(matches!(
            tracker.add_release("1.0", None),
            Err(QuillError::ReleaseExists { .. })
        ));
        assert!(tracker.add_release("a/b", None).is_err());
        assert_eq!(tracker.cache().release_count(), 1);

        let made = tracker.make_release("1.0", None).unwrap();
        assert!(made.is_released());
        assert!(made.release_time.is_some());
        assert_eq!(made.log.last().unwrap().action, "released");
        assert!(tracker.make_release("1.0", None).is_err());

        // Released releases leave the cache but stay in the project.
        assert_eq!(tracker.cache().release_count(), 0);
        assert!(tracker.project().release("1.0").is_some());

        tracker.remove_release("1.0").unwrap();
        assert!(tracker.project().release("1.0").is_none());
        assert!(tracker.remove_release("1.0").is_err());
    }

    #[test]
    fn test_edit_release_moves_issues() {
        let (_dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        let mut issue = new_issue("Moving");
        issue.release = Some("1.0".to_string());
        tracker.add_issue(issue).unwrap();

        let release = tracker.edit_release("1.0", "1.1", None).unwrap();
        assert_eq!(release.title, "1.1");
        assert_eq!(release.log.last().unwrap().action, "renamed from 1.0");

        let issue = tracker.show("quill-1").unwrap();
        assert_eq!(issue.release.as_deref(), Some("1.1"));
        assert_eq!(last_action(issue), "assigned to release 1.1 from 1.0");
        assert!(tracker.cache().get_release("1.1").is_some());
        assert!(tracker.cache().get_release("1.0").is_none());
    }

    /// File store whose project writes can be made to fail.
    struct FlakyStore {
        inner: FileStore,
        fail_project_writes: Cell<bool>,
    }

    impl RecordStore for FlakyStore {
        fn list_issue_ids(&self) -> Result<Vec<String>> {
            self.inner.list_issue_ids()
        }

        fn read_issue(&self, id: &str) -> Result<Option<Issue>> {
            self.inner.read_issue(id)
        }

        fn write_issue(&self, issue: &Issue) -> Result<()> {
            self.inner.write_issue(issue)
        }

        fn delete_issue(&self, id: &str) -> Result<bool> {
            self.inner.delete_issue(id)
        }

        fn read_project(&self) -> Result<Project> {
            self.inner.read_project()
        }

        fn write_project(&self, project: &Project) -> Result<()> {
            if self.fail_project_writes.get() {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.write_project(project)
        }
    }

    #[test]
    fn test_edit_release_failed_project_write_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let inner = FileStore::init(dir.path().join("issues"), "quill").unwrap();
        let store = FlakyStore {
            inner,
            fail_project_writes: Cell::new(false),
        };
        let mut tracker = Tracker::open(store, ACTOR).unwrap();
        tracker.add_release("1.0", None).unwrap();
        let mut issue = new_issue("Moving");
        issue.release = Some("1.0".to_string());
        tracker.add_issue(issue).unwrap();

        tracker.store().fail_project_writes.set(true);
        let err = tracker.edit_release("1.0", "1.1", None).unwrap_err();
        assert!(matches!(err, QuillError::Io(_)));

        // The cache reflects what reached the disk.
        assert!(tracker.project().release("1.0").is_some());
        assert!(tracker.project().release("1.1").is_none());
        let moved = tracker.show("quill-1").unwrap();
        assert_eq!(moved.release.as_deref(), Some("1.1"));

        tracker.store().fail_project_writes.set(false);
        tracker.edit_release("1.0", "1.1", None).unwrap();
        assert!(tracker.project().release("1.1").is_some());
        let issue = tracker.show("quill-1").unwrap();
        let moves = issue
            .log
            .iter()
            .filter(|e| e.action == "assigned to release 1.1 from 1.0")
            .count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn test_remove_release_keeps_issue_assignment() {
        let (_dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        let mut issue = new_issue("Orphan");
        issue.release = Some("1.0".to_string());
        tracker.add_issue(issue).unwrap();

        tracker.remove_release("1.0").unwrap();
        assert_eq!(tracker.issues_by_release(Some("1.0"), false).len(), 1);
    }

    #[test]
    fn test_add_component() {
        let (_dir, mut tracker) = setup();
        tracker.add_component("ui").unwrap();
        assert!(matches!(
            tracker.add_component("ui"),
            Err(QuillError::ComponentExists { .. })
        ));
        assert!(tracker.add_component("two words").is_err());
        assert!(tracker.project().has_component("ui"));
    }

    #[test]
    fn test_archive_release() {
        let (dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        let mut shipped = new_issue("Shipped");
        shipped.release = Some("1.0".to_string());
        let shipped = tracker.add_issue(shipped).unwrap();
        tracker.add_issue(new_issue("Later")).unwrap();
        tracker.close_issue(&shipped.id, Disposition::Fixed, None).unwrap();

        assert!(tracker.archive_release("1.0", None).is_err());
        tracker.make_release("1.0", None).unwrap();

        let report = tracker.archive_release("1.0", None).unwrap();
        let expected_dir = dir.path().join("quill-archive-1.0");
        assert_eq!(report.dir, expected_dir);
        assert_eq!(report.issues, vec![shipped.id.clone()]);
        assert!(expected_dir.join(PROJECT_FILE).exists());
        assert!(FileStore::new(&expected_dir).issue_path(&shipped.id).exists());
        assert!(!tracker.store().issue_path(&shipped.id).exists());
        assert_eq!(tracker.cache().issue_count(), 1);

        assert!(matches!(
            tracker.archive_release("1.0", None),
            Err(QuillError::ArchiveExists { .. })
        ));
    }

    #[test]
    fn test_recent_log_newest_first() {
        let (_dir, mut tracker) = setup();
        tracker.add_issue(new_issue("One")).unwrap();
        tracker.start_work("quill-1", None).unwrap();
        tracker.add_issue(new_issue("Two")).unwrap();

        let log = tracker.recent_log(2);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].issue_name, "quill-2");
        assert_eq!(log[0].action, "created");
        assert_eq!(log[1].action, "started work");
        assert_eq!(log[1].issue_title, "One");
    }

    #[test]
    fn test_grep() {
        let (_dir, mut tracker) = setup();
        tracker.add_issue(new_issue("Fix Parser crash")).unwrap();
        let mut described = new_issue("Other");
        described.description = Some("the parser again".to_string());
        tracker.add_issue(described).unwrap();

        assert_eq!(tracker.grep("Parser", false).unwrap().len(), 1);
        assert_eq!(tracker.grep("parser", true).unwrap().len(), 2);
        assert!(matches!(tracker.grep("(", false), Err(QuillError::Regex(_))));
    }

    #[test]
    fn test_changelog_groups_closed_by_type() {
        let (_dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        for (title, issue_type) in [
            ("Task one", IssueType::Task),
            ("Bug one", IssueType::Bugfix),
            ("Open feature", IssueType::Feature),
        ] {
            let mut issue = new_issue(title);
            issue.issue_type = issue_type;
            issue.release = Some("1.0".to_string());
            tracker.add_issue(issue).unwrap();
        }
        tracker.close_issue("quill-1", Disposition::Fixed, None).unwrap();
        tracker.close_issue("quill-2", Disposition::Fixed, None).unwrap();

        let sections = tracker.changelog("1.0").unwrap();
        let types: Vec<&IssueType> = sections.iter().map(|s| &s.issue_type).collect();
        assert_eq!(types, vec![&IssueType::Bugfix, &IssueType::Task]);
        assert!(tracker.changelog("2.0").is_err());
    }

    #[test]
    fn test_todo_groups() {
        let (_dir, mut tracker) = setup();
        tracker.add_release("1.0", None).unwrap();
        let mut planned = new_issue("Planned");
        planned.release = Some("1.0".to_string());
        tracker.add_issue(planned).unwrap();
        tracker.add_issue(new_issue("Loose")).unwrap();
        tracker.add_issue(new_issue("Done")).unwrap();
        tracker.close_issue("quill-3", Disposition::Fixed, None).unwrap();

        let groups = tracker.todo(false);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].release.as_deref(), Some("1.0"));
        assert_eq!(groups[0].issues.len(), 1);
        assert!(groups[1].release.is_none());
        assert_eq!(groups[1].issues.len(), 1);
        assert_eq!(tracker.todo(true)[1].issues.len(), 2);
    }
}
