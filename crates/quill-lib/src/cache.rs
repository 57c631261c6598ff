//! In-memory item cache.
//!
//! Holds every known issue and release of one project. It is rebuilt from
//! the record store by [`crate::tracker::Tracker::refresh`] and never reads
//! or writes files itself.
//!
//! All operations are permissive: a miss is `None`, a rejected insert is
//! `false`, and a rejected call leaves both collections untouched.

use crate::model::{DEFAULT_NAME_PREFIX, Issue, Release, Status};

/// Issue and release index with derived display names.
#[derive(Debug, Clone, Default)]
pub struct ItemCache {
    issues: Vec<Issue>,
    releases: Vec<Release>,
}

impl ItemCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Issues
    // ========================================================================

    /// Insert or replace an issue.
    ///
    /// Rejects issues without a title or identifier. When an issue with
    /// the same identifier is already cached, the new one takes over its
    /// display name, the old entry is removed and the new one is appended.
    pub fn add_issue(&mut self, issue: Issue) -> bool {
        if !issue.is_valid() {
            tracing::trace!(id = %issue.id, "rejecting invalid issue");
            return false;
        }

        let mut issue = issue;
        if let Some(pos) = self.issues.iter().position(|i| i.id == issue.id) {
            let old = self.issues.remove(pos);
            issue.name = old.name;
        }
        self.issues.push(issue);
        true
    }

    /// Look up by identifier or display name. First match in collection
    /// order wins.
    #[must_use]
    pub fn get_issue(&self, key: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == key || i.name == key)
    }

    /// Remove by identifier. Display names are not accepted here.
    pub fn remove_issue(&mut self, id: &str) -> bool {
        match self.issues.iter().position(|i| i.id == id) {
            Some(pos) => {
                self.issues.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Stable sort by creation time, oldest first.
    ///
    /// Creation times are held in UTC, so records written with different
    /// offsets (or none) order correctly.
    pub fn sort_issues(&mut self, rename: bool) {
        self.issues.sort_by_key(|i| i.created);
        if rename {
            self.rename_issues();
        }
    }

    /// Assign `<component>-<position>` to every issue in current order.
    ///
    /// Names are positional: adding, removing or re-sorting issues and
    /// renaming again can give an existing issue a different name.
    pub fn rename_issues(&mut self) {
        for (idx, issue) in self.issues.iter_mut().enumerate() {
            let prefix = issue
                .component
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_NAME_PREFIX);
            issue.name = format!("{prefix}-{}", idx + 1);
        }
    }

    /// Issues whose release string equals `release` exactly.
    ///
    /// `None` selects unassigned issues. The release does not have to be
    /// cached: referential integrity is the caller's concern.
    #[must_use]
    pub fn get_issues_by_release(&self, release: Option<&str>, include_closed: bool) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.release.as_deref() == release)
            .filter(|i| include_closed || !i.is_closed())
            .collect()
    }

    /// Status lookup by display name only.
    #[must_use]
    pub fn get_issue_status_by_id(&self, name: &str) -> Option<Status> {
        self.issues.iter().find(|i| i.name == name).map(|i| i.status)
    }

    /// Longest display name in characters, 0 when there are none.
    #[must_use]
    pub fn get_issue_name_max_len(&self) -> usize {
        self.issues
            .iter()
            .map(|i| i.name.chars().count())
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    // ========================================================================
    // Releases
    // ========================================================================

    /// Insert or replace a release, keyed by title.
    pub fn add_release(&mut self, release: Release) -> bool {
        if !release.is_valid() {
            return false;
        }
        self.remove_release(&release.title);
        self.releases.push(release);
        true
    }

    /// Remove by title. Issues pointing at the release are left alone.
    pub fn remove_release(&mut self, title: &str) -> bool {
        match self.releases.iter().position(|r| r.title == title) {
            Some(pos) => {
                self.releases.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get_release(&self, title: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.title == title)
    }

    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    #[must_use]
    pub fn release_count(&self) -> usize {
        self.releases.len()
    }

    /// Drop every issue and release.
    pub fn clear(&mut self) {
        self.issues.clear();
        self.releases.clear();
    }
}
