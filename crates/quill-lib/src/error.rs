//! Error types for `quill-lib`.
//!
//! The item cache never returns these: misses and rejected inserts are
//! `None`/`false`. Everything that touches records, the project file or a
//! user-requested action reports through `QuillError`.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for quill operations.
#[derive(Error, Debug)]
pub enum QuillError {
    // === Issue Errors ===
    /// No issue matches the given identifier or display name.
    #[error("Issue not found: {key}")]
    IssueNotFound { key: String },

    /// The requested status change is not allowed from the current status.
    #[error("Cannot {action} {name}: issue is {status}")]
    InvalidTransition {
        name: String,
        action: String,
        status: String,
    },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    // === Release Errors ===
    /// No release with the given title.
    #[error("Release not found: {name}")]
    ReleaseNotFound { name: String },

    /// A release with this title already exists in the project.
    #[error("Release already exists: {name}")]
    ReleaseExists { name: String },

    // === Component Errors ===
    /// No component with the given name.
    #[error("Component not found: {name}")]
    ComponentNotFound { name: String },

    /// A component with this name already exists in the project.
    #[error("Component already exists: {name}")]
    ComponentExists { name: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Record Errors ===
    /// A record file could not be decoded.
    #[error("Malformed record {}: {reason}", path.display())]
    Record { path: PathBuf, reason: String },

    // === Workspace Errors ===
    /// No project record in the issue directory.
    #[error("Not a quill workspace (run `ql init` first)")]
    NotInitialized,

    /// A project record already exists.
    #[error("Already initialized at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    /// Archive target directory already exists.
    #[error("Archive directory already exists: {}", path.display())]
    ArchiveExists { path: PathBuf },

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File not found at the specified path.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid search pattern.
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    // === Operational Errors ===
    /// The action would not change anything.
    #[error("Nothing to do: {reason}")]
    NothingToDo { reason: String },
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for QuillError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            reason: err.message,
        }
    }
}

impl QuillError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    pub(crate) fn issue_not_found(key: &str) -> Self {
        Self::IssueNotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn release_not_found(name: &str) -> Self {
        Self::ReleaseNotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn nothing_to_do(reason: impl Into<String>) -> Self {
        Self::NothingToDo {
            reason: reason.into(),
        }
    }
}

/// Result type using `QuillError`.
pub type Result<T> = std::result::Result<T, QuillError>;
