//! Validation helpers.
//!
//! These routines check field constraints before anything is written and
//! return structured validation errors. They never touch the store.

use crate::error::ValidationError;
use crate::model::Issue;
use crate::util::is_valid_id_format;

const MAX_TITLE_LEN: usize = 500;
const MAX_RELEASE_LEN: usize = 100;

/// Validates issue fields.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate an issue and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // ID: Required, 40 lowercase hex chars.
        if issue.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "cannot be empty"));
        } else if !is_valid_id_format(&issue.id) {
            errors.push(ValidationError::new(
                "id",
                "invalid format (expected 40 hex characters)",
            ));
        }

        // Title: Required, max 500 chars.
        if issue.title.trim().is_empty() {
            errors.push(ValidationError::new("title", "cannot be empty"));
        }
        if issue.title.chars().count() > MAX_TITLE_LEN {
            errors.push(ValidationError::new("title", "exceeds 500 characters"));
        }

        if issue
            .component
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            errors.push(ValidationError::new("component", "cannot be blank"));
        }

        if issue.references.iter().any(|r| r.trim().is_empty()) {
            errors.push(ValidationError::new("references", "cannot contain blank entries"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates release names.
pub struct ReleaseValidator;

impl ReleaseValidator {
    /// Release names end up as archive directory names, so path separators
    /// and control characters are refused.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is invalid.
    pub fn validate(name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::new("release", "cannot be empty"));
        }

        if name.chars().count() > MAX_RELEASE_LEN {
            return Err(ValidationError::new("release", "exceeds 100 characters"));
        }

        if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(ValidationError::new(
                "release",
                "invalid characters (no slashes or control characters)",
            ));
        }

        Ok(())
    }
}

/// Validates component names.
pub struct ComponentValidator;

impl ComponentValidator {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty or has whitespace.
    pub fn validate(name: &str) -> Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::new("component", "cannot be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("component", "cannot contain whitespace"));
        }
        Ok(())
    }
}
