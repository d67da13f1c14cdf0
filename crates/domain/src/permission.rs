use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transitguard_core::{AppError, AppResult};

/// Maximum accepted length of a capability name.
const PERMISSION_NAME_MAX_LENGTH: usize = 128;

/// Storage identifier of a capability definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from its storage value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated capability name in `resource.action` form.
///
/// Both segments must be non-empty and use lowercase ASCII letters, digits,
/// `_` or `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName {
    value: String,
    separator: usize,
}

impl PermissionName {
    /// Parses and validates a capability name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.len() > PERMISSION_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission name must not exceed {PERMISSION_NAME_MAX_LENGTH} characters"
            )));
        }

        let Some((resource, action)) = trimmed.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' must use the 'resource.action' format"
            )));
        };

        if !is_valid_segment(resource) || !is_valid_segment(action) {
            return Err(AppError::Validation(format!(
                "permission name '{trimmed}' must contain two non-empty lowercase segments"
            )));
        }

        Ok(Self {
            separator: resource.len(),
            value: trimmed.to_owned(),
        })
    }

    /// Builds a capability name from its two segments.
    pub fn from_parts(resource: &str, action: &str) -> AppResult<Self> {
        Self::new(format!("{}.{}", resource.trim(), action.trim()))
    }

    /// Returns the full `resource.action` value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the resource segment.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.value[..self.separator]
    }

    /// Returns the action segment.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.value[self.separator + 1..]
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        })
}

impl FromStr for PermissionName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.value
    }
}

impl Display for PermissionName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Persisted capability definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Storage identifier.
    pub id: PermissionId,
    /// Unique `resource.action` name among active rows.
    pub name: PermissionName,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl PermissionDefinition {
    /// Returns the resource segment of the capability.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.name.resource()
    }

    /// Returns the action segment of the capability.
    #[must_use]
    pub fn action(&self) -> &str {
        self.name.action()
    }

    /// Returns whether the capability can still be assigned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
