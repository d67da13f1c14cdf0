use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transitguard_core::AppError;

/// How per-capability outcomes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityMode {
    /// Every capability must be allowed.
    #[default]
    All,
    /// At least one capability must be allowed.
    Any,
}

impl CapabilityMode {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }

    /// Combines individual outcomes.
    ///
    /// An empty outcome list is allowed in `All` mode and denied in `Any` mode.
    #[must_use]
    pub fn combine(&self, outcomes: &[CheckOutcome]) -> bool {
        match self {
            Self::All => outcomes.iter().all(|outcome| outcome.allowed),
            Self::Any => outcomes.iter().any(|outcome| outcome.allowed),
        }
    }
}

impl FromStr for CapabilityMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(AppError::Validation(format!(
                "unknown capability mode '{value}'"
            ))),
        }
    }
}

/// Resource instance ownership gate attached to a protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRequirement {
    /// Resource type tag used to select the owner lookup.
    pub resource_type: String,
    /// Name of the path parameter carrying the resource id.
    pub field: String,
}

/// Capability metadata attached to a protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequirement {
    /// Required capability names.
    pub capabilities: Vec<String>,
    /// Combination mode.
    pub mode: CapabilityMode,
    /// Optional ownership gate evaluated after the capability check.
    pub ownership: Option<OwnershipRequirement>,
}

impl CapabilityRequirement {
    /// Requires every listed capability.
    #[must_use]
    pub fn all<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(capabilities, CapabilityMode::All)
    }

    /// Requires at least one of the listed capabilities.
    #[must_use]
    pub fn any<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(capabilities, CapabilityMode::Any)
    }

    fn with_mode<I, S>(capabilities: I, mode: CapabilityMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            mode,
            ownership: None,
        }
    }

    /// Adds an ownership gate keyed by a resource type and path field.
    #[must_use]
    pub fn with_ownership(
        mut self,
        resource_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.ownership = Some(OwnershipRequirement {
            resource_type: resource_type.into(),
            field: field.into(),
        });
        self
    }

    /// Returns whether an ownership check is required.
    #[must_use]
    pub fn requires_ownership(&self) -> bool {
        self.ownership.is_some()
    }
}

/// Layer that decided a single capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// A user-level grant.
    User,
    /// Compiled defaults or a role-level grant.
    Role,
    /// Nothing granted the capability, or a user-level revoke denied it.
    None,
}

impl DecisionSource {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::None => "none",
        }
    }
}

/// Outcome of a single capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Whether access is granted.
    pub allowed: bool,
    /// Deciding layer.
    pub source: DecisionSource,
    /// Expiry of the deciding user-level grant.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CheckOutcome {
    /// Denied outcome.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            allowed: false,
            source: DecisionSource::None,
            expires_at: None,
        }
    }

    /// Allowed by the role layer.
    #[must_use]
    pub fn allowed_by_role() -> Self {
        Self {
            allowed: true,
            source: DecisionSource::Role,
            expires_at: None,
        }
    }

    /// Allowed by a user-level grant.
    #[must_use]
    pub fn allowed_by_user(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            allowed: true,
            source: DecisionSource::User,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CapabilityMode, CapabilityRequirement, CheckOutcome};

    #[test]
    fn all_mode_denies_when_one_outcome_is_denied() {
        let outcomes = [CheckOutcome::allowed_by_role(), CheckOutcome::denied()];
        assert!(!CapabilityMode::All.combine(&outcomes));
    }

    #[test]
    fn any_mode_allows_when_one_outcome_is_allowed() {
        let outcomes = [CheckOutcome::allowed_by_role(), CheckOutcome::denied()];
        assert!(CapabilityMode::Any.combine(&outcomes));
    }

    #[test]
    fn requirement_builder_attaches_ownership() {
        let requirement =
            CapabilityRequirement::any(["profile.read"]).with_ownership("users", "user_id");
        assert!(requirement.requires_ownership());
        assert_eq!(requirement.mode, CapabilityMode::Any);
        assert_eq!(requirement.capabilities, vec!["profile.read".to_owned()]);
    }
}
