use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transitguard_core::{Role, UserId};

use crate::{PermissionId, PermissionName};

/// Role-level grant or revoke layered over the compiled defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverride {
    /// Role the override applies to.
    pub role: Role,
    /// Referenced capability.
    pub permission_id: PermissionId,
    /// Capability name resolved from the referenced row.
    pub permission_name: PermissionName,
    /// Grant (`true`) or revoke (`false`).
    pub granted: bool,
    /// Last time the row was written.
    pub updated_at: DateTime<Utc>,
    /// Tombstone set when the row was logically removed.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// User-level grant or revoke with optional expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverride {
    /// User the override applies to.
    pub user_id: UserId,
    /// Referenced capability.
    pub permission_id: PermissionId,
    /// Capability name resolved from the referenced row.
    pub permission_name: PermissionName,
    /// Grant (`true`) or revoke (`false`).
    pub granted: bool,
    /// Principal that wrote the row.
    pub granted_by: UserId,
    /// Expiry of a grant. Ignored for revokes.
    pub expires_at: Option<DateTime<Utc>>,
    /// Last time the row was written.
    pub updated_at: DateTime<Utc>,
    /// Tombstone set when the row was logically removed.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserOverride {
    /// Returns whether the row explicitly denies the capability.
    ///
    /// Revokes never expire.
    #[must_use]
    pub fn is_revoke(&self) -> bool {
        !self.granted
    }

    /// Returns whether the row grants the capability at `now`.
    ///
    /// An expired grant stays in storage and is simply ignored.
    #[must_use]
    pub fn is_effective_grant_at(&self, now: DateTime<Utc>) -> bool {
        self.granted
            && self
                .expires_at
                .is_none_or(|expires_at| expires_at > now)
    }
}

/// Outcome of the user layer over every active row sharing one capability name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLayerDecision {
    /// At least one row revokes the capability.
    Revoked,
    /// At least one grant is effective. `expires_at` is the latest expiry
    /// among them, `None` when one never expires.
    Granted {
        /// Expiry of the longest-lived effective grant.
        expires_at: Option<DateTime<Utc>>,
    },
    /// No row decides; resolution falls through to the role layers.
    Undecided,
}

impl UserLayerDecision {
    /// Folds the rows of one `(user, name)` pair at `now`.
    ///
    /// The result does not depend on row order.
    #[must_use]
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = &'a UserOverride>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut decision = Self::Undecided;
        for row in rows {
            if row.is_revoke() {
                return Self::Revoked;
            }
            if !row.is_effective_grant_at(now) {
                continue;
            }

            decision = match (decision, row.expires_at) {
                (Self::Granted { expires_at: None }, _) | (_, None) => {
                    Self::Granted { expires_at: None }
                }
                (Self::Granted { expires_at: Some(current) }, Some(candidate)) => {
                    Self::Granted {
                        expires_at: Some(current.max(candidate)),
                    }
                }
                (_, Some(candidate)) => Self::Granted {
                    expires_at: Some(candidate),
                },
            };
        }

        decision
    }
}
