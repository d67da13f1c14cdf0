use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use transitguard_core::{AppError, AppResult, Principal, Role, UserId};
use transitguard_domain::{PermissionDefinition, PermissionId};

use crate::AuthorizationService;
use crate::access_ports::{
    PermissionRepository, RoleOverrideRepository, UserDirectory, UserOverrideRepository,
};

mod role_assignments;
mod user_assignments;

/// Application service for role-level and user-level capability assignments.
#[derive(Clone)]
pub struct PermissionAssignmentService {
    authorization_service: AuthorizationService,
    permissions: Arc<dyn PermissionRepository>,
    role_overrides: Arc<dyn RoleOverrideRepository>,
    user_overrides: Arc<dyn UserOverrideRepository>,
    users: Arc<dyn UserDirectory>,
}

impl PermissionAssignmentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        permissions: Arc<dyn PermissionRepository>,
        role_overrides: Arc<dyn RoleOverrideRepository>,
        user_overrides: Arc<dyn UserOverrideRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            authorization_service,
            permissions,
            role_overrides,
            user_overrides,
            users,
        }
    }

    async fn require_active_permission(&self, id: PermissionId) -> AppResult<PermissionDefinition> {
        self.permissions
            .find_permission(id)
            .await?
            .filter(PermissionDefinition::is_active)
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))
    }

    /// Resolves every id to an active permission before anything is written.
    async fn require_active_permissions(
        &self,
        ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionId>> {
        let requested = ids.iter().copied().collect::<BTreeSet<_>>();
        if requested.is_empty() {
            return Err(AppError::Validation(
                "at least one permission id is required".to_owned(),
            ));
        }

        let requested = requested.into_iter().collect::<Vec<_>>();
        let found = self
            .permissions
            .find_active_permissions_by_ids(&requested)
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect::<BTreeSet<_>>();

        let missing = requested
            .iter()
            .filter(|id| !found.contains(id))
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "permission ids [{}] do not resolve to active permissions",
                missing.join(", ")
            )));
        }

        Ok(requested)
    }

    async fn require_user_role(&self, user_id: UserId) -> AppResult<Role> {
        self.users
            .find_user_role(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    fn log_assignment(actor: &Principal, subject: &str, count: usize, granted: bool) {
        info!(
            actor = %actor.user_id(),
            subject,
            count,
            granted,
            "permission overrides assigned"
        );
    }
}
