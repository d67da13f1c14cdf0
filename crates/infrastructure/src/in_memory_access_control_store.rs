use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use transitguard_application::{
    PermissionRepository, RoleOverrideRepository, UserDirectory, UserOverrideBatch,
    UserOverrideRepository,
};
use transitguard_core::{AppError, AppResult, Role, UserId};
use transitguard_domain::{
    PermissionDefinition, PermissionId, PermissionName, RoleOverride, UserOverride,
};

#[derive(Debug, Clone)]
struct RoleRow {
    granted: bool,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct UserRow {
    granted: bool,
    granted_by: UserId,
    expires_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct StoreState {
    permissions: Vec<PermissionDefinition>,
    role_rows: HashMap<(Role, PermissionId), RoleRow>,
    user_rows: HashMap<(UserId, PermissionId), UserRow>,
    users: HashMap<UserId, Role>,
}

impl StoreState {
    fn permission(&self, id: PermissionId) -> Option<&PermissionDefinition> {
        self.permissions.iter().find(|permission| permission.id == id)
    }

    fn active_permission_mut(&mut self, id: PermissionId) -> AppResult<&mut PermissionDefinition> {
        self.permissions
            .iter_mut()
            .find(|permission| permission.id == id && permission.is_active())
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))
    }

    fn name_taken(&self, name: &PermissionName, except: Option<PermissionId>) -> bool {
        self.permissions.iter().any(|permission| {
            permission.is_active() && &permission.name == name && Some(permission.id) != except
        })
    }

    fn ensure_permissions_active(&self, ids: &[PermissionId]) -> AppResult<()> {
        match ids.iter().find(|id| {
            !self
                .permission(**id)
                .is_some_and(PermissionDefinition::is_active)
        }) {
            Some(id) => Err(AppError::Conflict(format!(
                "permission '{id}' is missing or deleted"
            ))),
            None => Ok(()),
        }
    }

    fn user_override(&self, user_id: UserId, permission_id: PermissionId, row: &UserRow) -> Option<UserOverride> {
        self.permission(permission_id).map(|permission| UserOverride {
            user_id,
            permission_id,
            permission_name: permission.name.clone(),
            granted: row.granted,
            granted_by: row.granted_by,
            expires_at: row.expires_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// In-memory access control store implementing every repository port.
///
/// Writes of one batch happen under a single lock, so a batch is applied
/// entirely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryAccessControlStore {
    state: RwLock<StoreState>,
}

impl InMemoryAccessControlStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user account, standing in for the authentication layer.
    pub async fn insert_user(&self, user_id: UserId, role: Role) {
        self.state.write().await.users.insert(user_id, role);
    }
}

#[async_trait]
impl PermissionRepository for InMemoryAccessControlStore {
    async fn create_permission(
        &self,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.write().await;
        if state.name_taken(name, None) {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let now = Utc::now();
        let next_id = state
            .permissions
            .iter()
            .map(|permission| permission.id.as_i64())
            .max()
            .unwrap_or_default()
            + 1;
        let permission = PermissionDefinition {
            id: PermissionId::new(next_id),
            name: name.clone(),
            description: description.map(ToOwned::to_owned),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.permissions.push(permission.clone());

        Ok(permission)
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let state = self.state.read().await;
        let mut permissions = state
            .permissions
            .iter()
            .filter(|permission| permission.is_active())
            .cloned()
            .collect::<Vec<_>>();
        permissions.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));

        Ok(permissions)
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDefinition>> {
        Ok(self.state.read().await.permission(id).cloned())
    }

    async fn find_active_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .iter()
            .find(|permission| permission.is_active() && &permission.name == name)
            .cloned())
    }

    async fn find_active_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .iter()
            .filter(|permission| permission.is_active() && ids.contains(&permission.id))
            .cloned()
            .collect())
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        let mut state = self.state.write().await;
        if state.name_taken(name, Some(id)) {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let permission = state.active_permission_mut(id)?;
        permission.name = name.clone();
        permission.description = description.map(ToOwned::to_owned);
        permission.updated_at = Utc::now();

        Ok(permission.clone())
    }

    async fn soft_delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let permission = state.active_permission_mut(id)?;
        let now = Utc::now();
        permission.deleted_at = Some(now);
        permission.updated_at = now;

        Ok(())
    }
}

#[async_trait]
impl RoleOverrideRepository for InMemoryAccessControlStore {
    async fn upsert_role_overrides(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
        granted: bool,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_permissions_active(permission_ids)?;

        let now = Utc::now();
        for permission_id in permission_ids {
            state.role_rows.insert(
                (role, *permission_id),
                RoleRow {
                    granted,
                    updated_at: now,
                    deleted_at: None,
                },
            );
        }

        Ok(())
    }

    async fn list_granted_permission_names(&self, role: Role) -> AppResult<Vec<String>> {
        let mut names = self
            .list_role_overrides(role)
            .await?
            .into_iter()
            .filter(|row| row.granted)
            .map(|row| row.permission_name.as_str().to_owned())
            .collect::<Vec<_>>();
        names.sort();

        Ok(names)
    }

    async fn has_active_role_grant(&self, role: Role, permission_name: &str) -> AppResult<bool> {
        Ok(self
            .list_granted_permission_names(role)
            .await?
            .iter()
            .any(|name| name == permission_name))
    }

    async fn list_role_overrides(&self, role: Role) -> AppResult<Vec<RoleOverride>> {
        let state = self.state.read().await;
        let mut overrides = state
            .role_rows
            .iter()
            .filter(|((row_role, _), row)| *row_role == role && row.deleted_at.is_none())
            .filter_map(|((_, permission_id), row)| {
                state
                    .permission(*permission_id)
                    .filter(|permission| permission.is_active())
                    .map(|permission| RoleOverride {
                        role,
                        permission_id: *permission_id,
                        permission_name: permission.name.clone(),
                        granted: row.granted,
                        updated_at: row.updated_at,
                        deleted_at: row.deleted_at,
                    })
            })
            .collect::<Vec<_>>();
        overrides.sort_by(|left, right| {
            left.permission_name
                .as_str()
                .cmp(right.permission_name.as_str())
        });

        Ok(overrides)
    }
}

#[async_trait]
impl UserOverrideRepository for InMemoryAccessControlStore {
    async fn upsert_user_overrides(&self, batch: &UserOverrideBatch) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_permissions_active(&batch.permission_ids)?;

        let now = Utc::now();
        for permission_id in &batch.permission_ids {
            state.user_rows.insert(
                (batch.user_id, *permission_id),
                UserRow {
                    granted: batch.granted,
                    granted_by: batch.granted_by,
                    expires_at: batch.expires_at,
                    updated_at: now,
                    deleted_at: None,
                },
            );
        }

        Ok(())
    }

    async fn find_active_user_overrides(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<Vec<UserOverride>> {
        Ok(self
            .list_user_overrides(user_id)
            .await?
            .into_iter()
            .filter(|row| row.permission_name.as_str() == permission_name)
            .collect())
    }

    async fn list_user_overrides(&self, user_id: UserId) -> AppResult<Vec<UserOverride>> {
        let state = self.state.read().await;
        let mut overrides = state
            .user_rows
            .iter()
            .filter(|((row_user_id, _), row)| *row_user_id == user_id && row.deleted_at.is_none())
            .filter_map(|((_, permission_id), row)| state.user_override(user_id, *permission_id, row))
            .collect::<Vec<_>>();
        overrides.sort_by(|left, right| {
            left.permission_name
                .as_str()
                .cmp(right.permission_name.as_str())
                .then(left.permission_id.cmp(&right.permission_id))
        });

        Ok(overrides)
    }

    async fn soft_delete_user_overrides(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut affected = 0;

        for ((row_user_id, _), row) in &mut state.user_rows {
            if *row_user_id == user_id && row.deleted_at.is_none() {
                row.deleted_at = Some(now);
                row.updated_at = now;
                affected += 1;
            }
        }

        Ok(affected)
    }
}

#[async_trait]
impl UserDirectory for InMemoryAccessControlStore {
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.users.get(&user_id).copied())
    }
}
