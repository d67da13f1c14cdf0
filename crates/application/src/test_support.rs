use std::collections::HashMap;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use transitguard_core::{AppError, AppResult, Role, UserId};
use transitguard_domain::{
    PermissionDefinition, PermissionId, PermissionName, RoleOverride, UserOverride,
};

use crate::access_ports::{
    Clock, PermissionRepository, RoleOverrideRepository, UserDirectory, UserOverrideBatch,
    UserOverrideRepository,
};

pub(crate) struct FixedClock {
    now: StdMutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: StdMutex::new(now),
        }
    }

    pub(crate) fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|_| Utc::now())
    }
}

#[derive(Debug, Clone)]
struct RoleRow {
    role: Role,
    permission_id: PermissionId,
    granted: bool,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct UserRow {
    user_id: UserId,
    permission_id: PermissionId,
    granted: bool,
    granted_by: UserId,
    expires_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub(crate) struct FakeAccessStore {
    permissions: Mutex<Vec<PermissionDefinition>>,
    role_rows: Mutex<Vec<RoleRow>>,
    user_rows: Mutex<Vec<UserRow>>,
    users: Mutex<HashMap<UserId, Role>>,
    pub(crate) write_batches: Mutex<usize>,
}

impl FakeAccessStore {
    pub(crate) async fn add_user(&self, user_id: i64, role: Role) {
        self.users.lock().await.insert(UserId::new(user_id), role);
    }

    pub(crate) async fn add_permission(&self, name: &str) -> PermissionId {
        let name = PermissionName::new(name).unwrap_or_else(|_| unreachable!());
        match self.create_permission(&name, None).await {
            Ok(permission) => permission.id,
            Err(error) => panic!("failed to seed permission: {error}"),
        }
    }

    pub(crate) async fn active_user_row_count(&self, user_id: i64) -> usize {
        self.user_rows
            .lock()
            .await
            .iter()
            .filter(|row| row.user_id == UserId::new(user_id) && row.deleted_at.is_none())
            .count()
    }

    pub(crate) async fn user_row_count(&self) -> usize {
        self.user_rows.lock().await.len()
    }

    pub(crate) async fn role_row_count(&self) -> usize {
        self.role_rows.lock().await.len()
    }

    async fn permission_by_id(&self, id: PermissionId) -> Option<PermissionDefinition> {
        self.permissions
            .lock()
            .await
            .iter()
            .find(|permission| permission.id == id)
            .cloned()
    }
}

#[async_trait]
impl PermissionRepository for FakeAccessStore {
    async fn create_permission(
        &self,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        let mut permissions = self.permissions.lock().await;
        if permissions
            .iter()
            .any(|permission| permission.is_active() && &permission.name == name)
        {
            return Err(AppError::Conflict(format!("permission '{name}' already exists")));
        }

        let now = Utc::now();
        let permission = PermissionDefinition {
            id: PermissionId::new(permissions.len() as i64 + 1),
            name: name.clone(),
            description: description.map(ToOwned::to_owned),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        permissions.push(permission.clone());
        Ok(permission)
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .filter(|permission| permission.is_active())
            .cloned()
            .collect())
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDefinition>> {
        Ok(self.permission_by_id(id).await)
    }

    async fn find_active_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionDefinition>> {
        Ok(self
            .permissions
            .lock()
            .await
            .iter()
            .find(|permission| permission.is_active() && &permission.name == name)
            .cloned())
    }

    async fn find_active_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self
            .permissions
            .lock()
            .await
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
        let mut permissions = self.permissions.lock().await;
        let permission = permissions
            .iter_mut()
            .find(|permission| permission.id == id && permission.is_active())
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))?;
        permission.name = name.clone();
        permission.description = description.map(ToOwned::to_owned);
        permission.updated_at = Utc::now();
        Ok(permission.clone())
    }

    async fn soft_delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let mut permissions = self.permissions.lock().await;
        let permission = permissions
            .iter_mut()
            .find(|permission| permission.id == id && permission.is_active())
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))?;
        permission.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl RoleOverrideRepository for FakeAccessStore {
    async fn upsert_role_overrides(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
        granted: bool,
    ) -> AppResult<()> {
        *self.write_batches.lock().await += 1;
        let mut rows = self.role_rows.lock().await;
        for permission_id in permission_ids {
            match rows
                .iter_mut()
                .find(|row| row.role == role && row.permission_id == *permission_id)
            {
                Some(row) => {
                    row.granted = granted;
                    row.deleted_at = None;
                }
                None => rows.push(RoleRow {
                    role,
                    permission_id: *permission_id,
                    granted,
                    deleted_at: None,
                }),
            }
        }
        Ok(())
    }

    async fn list_granted_permission_names(&self, role: Role) -> AppResult<Vec<String>> {
        let mut names = Vec::new();
        for row in self.list_role_overrides(role).await? {
            if row.granted
                && self
                    .permission_by_id(row.permission_id)
                    .await
                    .is_some_and(|permission| permission.is_active())
            {
                names.push(row.permission_name.as_str().to_owned());
            }
        }
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
        let rows = self.role_rows.lock().await.clone();
        let mut overrides = Vec::new();
        for row in rows
            .into_iter()
            .filter(|row| row.role == role && row.deleted_at.is_none())
        {
            if let Some(permission) = self.permission_by_id(row.permission_id).await {
                overrides.push(RoleOverride {
                    role,
                    permission_id: row.permission_id,
                    permission_name: permission.name,
                    granted: row.granted,
                    updated_at: Utc::now(),
                    deleted_at: None,
                });
            }
        }
        Ok(overrides)
    }
}

#[async_trait]
impl UserOverrideRepository for FakeAccessStore {
    async fn upsert_user_overrides(&self, batch: &UserOverrideBatch) -> AppResult<()> {
        *self.write_batches.lock().await += 1;
        let mut rows = self.user_rows.lock().await;
        for permission_id in &batch.permission_ids {
            match rows
                .iter_mut()
                .find(|row| row.user_id == batch.user_id && row.permission_id == *permission_id)
            {
                Some(row) => {
                    row.granted = batch.granted;
                    row.granted_by = batch.granted_by;
                    row.expires_at = batch.expires_at;
                    row.deleted_at = None;
                }
                None => rows.push(UserRow {
                    user_id: batch.user_id,
                    permission_id: *permission_id,
                    granted: batch.granted,
                    granted_by: batch.granted_by,
                    expires_at: batch.expires_at,
                    deleted_at: None,
                }),
            }
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
        let rows = self.user_rows.lock().await.clone();
        let mut overrides = Vec::new();
        for row in rows
            .into_iter()
            .filter(|row| row.user_id == user_id && row.deleted_at.is_none())
        {
            if let Some(permission) = self.permission_by_id(row.permission_id).await {
                overrides.push(UserOverride {
                    user_id,
                    permission_id: row.permission_id,
                    permission_name: permission.name,
                    granted: row.granted,
                    granted_by: row.granted_by,
                    expires_at: row.expires_at,
                    updated_at: Utc::now(),
                    deleted_at: None,
                });
            }
        }
        Ok(overrides)
    }

    async fn soft_delete_user_overrides(&self, user_id: UserId) -> AppResult<u64> {
        let mut rows = self.user_rows.lock().await;
        let now = Utc::now();
        let mut affected = 0;
        for row in rows
            .iter_mut()
            .filter(|row| row.user_id == user_id && row.deleted_at.is_none())
        {
            row.deleted_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }
}

#[async_trait]
impl UserDirectory for FakeAccessStore {
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<Role>> {
        Ok(self.users.lock().await.get(&user_id).copied())
    }
}
