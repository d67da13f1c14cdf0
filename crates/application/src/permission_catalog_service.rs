use std::sync::Arc;

use tracing::info;

use transitguard_core::{AppError, AppResult, Principal};
use transitguard_domain::{CAPABILITY_CATALOG, PermissionDefinition, PermissionId, PermissionName};

use crate::access_ports::{CreatePermissionInput, PermissionRepository, UpdatePermissionInput};

/// Application service for capability definitions.
#[derive(Clone)]
pub struct PermissionCatalogService {
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionCatalogService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>) -> Self {
        Self { repository }
    }

    /// Creates a capability, rejecting names already used by an active row.
    pub async fn create_permission(
        &self,
        actor: &Principal,
        input: CreatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let name = PermissionName::new(input.name)?;
        ensure_segments_match(&name, input.resource.as_str(), input.action.as_str())?;
        let description = normalize_description(input.description);

        if self
            .repository
            .find_active_permission_by_name(&name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let permission = self
            .repository
            .create_permission(&name, description.as_deref())
            .await?;

        info!(
            actor = %actor.user_id(),
            permission_id = %permission.id,
            permission = %permission.name,
            "permission created"
        );

        Ok(permission)
    }

    /// Lists active capabilities.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        self.repository.list_permissions().await
    }

    /// Returns one capability, including soft-deleted ones.
    pub async fn get_permission(&self, id: PermissionId) -> AppResult<PermissionDefinition> {
        self.repository
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))
    }

    /// Renames or re-describes an active capability.
    pub async fn update_permission(
        &self,
        actor: &Principal,
        id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<PermissionDefinition> {
        let current = self.get_active_permission(id).await?;

        let name = match input.name {
            Some(value) => PermissionName::new(value)?,
            None => current.name.clone(),
        };

        if name != current.name
            && let Some(existing) = self.repository.find_active_permission_by_name(&name).await?
            && existing.id != id
        {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        let description = match input.description {
            Some(value) => normalize_description(Some(value)),
            None => current.description,
        };

        let permission = self
            .repository
            .update_permission(id, &name, description.as_deref())
            .await?;

        info!(
            actor = %actor.user_id(),
            permission_id = %id,
            permission = %permission.name,
            "permission updated"
        );

        Ok(permission)
    }

    /// Soft-deletes a capability. Override rows referencing it are kept.
    pub async fn delete_permission(&self, actor: &Principal, id: PermissionId) -> AppResult<()> {
        let current = self.get_active_permission(id).await?;
        self.repository.soft_delete_permission(id).await?;

        info!(
            actor = %actor.user_id(),
            permission_id = %id,
            permission = %current.name,
            "permission soft-deleted"
        );

        Ok(())
    }

    /// Inserts catalog entries that have no active definition yet.
    ///
    /// Returns the number of created rows.
    pub async fn seed_catalog(&self) -> AppResult<usize> {
        let mut created = 0;

        for entry in CAPABILITY_CATALOG {
            let name = PermissionName::from_parts(entry.resource, entry.action)?;
            if self
                .repository
                .find_active_permission_by_name(&name)
                .await?
                .is_some()
            {
                continue;
            }

            self.repository
                .create_permission(&name, Some(entry.description))
                .await?;
            created += 1;
        }

        if created > 0 {
            info!(created, "seeded permission catalog");
        }

        Ok(created)
    }

    async fn get_active_permission(&self, id: PermissionId) -> AppResult<PermissionDefinition> {
        let permission = self.get_permission(id).await?;
        if !permission.is_active() {
            return Err(AppError::NotFound(format!(
                "permission '{id}' was not found"
            )));
        }

        Ok(permission)
    }
}

fn ensure_segments_match(name: &PermissionName, resource: &str, action: &str) -> AppResult<()> {
    if name.resource() != resource.trim() || name.action() != action.trim() {
        return Err(AppError::Validation(format!(
            "permission name '{name}' does not match resource '{resource}' and action '{action}'"
        )));
    }

    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use transitguard_core::{AppError, Principal, Role, UserId};
    use transitguard_domain::{CAPABILITY_CATALOG, PermissionId};

    use crate::access_ports::{CreatePermissionInput, UpdatePermissionInput};
    use crate::test_support::FakeAccessStore;

    use super::PermissionCatalogService;

    fn admin() -> Principal {
        Principal::new(UserId::new(1), Role::Admin)
    }

    fn input(name: &str, resource: &str, action: &str) -> CreatePermissionInput {
        CreatePermissionInput {
            name: name.to_owned(),
            resource: resource.to_owned(),
            action: action.to_owned(),
            description: Some("  Validate orders ".to_owned()),
        }
    }

    #[tokio::test]
    async fn create_permission_rejects_active_duplicate() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));

        let first = service
            .create_permission(&admin(), input("squads.read", "squads", "read"))
            .await;
        let second = service
            .create_permission(&admin(), input("squads.read", "squads", "read"))
            .await;

        assert!(first.is_ok_and(|permission| permission.description.as_deref()
            == Some("Validate orders")));
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_permission_rejects_mismatched_segments() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));

        let result = service
            .create_permission(&admin(), input("squads.read", "squads", "create"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn soft_deleted_name_can_be_recreated() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));
        let created = service
            .create_permission(&admin(), input("squads.read", "squads", "read"))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(service.delete_permission(&admin(), created.id).await.is_ok());
        let recreated = service
            .create_permission(&admin(), input("squads.read", "squads", "read"))
            .await;

        assert!(recreated.is_ok_and(|permission| permission.id != created.id));
        let listed = service.list_permissions().await.unwrap_or_default();
        assert_eq!(listed.len(), 1);
        let tombstoned = service.get_permission(created.id).await;
        assert!(tombstoned.is_ok_and(|permission| !permission.is_active()));
    }

    #[tokio::test]
    async fn delete_of_deleted_permission_is_not_found() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));
        let created = service
            .create_permission(&admin(), input("agents.read", "agents", "read"))
            .await
            .unwrap_or_else(|_| unreachable!());

        assert!(service.delete_permission(&admin(), created.id).await.is_ok());
        let again = service.delete_permission(&admin(), created.id).await;

        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_permission_rejects_name_of_other_active_row() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));
        let _ = service
            .create_permission(&admin(), input("agents.read", "agents", "read"))
            .await;
        let squads = service
            .create_permission(&admin(), input("squads.read", "squads", "read"))
            .await
            .unwrap_or_else(|_| unreachable!());

        let result = service
            .update_permission(
                &admin(),
                squads.id,
                UpdatePermissionInput {
                    name: Some("agents.read".to_owned()),
                    description: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn get_unknown_permission_is_not_found() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));

        let result = service.get_permission(PermissionId::new(99)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn seed_catalog_is_idempotent() {
        let service = PermissionCatalogService::new(Arc::new(FakeAccessStore::default()));

        let first = service.seed_catalog().await;
        let second = service.seed_catalog().await;

        assert_eq!(first.ok(), Some(CAPABILITY_CATALOG.len()));
        assert_eq!(second.ok(), Some(0));
    }
}
