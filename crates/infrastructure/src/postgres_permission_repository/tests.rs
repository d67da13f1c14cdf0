use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use transitguard_application::PermissionRepository;
use transitguard_core::AppError;
use transitguard_domain::{PermissionId, PermissionName};

use super::PostgresPermissionRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres permission tests: {error}");
    }

    Some(pool)
}

fn unique_name(action: &str) -> PermissionName {
    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    PermissionName::from_parts(format!("resource_{suffix}").as_str(), action)
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn active_name_is_unique_but_reusable_after_soft_delete() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let name = unique_name("read");

    let created = repository
        .create_permission(&name, Some("Read things"))
        .await
        .unwrap_or_else(|error| panic!("failed to create permission: {error}"));
    let duplicate = repository.create_permission(&name, None).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    assert!(repository.soft_delete_permission(created.id).await.is_ok());
    let deleted_again = repository.soft_delete_permission(created.id).await;
    assert!(matches!(deleted_again, Err(AppError::NotFound(_))));

    let recreated = repository.create_permission(&name, None).await;
    assert!(recreated.is_ok_and(|permission| permission.id != created.id));

    let tombstone = repository.find_permission(created.id).await;
    assert!(tombstone.is_ok_and(|permission| permission.is_some_and(|row| !row.is_active())));
}

#[tokio::test]
async fn find_active_by_ids_skips_deleted_and_unknown_rows() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let kept = repository
        .create_permission(&unique_name("create"), None)
        .await
        .unwrap_or_else(|error| panic!("failed to create permission: {error}"));
    let dropped = repository
        .create_permission(&unique_name("delete"), None)
        .await
        .unwrap_or_else(|error| panic!("failed to create permission: {error}"));
    assert!(repository.soft_delete_permission(dropped.id).await.is_ok());

    let found = repository
        .find_active_permissions_by_ids(&[kept.id, dropped.id, PermissionId::new(-1)])
        .await
        .unwrap_or_default();

    assert_eq!(
        found.iter().map(|permission| permission.id).collect::<Vec<_>>(),
        vec![kept.id]
    );
}

#[tokio::test]
async fn rename_updates_resource_and_action_segments() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresPermissionRepository::new(pool);
    let created = repository
        .create_permission(&unique_name("update"), None)
        .await
        .unwrap_or_else(|error| panic!("failed to create permission: {error}"));
    let renamed = unique_name("validate");

    let updated = repository
        .update_permission(created.id, &renamed, Some("Validate"))
        .await;

    assert!(updated.is_ok_and(|permission| permission.action() == "validate"
        && permission.description.as_deref() == Some("Validate")));
}
