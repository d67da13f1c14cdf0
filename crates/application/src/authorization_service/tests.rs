use std::sync::Arc;

use chrono::{Duration, Utc};

use transitguard_core::{AppError, Principal, Role, UserId};
use transitguard_domain::{CapabilityMode, CheckOutcome, DecisionSource, PermissionId, RoleDefaults};

use crate::access_ports::{
    PermissionRepository, RoleOverrideRepository, UserOverrideBatch, UserOverrideRepository,
};
use crate::test_support::{FakeAccessStore, FixedClock};

use super::AuthorizationService;

fn agent_defaults() -> Arc<RoleDefaults> {
    Arc::new(RoleDefaults::new([(Role::Agent, vec!["declarations.read"])]))
}

fn service(store: &Arc<FakeAccessStore>, clock: &Arc<FixedClock>) -> AuthorizationService {
    AuthorizationService::new(agent_defaults(), store.clone(), store.clone())
        .with_clock(clock.clone())
}

fn agent(user_id: i64) -> Principal {
    Principal::new(UserId::new(user_id), Role::Agent)
}

async fn write_user_override(
    store: &FakeAccessStore,
    user_id: i64,
    name: &str,
    granted: bool,
    expires_at: Option<chrono::DateTime<Utc>>,
) {
    let permission_id = store.add_permission(name).await;
    let result = store
        .upsert_user_overrides(&UserOverrideBatch {
            user_id: UserId::new(user_id),
            permission_ids: vec![permission_id],
            granted,
            granted_by: UserId::new(1),
            expires_at,
        })
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn compiled_default_allows_with_role_source() {
    let store = Arc::new(FakeAccessStore::default());
    let clock = Arc::new(FixedClock::new(Utc::now()));

    let outcome = service(&store, &clock)
        .check(&agent(42), "declarations.read")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::allowed_by_role()));
}

#[tokio::test]
async fn user_grant_allows_capability_missing_from_role_layers() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    write_user_override(&store, 42, "squads.create", true, None).await;

    let outcome = service(&store, &clock)
        .check(&agent(42), "squads.create")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::allowed_by_user(None)));
}

#[tokio::test]
async fn user_revoke_beats_compiled_default_and_role_grant() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    write_user_override(
        &store,
        42,
        "declarations.read",
        false,
        Some(now - Duration::days(1)),
    )
    .await;
    let role_grant = store
        .upsert_role_overrides(Role::Agent, &[PermissionId::new(1)], true)
        .await;
    assert!(role_grant.is_ok());

    let outcome = service(&store, &clock)
        .check(&agent(42), "declarations.read")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::denied()));
}

#[tokio::test]
async fn expiry_boundary_is_exclusive() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    write_user_override(
        &store,
        7,
        "squads.update",
        true,
        Some(now + Duration::milliseconds(1)),
    )
    .await;
    write_user_override(
        &store,
        8,
        "squads.delete",
        true,
        Some(now - Duration::milliseconds(1)),
    )
    .await;
    let service = service(&store, &clock);

    let future_grant = service.check(&agent(7), "squads.update").await;
    let past_grant = service.check(&agent(8), "squads.delete").await;

    assert!(future_grant.is_ok_and(|outcome| outcome.allowed));
    assert_eq!(past_grant.ok(), Some(CheckOutcome::denied()));
}

#[tokio::test]
async fn expired_user_grant_falls_through_to_role_override() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    write_user_override(
        &store,
        42,
        "mission_orders.validate",
        true,
        Some(now - Duration::hours(1)),
    )
    .await;
    let role_grant = store
        .upsert_role_overrides(Role::Agent, &[PermissionId::new(1)], true)
        .await;
    assert!(role_grant.is_ok());

    let outcome = service(&store, &clock)
        .check(&agent(42), "mission_orders.validate")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::allowed_by_role()));
}

#[tokio::test]
async fn role_override_revoke_does_not_grant() {
    let store = Arc::new(FakeAccessStore::default());
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let permission_id = store.add_permission("statistics.read").await;
    let role_revoke = store
        .upsert_role_overrides(Role::Agent, &[permission_id], false)
        .await;
    assert!(role_revoke.is_ok());

    let outcome = service(&store, &clock)
        .check(&agent(42), "statistics.read")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::denied()));
}

#[tokio::test]
async fn check_many_combines_outcomes_by_mode() {
    let store = Arc::new(FakeAccessStore::default());
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let service = service(&store, &clock);
    let capabilities = vec!["declarations.read".to_owned(), "agents.delete".to_owned()];

    let all = service
        .check_many(&agent(42), &capabilities, CapabilityMode::All)
        .await;
    let any = service
        .check_many(&agent(42), &capabilities, CapabilityMode::Any)
        .await;

    let all = all.unwrap_or_else(|_| unreachable!());
    assert!(!all.allowed);
    assert_eq!(all.outcomes.len(), 2);
    assert_eq!(all.outcomes[1].1.source, DecisionSource::None);
    assert!(any.is_ok_and(|decision| decision.allowed));
}

#[tokio::test]
async fn require_returns_undifferentiated_forbidden() {
    let store = Arc::new(FakeAccessStore::default());
    let clock = Arc::new(FixedClock::new(Utc::now()));

    let result = service(&store, &clock)
        .require(
            &agent(42),
            &["permissions.assign".to_owned()],
            CapabilityMode::All,
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(message)) if message == "access denied"));
}

#[tokio::test]
async fn revoke_then_expiring_grant_scenario() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    let service = service(&store, &clock);
    let tomorrow = now + Duration::days(1);

    write_user_override(&store, 42, "declarations.read", false, None).await;
    let revoked = service.check(&agent(42), "declarations.read").await;
    assert_eq!(revoked.ok(), Some(CheckOutcome::denied()));

    write_user_override(&store, 42, "declarations.create", true, Some(tomorrow)).await;
    let granted = service.check(&agent(42), "declarations.create").await;
    assert_eq!(
        granted.ok(),
        Some(CheckOutcome::allowed_by_user(Some(tomorrow)))
    );

    clock.set(tomorrow + Duration::milliseconds(1));
    let expired = service.check(&agent(42), "declarations.create").await;
    assert_eq!(expired.ok(), Some(CheckOutcome::denied()));
    assert_eq!(store.active_user_row_count(42).await, 2);
}

#[tokio::test]
async fn live_grant_survives_expired_grant_on_recreated_name() {
    let store = Arc::new(FakeAccessStore::default());
    let now = Utc::now();
    let clock = Arc::new(FixedClock::new(now));
    let live_until = now + Duration::days(2);

    write_user_override(&store, 42, "squads.delete", true, Some(live_until)).await;
    assert!(store.soft_delete_permission(PermissionId::new(1)).await.is_ok());
    write_user_override(
        &store,
        42,
        "squads.delete",
        true,
        Some(now - Duration::minutes(1)),
    )
    .await;

    let outcome = service(&store, &clock)
        .check(&agent(42), "squads.delete")
        .await;

    assert_eq!(store.active_user_row_count(42).await, 2);
    assert_eq!(
        outcome.ok(),
        Some(CheckOutcome::allowed_by_user(Some(live_until)))
    );
}

#[tokio::test]
async fn revoke_on_deleted_permission_still_denies_recreated_grant() {
    let store = Arc::new(FakeAccessStore::default());
    let clock = Arc::new(FixedClock::new(Utc::now()));

    write_user_override(&store, 42, "agents.update", false, None).await;
    assert!(store.soft_delete_permission(PermissionId::new(1)).await.is_ok());
    write_user_override(&store, 42, "agents.update", true, None).await;

    let outcome = service(&store, &clock)
        .check(&agent(42), "agents.update")
        .await;

    assert_eq!(outcome.ok(), Some(CheckOutcome::denied()));
}
