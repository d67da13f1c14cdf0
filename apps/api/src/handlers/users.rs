use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use transitguard_application::AssignUserPermissionsInput;
use transitguard_core::{AppError, AppResult, Principal, UserId};
use transitguard_domain::{PermissionId, PermissionName};

use crate::dto::{
    AssignUserPermissionRequest, BulkAssignUserPermissionsRequest, EffectivePermissionsResponse,
    PermissionCheckResponse, RevokeAllResponse, UserOverrideResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct PermissionCheckQuery {
    pub permission: String,
}

fn parse_expiry(value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|value| {
            DateTime::parse_from_rfc3339(value.as_str())
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|error| AppError::Validation(format!("invalid expires_at: {error}")))
        })
        .transpose()
}

pub async fn assign_user_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Json(payload): Json<AssignUserPermissionRequest>,
) -> ApiResult<StatusCode> {
    state
        .assignment_service
        .assign_to_user(
            &principal,
            AssignUserPermissionsInput {
                user_id: UserId::new(user_id),
                permission_ids: vec![PermissionId::new(payload.permission_id)],
                granted: payload.granted.unwrap_or(true),
                expires_at: parse_expiry(payload.expires_at)?,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_user_permissions_bulk_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Json(payload): Json<BulkAssignUserPermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .assignment_service
        .assign_many_to_user(
            &principal,
            AssignUserPermissionsInput {
                user_id: UserId::new(user_id),
                permission_ids: payload
                    .permission_ids
                    .into_iter()
                    .map(PermissionId::new)
                    .collect(),
                granted: payload.granted.unwrap_or(true),
                expires_at: parse_expiry(payload.expires_at)?,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let effective = state
        .assignment_service
        .effective_permissions(UserId::new(user_id))
        .await?;

    Ok(Json(EffectivePermissionsResponse::from(effective)))
}

pub async fn user_overrides_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<UserOverrideResponse>>> {
    let overrides = state
        .assignment_service
        .user_overrides(UserId::new(user_id))
        .await?
        .into_iter()
        .map(UserOverrideResponse::from)
        .collect();

    Ok(Json(overrides))
}

pub async fn check_user_permission_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let outcome = state
        .assignment_service
        .check_user(UserId::new(user_id), query.permission.as_str())
        .await?;

    Ok(Json(PermissionCheckResponse::from_outcome(
        query.permission,
        outcome,
    )))
}

pub async fn revoke_all_user_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<RevokeAllResponse>> {
    let revoked = state
        .assignment_service
        .revoke_all_for_user(&principal, UserId::new(user_id))
        .await?;

    Ok(Json(RevokeAllResponse { revoked }))
}

pub async fn my_permission_check_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let name = PermissionName::new(query.permission.as_str())?;
    let outcome = state
        .authorization_service
        .check(&principal, name.as_str())
        .await?;

    Ok(Json(PermissionCheckResponse::from_outcome(
        query.permission,
        outcome,
    )))
}

pub async fn user_capabilities_handler(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    effective_permissions_handler(State(state), Path(user_id)).await
}
