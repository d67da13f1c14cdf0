use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use transitguard_core::{Principal, Role};
use transitguard_domain::PermissionId;

use crate::dto::{
    AssignRolePermissionRequest, BulkAssignRolePermissionsRequest, RoleOverrideResponse,
    RolePermissionsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn role_permissions_handler(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<RolePermissionsResponse>> {
    let role = Role::from_str(role.as_str())?;
    let permissions = state.assignment_service.role_permissions(role).await?;

    Ok(Json(RolePermissionsResponse {
        role: role.as_str().to_owned(),
        permissions,
        compiled_defaults: state
            .assignment_service
            .role_defaults(role)
            .into_iter()
            .collect(),
    }))
}

pub async fn role_overrides_handler(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<Vec<RoleOverrideResponse>>> {
    let role = Role::from_str(role.as_str())?;
    let overrides = state
        .assignment_service
        .role_overrides(role)
        .await?
        .into_iter()
        .map(RoleOverrideResponse::from)
        .collect();

    Ok(Json(overrides))
}

pub async fn assign_role_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role): Path<String>,
    Json(payload): Json<AssignRolePermissionRequest>,
) -> ApiResult<StatusCode> {
    let role = Role::from_str(role.as_str())?;
    state
        .assignment_service
        .assign_to_role(
            &principal,
            role,
            PermissionId::new(payload.permission_id),
            payload.granted.unwrap_or(true),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_permissions_bulk_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role): Path<String>,
    Json(payload): Json<BulkAssignRolePermissionsRequest>,
) -> ApiResult<StatusCode> {
    let role = Role::from_str(role.as_str())?;
    let permission_ids = payload
        .permission_ids
        .into_iter()
        .map(PermissionId::new)
        .collect::<Vec<_>>();

    state
        .assignment_service
        .assign_many_to_role(
            &principal,
            role,
            &permission_ids,
            payload.granted.unwrap_or(true),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
