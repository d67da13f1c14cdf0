use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use transitguard_application::{CreatePermissionInput, UpdatePermissionInput};
use transitguard_core::Principal;
use transitguard_domain::PermissionId;

use crate::dto::{CreatePermissionRequest, PermissionResponse, UpdatePermissionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .catalog_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let permission = state
        .catalog_service
        .create_permission(
            &principal,
            CreatePermissionInput {
                name: payload.name,
                resource: payload.resource,
                action: payload.action,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<i64>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .catalog_service
        .get_permission(PermissionId::new(permission_id))
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(permission_id): Path<i64>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    let permission = state
        .catalog_service
        .update_permission(
            &principal,
            PermissionId::new(permission_id),
            UpdatePermissionInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(permission_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .catalog_service
        .delete_permission(&principal, PermissionId::new(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
