use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use transitguard_core::{AppError, Principal};

use crate::error::ApiResult;

/// Session key under which the authentication layer stores the principal.
pub const SESSION_PRINCIPAL_KEY: &str = "principal";

/// Copies the session principal into request extensions when one exists.
pub async fn resolve_principal(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let principal = session
        .get::<Principal>(SESSION_PRINCIPAL_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session principal: {error}")))?;

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

pub async fn require_auth(request: Request, next: Next) -> ApiResult<Response> {
    if request.extensions().get::<Principal>().is_none() {
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    }

    Ok(next.run(request).await)
}
