use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum::routing::MethodRouter;
use transitguard_application::AuthorizationGuard;
use transitguard_core::Principal;
use transitguard_domain::CapabilityRequirement;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Clone)]
struct GuardState {
    guard: AuthorizationGuard,
    requirement: Arc<CapabilityRequirement>,
}

/// Attaches a capability requirement to every method of the route.
pub fn require(
    state: &AppState,
    requirement: CapabilityRequirement,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        GuardState {
            guard: state.guard.clone(),
            requirement: Arc::new(requirement),
        },
        enforce,
    ))
}

async fn enforce(
    State(guarded): State<GuardState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let (mut parts, body) = request.into_parts();
    let path_params = RawPathParams::from_request_parts(&mut parts, &())
        .await
        .map(|params| {
            params
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect::<HashMap<_, _>>()
        })
        .unwrap_or_default();
    let principal = parts.extensions.get::<Principal>().copied();

    guarded
        .guard
        .evaluate(
            Some(guarded.requirement.as_ref()),
            principal.as_ref(),
            &path_params,
        )
        .await?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
