use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use transitguard_core::AppError;
use transitguard_domain::CapabilityRequirement;

use crate::guard::require;
use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(access_routes(&app_state))
        .layer(from_fn(middleware::resolve_principal))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

/// Management and self-service routes, each guarded by its own requirement.
pub fn access_routes(state: &AppState) -> Router<AppState> {
    let read = || CapabilityRequirement::all(["permissions.read"]);
    let assign = || CapabilityRequirement::all(["permissions.assign"]);

    Router::new()
        .route(
            "/api/permissions",
            require(state, read(), get(handlers::permissions::list_permissions_handler)),
        )
        .route(
            "/api/permissions",
            require(
                state,
                CapabilityRequirement::all(["permissions.create"]),
                post(handlers::permissions::create_permission_handler),
            ),
        )
        .route(
            "/api/permissions/{permission_id}",
            require(state, read(), get(handlers::permissions::get_permission_handler)),
        )
        .route(
            "/api/permissions/{permission_id}",
            require(
                state,
                CapabilityRequirement::all(["permissions.update"]),
                put(handlers::permissions::update_permission_handler),
            ),
        )
        .route(
            "/api/permissions/{permission_id}",
            require(
                state,
                CapabilityRequirement::all(["permissions.delete"]),
                delete(handlers::permissions::delete_permission_handler),
            ),
        )
        .route(
            "/api/roles/{role}/permissions",
            require(state, read(), get(handlers::roles::role_permissions_handler)),
        )
        .route(
            "/api/roles/{role}/permissions",
            require(
                state,
                assign(),
                post(handlers::roles::assign_role_permission_handler),
            ),
        )
        .route(
            "/api/roles/{role}/permissions/bulk",
            require(
                state,
                assign(),
                post(handlers::roles::assign_role_permissions_bulk_handler),
            ),
        )
        .route(
            "/api/roles/{role}/overrides",
            require(state, read(), get(handlers::roles::role_overrides_handler)),
        )
        .route(
            "/api/users/{user_id}/permissions",
            require(state, read(), get(handlers::users::effective_permissions_handler)),
        )
        .route(
            "/api/users/{user_id}/permissions",
            require(
                state,
                assign(),
                post(handlers::users::assign_user_permission_handler),
            ),
        )
        .route(
            "/api/users/{user_id}/permissions",
            require(
                state,
                assign(),
                delete(handlers::users::revoke_all_user_permissions_handler),
            ),
        )
        .route(
            "/api/users/{user_id}/permissions/bulk",
            require(
                state,
                assign(),
                post(handlers::users::assign_user_permissions_bulk_handler),
            ),
        )
        .route(
            "/api/users/{user_id}/permissions/check",
            require(state, read(), get(handlers::users::check_user_permission_handler)),
        )
        .route(
            "/api/users/{user_id}/overrides",
            require(state, read(), get(handlers::users::user_overrides_handler)),
        )
        .route(
            "/api/users/{user_id}/capabilities",
            require(
                state,
                CapabilityRequirement::all(["profile.read"]).with_ownership("users", "user_id"),
                get(handlers::users::user_capabilities_handler),
            ),
        )
        .route(
            "/api/me/permissions/check",
            get(handlers::users::my_permission_check_handler)
                .route_layer(from_fn(middleware::require_auth)),
        )
}
