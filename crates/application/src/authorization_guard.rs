use std::collections::HashMap;

use tracing::{info, warn};

use transitguard_core::{AppError, AppResult, Principal};
use transitguard_domain::CapabilityRequirement;

use crate::{AuthorizationService, OwnershipRegistry};

const ACCESS_DENIED: &str = "access denied";

/// Request-time enforcement point for capability requirements.
///
/// Outcomes are `Unauthorized` for a missing principal and an
/// undifferentiated `Forbidden` for capability or ownership failures.
#[derive(Clone)]
pub struct AuthorizationGuard {
    authorization_service: AuthorizationService,
    ownership_registry: OwnershipRegistry,
}

impl AuthorizationGuard {
    /// Creates a guard over the resolution engine and ownership registry.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        ownership_registry: OwnershipRegistry,
    ) -> Self {
        Self {
            authorization_service,
            ownership_registry,
        }
    }

    /// Evaluates the requirement attached to an operation.
    ///
    /// Operations without a requirement are allowed. A missing principal is
    /// `Unauthorized` so clients can tell a login is needed; it reveals
    /// nothing about the requirement. Every failure of an authenticated
    /// principal shares one `Forbidden` message.
    pub async fn evaluate(
        &self,
        requirement: Option<&CapabilityRequirement>,
        principal: Option<&Principal>,
        path_params: &HashMap<String, String>,
    ) -> AppResult<()> {
        let Some(requirement) = requirement else {
            return Ok(());
        };

        let Some(principal) = principal else {
            info!(reason = "unauthenticated", "request denied");
            return Err(AppError::Unauthorized("authentication required".to_owned()));
        };

        let decision = self
            .authorization_service
            .check_many(principal, &requirement.capabilities, requirement.mode)
            .await?;

        if !decision.allowed {
            let denied = decision
                .outcomes
                .iter()
                .filter(|(_, outcome)| !outcome.allowed)
                .map(|(capability, _)| capability.as_str())
                .collect::<Vec<_>>()
                .join(",");
            info!(
                reason = "permission_denied",
                user_id = %principal.user_id(),
                role = %principal.role(),
                mode = requirement.mode.as_str(),
                denied = %denied,
                "request denied"
            );
            return Err(AppError::Forbidden(ACCESS_DENIED.to_owned()));
        }

        if let Some(ownership) = &requirement.ownership {
            let resource_id = path_params.get(ownership.field.as_str()).map(String::as_str);
            if !self
                .ownership_registry
                .verify(principal, ownership, resource_id)
                .await?
            {
                warn!(
                    reason = "ownership_failed",
                    user_id = %principal.user_id(),
                    resource_type = %ownership.resource_type,
                    resource_id = resource_id.unwrap_or_default(),
                    "request denied"
                );
                return Err(AppError::Forbidden(ACCESS_DENIED.to_owned()));
            }
        }

        Ok(())
    }
}
