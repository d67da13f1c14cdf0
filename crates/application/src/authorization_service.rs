use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::debug;

use transitguard_core::{AppError, AppResult, Principal};
use transitguard_domain::{CapabilityMode, CheckOutcome, RoleDefaults, UserLayerDecision};

use crate::access_ports::{Clock, RoleOverrideRepository, SystemClock, UserOverrideRepository};

/// Combined decision over several capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDecision {
    /// Overall result after applying the mode.
    pub allowed: bool,
    /// Per-capability outcomes in request order.
    pub outcomes: Vec<(String, CheckOutcome)>,
}

/// Resolution engine deciding capability checks for a principal.
///
/// Precedence, highest first:
/// 1. an active user revoke denies, whatever its expiry;
/// 2. an active, unexpired user grant allows, reporting the latest expiry
///    when several rows share the name;
/// 3. the compiled role defaults allow;
/// 4. an active role grant on an active permission allows;
/// 5. otherwise the check is denied.
#[derive(Clone)]
pub struct AuthorizationService {
    role_defaults: Arc<RoleDefaults>,
    role_overrides: Arc<dyn RoleOverrideRepository>,
    user_overrides: Arc<dyn UserOverrideRepository>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationService {
    /// Creates a new authorization service over the override stores.
    #[must_use]
    pub fn new(
        role_defaults: Arc<RoleDefaults>,
        role_overrides: Arc<dyn RoleOverrideRepository>,
        user_overrides: Arc<dyn UserOverrideRepository>,
    ) -> Self {
        Self {
            role_defaults,
            role_overrides,
            user_overrides,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for expiry evaluation.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the compiled role defaults.
    #[must_use]
    pub fn role_defaults(&self) -> &RoleDefaults {
        self.role_defaults.as_ref()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Resolves one capability for a principal.
    pub async fn check(&self, principal: &Principal, capability: &str) -> AppResult<CheckOutcome> {
        let user_rows = self
            .user_overrides
            .find_active_user_overrides(principal.user_id(), capability)
            .await?;

        match UserLayerDecision::from_rows(&user_rows, self.clock.now()) {
            UserLayerDecision::Revoked => {
                debug!(
                    user_id = %principal.user_id(),
                    capability,
                    "capability denied by user revoke"
                );
                return Ok(CheckOutcome::denied());
            }
            UserLayerDecision::Granted { expires_at } => {
                return Ok(CheckOutcome::allowed_by_user(expires_at));
            }
            UserLayerDecision::Undecided if !user_rows.is_empty() => {
                debug!(
                    user_id = %principal.user_id(),
                    capability,
                    "ignoring expired user grants"
                );
            }
            UserLayerDecision::Undecided => {}
        }

        if self.role_defaults.allows(principal.role(), capability) {
            return Ok(CheckOutcome::allowed_by_role());
        }

        if self
            .role_overrides
            .has_active_role_grant(principal.role(), capability)
            .await?
        {
            return Ok(CheckOutcome::allowed_by_role());
        }

        Ok(CheckOutcome::denied())
    }

    /// Resolves several capabilities concurrently and combines them.
    ///
    /// Every check completes before the mode is applied.
    pub async fn check_many(
        &self,
        principal: &Principal,
        capabilities: &[String],
        mode: CapabilityMode,
    ) -> AppResult<CapabilityDecision> {
        let results = try_join_all(
            capabilities
                .iter()
                .map(|capability| self.check(principal, capability.as_str())),
        )
        .await?;

        let allowed = mode.combine(&results);
        let outcomes = capabilities.iter().cloned().zip(results).collect();

        Ok(CapabilityDecision { allowed, outcomes })
    }

    /// Ensures the principal satisfies the capability list.
    pub async fn require(
        &self,
        principal: &Principal,
        capabilities: &[String],
        mode: CapabilityMode,
    ) -> AppResult<()> {
        if self
            .check_many(principal, capabilities, mode)
            .await?
            .allowed
        {
            return Ok(());
        }

        Err(AppError::Forbidden("access denied".to_owned()))
    }
}

#[cfg(test)]
mod tests;
