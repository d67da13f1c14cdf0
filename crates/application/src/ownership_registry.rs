use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use transitguard_core::{AppResult, Principal};
use transitguard_domain::OwnershipRequirement;

use crate::access_ports::OwnerLookup;

/// Maps resource types to owner lookups for ownership checks.
#[derive(Clone, Default)]
pub struct OwnershipRegistry {
    lookups: HashMap<String, Arc<dyn OwnerLookup>>,
}

impl OwnershipRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the owner lookup for a resource type.
    #[must_use]
    pub fn register(mut self, resource_type: impl Into<String>, lookup: Arc<dyn OwnerLookup>) -> Self {
        self.lookups.insert(resource_type.into(), lookup);
        self
    }

    /// Returns whether a lookup exists for the resource type.
    #[must_use]
    pub fn is_registered(&self, resource_type: &str) -> bool {
        self.lookups.contains_key(resource_type)
    }

    /// Returns whether the principal owns the addressed resource.
    ///
    /// Resource types without a registered lookup pass. A missing resource
    /// id or an unknown resource fails the check.
    pub async fn verify(
        &self,
        principal: &Principal,
        requirement: &OwnershipRequirement,
        resource_id: Option<&str>,
    ) -> AppResult<bool> {
        let Some(lookup) = self.lookups.get(requirement.resource_type.as_str()) else {
            warn!(
                resource_type = %requirement.resource_type,
                "no owner lookup registered, ownership check skipped"
            );
            return Ok(true);
        };

        let Some(resource_id) = resource_id else {
            return Ok(false);
        };

        let owner = lookup.find_owner(resource_id).await?;
        Ok(owner == Some(principal.user_id()))
    }
}
