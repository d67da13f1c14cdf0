use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use transitguard_application::OwnerLookup;
use transitguard_core::{AppResult, UserId};

/// In-memory owner table for one resource type.
#[derive(Debug, Default)]
pub struct InMemoryOwnerLookup {
    owners: RwLock<HashMap<String, UserId>>,
}

impl InMemoryOwnerLookup {
    /// Creates an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the owner of a resource instance.
    pub async fn set_owner(&self, resource_id: impl Into<String>, owner: UserId) {
        self.owners.write().await.insert(resource_id.into(), owner);
    }
}

#[async_trait]
impl OwnerLookup for InMemoryOwnerLookup {
    async fn find_owner(&self, resource_id: &str) -> AppResult<Option<UserId>> {
        Ok(self.owners.read().await.get(resource_id).copied())
    }
}
