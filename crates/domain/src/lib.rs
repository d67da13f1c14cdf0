//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod decision;
mod overrides;
mod permission;
mod role_defaults;

pub use catalog::{CAPABILITY_CATALOG, CatalogEntry};
pub use decision::{
    CapabilityMode, CapabilityRequirement, CheckOutcome, DecisionSource, OwnershipRequirement,
};
pub use overrides::{RoleOverride, UserLayerDecision, UserOverride};
pub use permission::{PermissionDefinition, PermissionId, PermissionName};
pub use role_defaults::RoleDefaults;
