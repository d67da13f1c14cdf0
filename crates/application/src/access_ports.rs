mod clock;
mod inputs;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use inputs::{
    AssignUserPermissionsInput, CreatePermissionInput, EffectivePermissions,
    UpdatePermissionInput, UserOverrideBatch,
};
pub use repositories::{
    OwnerLookup, PermissionRepository, RoleOverrideRepository, UserDirectory,
    UserOverrideRepository,
};
