//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_control_store;
mod in_memory_owner_lookup;
mod postgres_override_repository;
mod postgres_owner_lookup;
mod postgres_permission_repository;
mod postgres_user_directory;

pub use in_memory_access_control_store::InMemoryAccessControlStore;
pub use in_memory_owner_lookup::InMemoryOwnerLookup;
pub use postgres_override_repository::PostgresOverrideRepository;
pub use postgres_owner_lookup::PostgresOwnerLookup;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_user_directory::PostgresUserDirectory;
