use std::collections::{BTreeSet, HashMap};

use transitguard_core::Role;

use crate::CAPABILITY_CATALOG;

/// Capabilities needed to administer assignments from a cold database.
const BOOTSTRAP_CAPABILITIES: &[&str] = &["permissions.read", "permissions.assign"];

const SUPERVISOR_DEFAULTS: &[&str] = &[
    "agents.read",
    "transit_houses.read",
    "exit_offices.read",
    "mission_orders.read",
    "mission_orders.create",
    "mission_orders.update",
    "mission_orders.validate",
    "squads.read",
    "squads.create",
    "squads.update",
    "declarations.read",
    "declarations.create",
    "declarations.update",
    "statistics.read",
    "profile.read",
];

const AGENT_DEFAULTS: &[&str] = &[
    "transit_houses.read",
    "exit_offices.read",
    "mission_orders.read",
    "squads.read",
    "declarations.read",
    "profile.read",
];

const VIEWER_DEFAULTS: &[&str] = &["mission_orders.read", "statistics.read", "profile.read"];

/// Read-only compiled baseline of capabilities per role.
///
/// Built once at startup and shared; the database override layers are the
/// only mutable extension point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefaults {
    table: HashMap<Role, BTreeSet<String>>,
}

impl RoleDefaults {
    /// Creates a table from explicit role entries.
    #[must_use]
    pub fn new<I, S>(entries: impl IntoIterator<Item = (Role, I)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = entries
            .into_iter()
            .map(|(role, names)| (role, names.into_iter().map(Into::into).collect()))
            .collect();

        Self { table }
    }

    /// Returns the table compiled into the service.
    ///
    /// `ADMIN` holds the full catalog so the first assignment can always be
    /// performed.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            (
                Role::Admin,
                CAPABILITY_CATALOG
                    .iter()
                    .map(|entry| entry.name())
                    .collect::<Vec<_>>(),
            ),
            (Role::Supervisor, to_owned_names(SUPERVISOR_DEFAULTS)),
            (Role::Agent, to_owned_names(AGENT_DEFAULTS)),
            (Role::Viewer, to_owned_names(VIEWER_DEFAULTS)),
        ])
    }

    /// Returns whether the role holds the capability by default.
    #[must_use]
    pub fn allows(&self, role: Role, capability: &str) -> bool {
        self.table
            .get(&role)
            .is_some_and(|names| names.contains(capability))
    }

    /// Returns the default capabilities of a role.
    #[must_use]
    pub fn for_role(&self, role: Role) -> BTreeSet<String> {
        self.table.get(&role).cloned().unwrap_or_default()
    }

    /// Returns roles able to read and assign capabilities without any
    /// override row.
    #[must_use]
    pub fn bootstrap_roles(&self) -> Vec<Role> {
        Role::all()
            .iter()
            .copied()
            .filter(|role| {
                BOOTSTRAP_CAPABILITIES
                    .iter()
                    .all(|capability| self.allows(*role, capability))
            })
            .collect()
    }
}

impl Default for RoleDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_owned_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}
