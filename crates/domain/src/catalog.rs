/// Canonical capability shipped with the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Resource segment.
    pub resource: &'static str,
    /// Action segment.
    pub action: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

impl CatalogEntry {
    const fn new(resource: &'static str, action: &'static str, description: &'static str) -> Self {
        Self {
            resource,
            action,
            description,
        }
    }

    /// Returns the `resource.action` name.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}

/// Capabilities known to every deployment.
pub const CAPABILITY_CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new("agents", "read", "List and view escort agents"),
    CatalogEntry::new("agents", "create", "Register escort agents"),
    CatalogEntry::new("agents", "update", "Edit escort agent records"),
    CatalogEntry::new("agents", "delete", "Archive escort agents"),
    CatalogEntry::new("transit_houses", "read", "List and view transit houses"),
    CatalogEntry::new("transit_houses", "create", "Register transit houses"),
    CatalogEntry::new("transit_houses", "update", "Edit transit houses"),
    CatalogEntry::new("transit_houses", "delete", "Archive transit houses"),
    CatalogEntry::new("exit_offices", "read", "List and view exit offices"),
    CatalogEntry::new("exit_offices", "create", "Register exit offices"),
    CatalogEntry::new("exit_offices", "update", "Edit exit offices"),
    CatalogEntry::new("exit_offices", "delete", "Archive exit offices"),
    CatalogEntry::new("mission_orders", "read", "List and view mission orders"),
    CatalogEntry::new("mission_orders", "create", "Issue mission orders"),
    CatalogEntry::new("mission_orders", "update", "Edit mission orders"),
    CatalogEntry::new("mission_orders", "delete", "Cancel mission orders"),
    CatalogEntry::new("mission_orders", "validate", "Validate mission orders"),
    CatalogEntry::new("squads", "read", "List and view squads"),
    CatalogEntry::new("squads", "create", "Form squads"),
    CatalogEntry::new("squads", "update", "Edit squad composition"),
    CatalogEntry::new("squads", "delete", "Dissolve squads"),
    CatalogEntry::new("declarations", "read", "View transit declarations"),
    CatalogEntry::new("declarations", "create", "File transit declarations"),
    CatalogEntry::new("declarations", "update", "Amend transit declarations"),
    CatalogEntry::new("statistics", "read", "View reporting statistics"),
    CatalogEntry::new("profile", "read", "View own account and capabilities"),
    CatalogEntry::new("permissions", "read", "View capabilities and assignments"),
    CatalogEntry::new("permissions", "create", "Define capabilities"),
    CatalogEntry::new("permissions", "update", "Edit capability definitions"),
    CatalogEntry::new("permissions", "delete", "Retire capability definitions"),
    CatalogEntry::new("permissions", "assign", "Assign capabilities to roles and users"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::PermissionName;

    use super::CAPABILITY_CATALOG;

    #[test]
    fn catalog_names_are_valid_and_unique() {
        let mut seen = HashSet::new();
        for entry in CAPABILITY_CATALOG {
            let name = entry.name();
            assert!(PermissionName::new(name.as_str()).is_ok(), "{name}");
            assert!(seen.insert(name));
        }
    }
}
