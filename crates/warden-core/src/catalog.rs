//! Static permission catalog: the `(resource, action)` pairs the system
//! ships with, and the canonical permission-name format.

/// Built-in catalog entries: `(resource, action, description)`.
///
/// These are seeded into the store at startup; additional entries can be
/// created at runtime through the permission repository.
pub const BUILTIN_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("documents", "read", "Read documents"),
    ("documents", "create", "Create documents"),
    ("documents", "edit", "Edit documents"),
    ("documents", "delete", "Delete documents"),
    ("reports", "read", "View reports"),
    ("reports", "create", "Create reports"),
    ("reports", "export", "Export reports"),
    ("profiles", "read", "View user profiles"),
    ("profiles", "edit", "Edit own profile"),
    ("admin", "manage-users", "Manage user accounts"),
    ("admin", "manage-roles", "Manage roles and grants"),
    ("admin", "configure", "Change system configuration"),
];

/// Canonical permission identifier for a `(resource, action)` pair.
pub fn permission_name(resource: &str, action: &str) -> String {
    format!("{resource}:{action}")
}

/// Look up a built-in catalog entry. Returns the canonical name, or
/// `None` for pairs outside the shipped catalog.
pub fn lookup(resource: &str, action: &str) -> Option<String> {
    BUILTIN_PERMISSIONS
        .iter()
        .find(|&&(r, a, _)| r == resource && a == action)
        .map(|&(r, a, _)| permission_name(r, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_format_is_resource_colon_action() {
        assert_eq!(permission_name("documents", "create"), "documents:create");
    }

    #[test]
    fn lookup_known_pair() {
        assert_eq!(lookup("reports", "export"), Some("reports:export".into()));
    }

    #[test]
    fn lookup_unknown_pair() {
        assert_eq!(lookup("documents", "frobnicate"), None);
    }

    #[test]
    fn builtin_names_are_unique() {
        let mut names: Vec<String> = BUILTIN_PERMISSIONS
            .iter()
            .map(|&(r, a, _)| permission_name(r, a))
            .collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
