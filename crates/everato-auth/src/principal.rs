use std::collections::BTreeSet;

use everato_core::{AdminRole, Permission};

/// An authenticated actor: identity plus role and stored permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: AdminRole,
    pub permissions: BTreeSet<Permission>,
}

impl Principal {
    pub fn new(
        id: impl Into<String>,
        role: AdminRole,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    /// SUPER_ADMIN holds every permission whatever its stored set says.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_super_admin() || self.permissions.contains(&permission)
    }

    /// Broad user-management rights: SUPER_ADMIN or MANAGE_USERS.
    pub fn manages_users(&self) -> bool {
        self.has_permission(Permission::ManageUsers)
    }

    pub fn is(&self, other: &Principal) -> bool {
        self.id == other.id
    }
}
