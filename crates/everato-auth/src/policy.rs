//! Authorization decision engine for administrative actions.
//!
//! Every administrative handler describes what it is about to do as an
//! [`AdminAction`] and asks [`authorize`] for a [`Decision`]. The functions here
//! are pure: they see only the acting principal (as currently stored, not as
//! remembered by a token) and the target, and never touch I/O.
//!
//! # Rules
//!
//! | Action | Allowed when |
//! |--------|--------------|
//! | Create | actor is SUPER_ADMIN or holds MANAGE_USERS; a SUPER_ADMIN may only be created by a SUPER_ADMIN |
//! | View | actor is the target, is SUPER_ADMIN, or holds MANAGE_USERS |
//! | Search / list | actor is SUPER_ADMIN or holds MANAGE_USERS |
//! | Update | actor is the target, is SUPER_ADMIN, or holds MANAGE_USERS and the target is not SUPER_ADMIN |
//! | Role / permission assignment | as Update, minus the self clause; assigning SUPER_ADMIN requires a SUPER_ADMIN |
//! | Delete | actor is SUPER_ADMIN, or holds MANAGE_USERS and the target is not SUPER_ADMIN; a SUPER_ADMIN never deletes itself |

use everato_core::{AdminRole, AuthError};

use crate::principal::Principal;

#[derive(Debug, Clone, Copy)]
pub enum AdminAction<'a> {
    Create {
        role: AdminRole,
    },
    Update {
        target: &'a Principal,
        new_role: Option<AdminRole>,
        changes_permissions: bool,
    },
    Delete {
        target: &'a Principal,
    },
    View {
        target: &'a Principal,
    },
    Search,
}

impl AdminAction<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::Create { .. } => "create",
            AdminAction::Update { .. } => "update",
            AdminAction::Delete { .. } => "delete",
            AdminAction::View { .. } => "view",
            AdminAction::Search => "search",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AuthError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }

    fn allow_if(condition: bool) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(AuthError::InsufficientPermission)
        }
    }
}

pub fn authorize(actor: &Principal, action: &AdminAction<'_>) -> Decision {
    match *action {
        AdminAction::Create { role } => can_create(actor, role),
        AdminAction::Update {
            target,
            new_role,
            changes_permissions,
        } => can_update(actor, target, new_role, changes_permissions),
        AdminAction::Delete { target } => can_delete(actor, target),
        AdminAction::View { target } => can_view(actor, target),
        AdminAction::Search => Decision::allow_if(actor.manages_users()),
    }
}

/// SUPER_ADMIN over anyone; MANAGE_USERS over anyone but a SUPER_ADMIN.
fn manages(actor: &Principal, target: &Principal) -> bool {
    actor.is_super_admin() || (actor.manages_users() && !target.is_super_admin())
}

fn can_create(actor: &Principal, role: AdminRole) -> Decision {
    if !actor.manages_users() {
        return Decision::Deny(AuthError::InsufficientPermission);
    }
    Decision::allow_if(!role.is_super_admin() || actor.is_super_admin())
}

fn can_view(actor: &Principal, target: &Principal) -> Decision {
    Decision::allow_if(actor.is(target) || actor.manages_users())
}

fn can_update(
    actor: &Principal,
    target: &Principal,
    new_role: Option<AdminRole>,
    changes_permissions: bool,
) -> Decision {
    if !(actor.is(target) || manages(actor, target)) {
        return Decision::Deny(AuthError::InsufficientPermission);
    }

    if new_role.is_some_and(|role| role.is_super_admin()) && !actor.is_super_admin() {
        return Decision::Deny(AuthError::InsufficientPermission);
    }

    // Self-service covers profile fields; granting rights is administrative.
    let assigns_rights = new_role.is_some() || changes_permissions;
    Decision::allow_if(!assigns_rights || manages(actor, target))
}

fn can_delete(actor: &Principal, target: &Principal) -> Decision {
    if actor.is(target) && actor.is_super_admin() {
        return Decision::Deny(AuthError::SelfActionForbidden);
    }
    Decision::allow_if(manages(actor, target))
}
