//! Permission vocabulary and administrative roles for the Everato API.
//!
//! Permissions are drawn from a fixed set of tags. A role's stored permission set
//! is what the authorization engine consults, except for [`AdminRole::SuperAdmin`],
//! which implicitly holds every permission regardless of what is stored.
//!
//! Both enums serialize as their SCREAMING_SNAKE_CASE tag (`"MANAGE_USERS"`,
//! `"SUPER_ADMIN"`), which is also how they are stored in the database.
//!
//! # Example
//!
//! ```ignore
//! use everato_core::permissions::{AdminRole, Permission};
//!
//! let permission: Permission = "MANAGE_USERS".parse()?;
//! assert_eq!(permission.as_str(), "MANAGE_USERS");
//! assert!(AdminRole::SuperAdmin.is_super_admin());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Returned when a role or permission string is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// =============================================================================
// Permissions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ManageEvents,
    CreateEvent,
    EditEvent,
    DeleteEvent,
    ViewEvent,
    ManageBookings,
    CreateBooking,
    EditBooking,
    DeleteBooking,
    ViewBooking,
    ManageUsers,
    ViewReports,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::ManageEvents,
        Permission::CreateEvent,
        Permission::EditEvent,
        Permission::DeleteEvent,
        Permission::ViewEvent,
        Permission::ManageBookings,
        Permission::CreateBooking,
        Permission::EditBooking,
        Permission::DeleteBooking,
        Permission::ViewBooking,
        Permission::ManageUsers,
        Permission::ViewReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageEvents => "MANAGE_EVENTS",
            Permission::CreateEvent => "CREATE_EVENT",
            Permission::EditEvent => "EDIT_EVENT",
            Permission::DeleteEvent => "DELETE_EVENT",
            Permission::ViewEvent => "VIEW_EVENT",
            Permission::ManageBookings => "MANAGE_BOOKINGS",
            Permission::CreateBooking => "CREATE_BOOKING",
            Permission::EditBooking => "EDIT_BOOKING",
            Permission::DeleteBooking => "DELETE_BOOKING",
            Permission::ViewBooking => "VIEW_BOOKING",
            Permission::ManageUsers => "MANAGE_USERS",
            Permission::ViewReports => "VIEW_REPORTS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::ManageEvents => "Full control over all events",
            Permission::CreateEvent => "Ability to create new events",
            Permission::EditEvent => "Ability to modify existing events",
            Permission::DeleteEvent => "Ability to remove events from the system",
            Permission::ViewEvent => "Ability to view event details",
            Permission::ManageBookings => "Full control over all bookings",
            Permission::CreateBooking => "Ability to create new bookings",
            Permission::EditBooking => "Ability to modify existing bookings",
            Permission::DeleteBooking => "Ability to cancel bookings",
            Permission::ViewBooking => "Ability to view booking details",
            Permission::ManageUsers => "Ability to manage user accounts and permissions",
            Permission::ViewReports => "Ability to view system reports and analytics",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "permission",
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Roles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
    User,
}

impl AdminRole {
    pub const ALL: [AdminRole; 4] = [
        AdminRole::SuperAdmin,
        AdminRole::Admin,
        AdminRole::Editor,
        AdminRole::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "SUPER_ADMIN",
            AdminRole::Admin => "ADMIN",
            AdminRole::Editor => "EDITOR",
            AdminRole::User => "USER",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "Full system access with all permissions",
            AdminRole::Admin => "Administrative access to manage events and users",
            AdminRole::Editor => "Limited access to edit content only",
            AdminRole::User => "Regular account without administrative access",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, AdminRole::SuperAdmin)
    }

    /// Roles that may hold an administrative session.
    pub fn is_admin(&self) -> bool {
        !matches!(self, AdminRole::User)
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}
