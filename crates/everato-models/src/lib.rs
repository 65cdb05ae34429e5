//! # Everato Models
//!
//! Domain models and request/response DTOs for the Everato API.
//!
//! - [`admins`]: administrative accounts, their management DTOs and catalogs
//! - [`users`]: regular accounts and the login flow
//!
//! Entities holding a password hash ([`admins::Admin`], [`users::User`]) are
//! deliberately not `Serialize`; handlers respond with the `*Response` types.

pub mod admins;
pub mod users;

pub use admins::{Admin, AdminResponse};
pub use users::{MessageResponse, User, UserResponse};
