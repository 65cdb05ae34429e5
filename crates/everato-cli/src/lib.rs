//! # Everato CLI
//!
//! Administrative tools that must not be reachable over HTTP. The only
//! command today bootstraps the first SUPER_ADMIN account.

use anyhow::{Context, anyhow};
use sqlx::PgPool;
use validator::{Validate, ValidationErrors};

use everato_core::{AdminRole, Permission, hash_password};
use everato_db::admins::{self, NewAdmin};
use everato_models::Admin;
use everato_models::admins::CreateAdminDto;

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Admin),
    /// An account with the same email or username is already present.
    AlreadyExists,
}

/// Applies the same rules as `POST /admin/create` before anything is hashed
/// or stored.
pub fn validate_super_admin(username: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let dto = CreateAdminDto {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
        role: AdminRole::SuperAdmin.to_string(),
        permissions: Vec::new(),
    };

    dto.validate().map_err(|errors| anyhow!(describe(&errors)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

/// Creates a SUPER_ADMIN holding every permission, unless the email or
/// username is taken.
pub async fn create_super_admin(
    pool: &PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<CreateOutcome> {
    validate_super_admin(username, email, password)?;

    let hashed = hash_password(password).map_err(|e| e.error)?;

    let created = admins::insert_if_not_exists(
        pool,
        NewAdmin {
            username: username.trim(),
            email: email.trim(),
            password: &hashed,
            role: AdminRole::SuperAdmin,
            permissions: &Permission::ALL,
        },
    )
    .await
    .context("Failed to insert super admin")?;

    Ok(match created {
        Some(admin) => CreateOutcome::Created(admin),
        None => CreateOutcome::AlreadyExists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_super_admin() {
        assert!(validate_super_admin("root", "root@everato.example", "password123").is_ok());

        let err = validate_super_admin("ro", "root@everato.example", "password123").unwrap_err();
        assert_eq!(err.to_string(), "Username must be 3-50 characters");

        let err =
            validate_super_admin("root", "not-an-email", "password123").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email format");

        assert!(validate_super_admin("root", "root@everato.example", "short").is_err());
    }

    #[test]
    fn test_username_longer_than_column_is_rejected() {
        let username = "r".repeat(60);
        let err = validate_super_admin(&username, "root@everato.example", "password123")
            .unwrap_err();
        assert_eq!(err.to_string(), "Username must be 3-50 characters");
    }

    #[test]
    fn test_all_violations_are_reported() {
        let err = validate_super_admin("ro", "nope", "short").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Username must be 3-50 characters"));
        assert!(message.contains("Invalid email format"));
        assert!(message.contains("Password must be at least 8 characters"));
    }
}
