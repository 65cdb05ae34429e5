//! # Everato Core
//!
//! Core types, errors, and utilities for the Everato API.
//!
//! This crate provides foundational types used throughout the application:
//!
//! - [`errors`]: Application error type with HTTP response conversion, and the
//!   authentication/authorization failure taxonomy
//! - [`permissions`]: The fixed permission vocabulary and administrative roles
//! - [`password`]: Secure password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use everato_core::errors::{AppError, AuthError};
//! use everato_core::password::{hash_password, verify_password};
//!
//! // Authentication failures carry their own status and reason code
//! let error: AppError = AuthError::Expired.into();
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::{AppError, AuthError};
pub use password::{hash_password, verify_password};
pub use permissions::{AdminRole, Permission};
