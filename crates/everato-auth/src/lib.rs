//! # Everato Auth
//!
//! Authentication and authorization primitives for the Everato API.
//!
//! This crate provides:
//!
//! - [`claims`]: the JWT claim set carried by session tokens
//! - [`jwt`]: the [`TokenSigner`] codec (HS256 only)
//! - [`principal`]: the authenticated actor with role and permissions
//! - [`policy`]: the pure decision engine consulted by administrative handlers
//!
//! # Example
//!
//! ```ignore
//! use everato_auth::{AdminAction, Principal, TokenSigner, authorize};
//!
//! let signer = TokenSigner::from_config(&jwt_config);
//! let claims = signer.verify(&token)?;
//! let uid = claims.uid()?;
//!
//! authorize(&actor, &AdminAction::Delete { target: &target }).into_result()?;
//! ```

pub mod claims;
pub mod jwt;
pub mod policy;
pub mod principal;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::TokenSigner;
pub use policy::{AdminAction, Decision, authorize};
pub use principal::Principal;
