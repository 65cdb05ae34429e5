//! Request pipeline middleware.
//!
//! Every request passes through the layers in this order:
//!
//! 1. [`timeout`]: bounds the whole request with a deadline
//! 2. [`guard`]: authenticates the caller and attaches an
//!    [`AuthContext`](auth::AuthContext)
//! 3. handler, reading identity through the [`auth`] extractors
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AdminUser, AuthUser};
//!
//! // Any authenticated caller
//! async fn me(auth_user: AuthUser) -> impl IntoResponse {
//!     Json(auth_user.uid().to_string())
//! }
//!
//! // Only reachable behind the admin guard
//! async fn delete_admin(admin: AdminUser, Path(id): Path<Uuid>) -> impl IntoResponse {
//!     // ...
//! }
//! ```

pub mod auth;
pub mod guard;
pub mod timeout;
