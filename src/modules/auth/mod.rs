//! Session endpoints for regular users: login, logout, token refresh and
//! the current identity.

pub mod controller;
pub mod router;
pub mod service;
