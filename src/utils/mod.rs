//! Shared utilities.
//!
//! - [`cookies`]: session cookie construction and clearing

pub mod cookies;
