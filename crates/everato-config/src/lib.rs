//! # Everato Config
//!
//! Configuration types for the Everato API.
//!
//! Every structure is loaded once at process start from environment variables
//! (a `.env` file is honoured by the binaries through `dotenvy`):
//!
//! - [`jwt`]: token signing secret, lifetime and issuer
//! - [`server`]: bind address, API prefix, request timeout and cookie settings
//! - [`database`]: connection URL and pool sizing
//! - [`cors`]: allowed origins
//!
//! Durations are written the human way (`"15s"`, `"12h"`, `"1h 30m"`).
//!
//! # Example
//!
//! ```ignore
//! use everato_config::{JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::{DEFAULT_REQUEST_TIMEOUT, ServerConfig};

use std::env;
use std::time::Duration;

/// Parses a non-zero human duration, returning `None` for anything else.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    humantime::parse_duration(raw.trim())
        .ok()
        .filter(|d| !d.is_zero())
}

/// Reads a duration variable, falling back to `default` (with a warning) when it
/// is set but unparseable.
pub(crate) fn duration_from_env(key: &str, default: Duration) -> Duration {
    match env::var(key) {
        Ok(raw) => parse_duration(&raw).unwrap_or_else(|| {
            tracing::warn!(
                key,
                value = %raw,
                fallback = ?default,
                "invalid duration in configuration, using fallback"
            );
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_accepts_human_units() {
        assert_eq!(parse_duration("15s"), Some(Duration::from_secs(15)));
        assert_eq!(parse_duration("12h"), Some(Duration::from_secs(12 * 3600)));
        assert_eq!(parse_duration(" 250ms "), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage_and_zero() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("0s"), None);
    }
}
