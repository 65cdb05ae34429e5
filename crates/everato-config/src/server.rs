use std::env;
use std::time::Duration;

use crate::duration_from_env;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Prefix every API route is nested under, e.g. `/api/v1`.
    pub api_prefix: String,
    pub request_timeout: Duration,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    /// Guards answer rejected requests with a redirect to the login page
    /// instead of a JSON body.
    pub redirect_on_reject: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api_prefix: normalize_prefix(
                &env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            ),
            request_timeout: duration_from_env("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT),
            cookie_domain: env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            cookie_secure: flag_from_env("COOKIE_SECURE"),
            redirect_on_reject: flag_from_env("AUTH_REDIRECT"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            api_prefix: "/api/v1".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cookie_domain: None,
            cookie_secure: false,
            redirect_on_reject: false,
        }
    }
}

fn flag_from_env(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Leading slash, no trailing slash.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
