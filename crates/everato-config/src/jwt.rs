use std::env;
use std::time::Duration;

use crate::duration_from_env;

pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub token_lifetime: Duration,
    /// Written to the `iss` claim.
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            token_lifetime: duration_from_env("JWT_EXPIRATION", DEFAULT_TOKEN_LIFETIME),
            issuer: env::var("APP_NAME").unwrap_or_else(|_| "everato".to_string()),
        }
    }

    /// Lifetime in whole seconds, as used for `exp` and cookie `Max-Age`.
    pub fn token_lifetime_secs(&self) -> i64 {
        self.token_lifetime.as_secs() as i64
    }
}
