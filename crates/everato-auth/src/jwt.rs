//! Token codec: signing and verification of session tokens.
//!
//! Tokens are compact JWS strings signed with HMAC-SHA256 under a single shared
//! secret. Verification pins the algorithm to exactly `HS256` before the
//! signature is even looked at, so a token whose header advertises any other
//! algorithm (an asymmetric one, a different HMAC width, or a forged header
//! spliced onto a valid body) fails with [`AuthError::InvalidSignature`].
//!
//! # Example
//!
//! ```ignore
//! use everato_auth::{Claims, TokenSigner};
//! use everato_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let signer = TokenSigner::from_config(&config);
//!
//! let (token, claims) = signer.issue(&admin_id.to_string(), "alice")?;
//! let verified = signer.verify(&token)?;
//! assert_eq!(verified, claims);
//! ```

use std::fmt;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind,
};

use everato_config::JwtConfig;
use everato_core::{AppError, AuthError};

use crate::claims::Claims;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies session tokens with one shared HMAC secret.
///
/// Cheap to clone; keys are reference-counted internally by `jsonwebtoken`.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime_secs: i64,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &ALGORITHM)
            .field("issuer", &self.issuer)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &str, issuer: impl Into<String>, lifetime_secs: i64) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        // `aud` is informational and differs per account.
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.into(),
            lifetime_secs,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, &config.issuer, config.token_lifetime_secs())
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Signs an arbitrary claim set.
    ///
    /// # Errors
    ///
    /// Fails only if the claims cannot be serialized.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
    }

    /// Builds login claims for `id`/`username` and signs them.
    pub fn issue(&self, id: &str, username: &str) -> Result<(String, Claims), AppError> {
        let claims = Claims::for_login(id, username, &self.issuer, self.lifetime_secs);
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    /// Verifies signature, algorithm and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MalformedToken`] if the token cannot be parsed
    /// - [`AuthError::InvalidSignature`] for a foreign key or any algorithm other than `HS256`
    /// - [`AuthError::Expired`] once `exp` has passed
    ///
    /// The `uid` claim is not checked here; see [`Claims::uid`].
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != ALGORITHM {
            tracing::debug!(alg = ?header.alg, "rejecting token with unexpected algorithm");
            return Err(AuthError::InvalidSignature);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn get_test_signer() -> TokenSigner {
        TokenSigner::new(SECRET, "everato", 3600)
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let signer = get_test_signer();
        let claims = Claims::for_login("0b6d3c1e", "alice", "everato", 3600);

        let token = signer.sign(&claims).unwrap();
        let verified = signer.verify(&token).unwrap();

        assert_eq!(verified, claims);
    }

    #[test]
    fn test_issue_uses_configured_lifetime() {
        let signer = get_test_signer();
        let (token, claims) = signer.issue("7", "bob").unwrap();

        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(signer.verify(&token).unwrap().uid(), Ok("7"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let signer = get_test_signer();
        let (token, _) = signer.issue("7", "bob").unwrap();

        let other = TokenSigner::new("different-secret-key-at-least-32-characters", "everato", 3600);
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_other_hmac_width() {
        let claims = Claims::for_login("7", "bob", "everato", 3600);
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            get_test_signer().verify(&token),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_forged_asymmetric_header() {
        let signer = get_test_signer();
        let (token, _) = signer.issue("7", "bob").unwrap();

        // {"alg":"RS256","typ":"JWT"} spliced over a genuine HS256 body.
        let mut parts = token.splitn(2, '.');
        let _ = parts.next();
        let forged = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", parts.next().unwrap());

        assert_eq!(signer.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_unsigned_token() {
        let signer = get_test_signer();
        let (token, _) = signer.issue("7", "bob").unwrap();
        let payload = token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert_eq!(signer.verify(&unsigned), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let signer = get_test_signer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            iat: now - 7200,
            exp: now - 60,
            ..Claims::for_login("7", "bob", "everato", 3600)
        };
        let token = signer.sign(&claims).unwrap();

        assert_eq!(signer.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let signer = get_test_signer();
        assert_eq!(signer.verify("invalid-token"), Err(AuthError::MalformedToken));
        assert_eq!(signer.verify(""), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_verified_token_without_uid_is_not_trusted() {
        let signer = get_test_signer();
        let claims = Claims {
            uid: None,
            ..Claims::for_login("7", "bob", "everato", 3600)
        };
        let token = signer.sign(&claims).unwrap();

        let verified = signer.verify(&token).unwrap();
        assert_eq!(verified.uid(), Err(AuthError::MissingClaim));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let rendered = format!("{:?}", get_test_signer());
        assert!(!rendered.contains(SECRET));
    }
}
