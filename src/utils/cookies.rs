use axum_extra::extract::cookie::{Cookie, SameSite};

use everato_config::ServerConfig;

/// Session cookie carrying a freshly issued token.
///
/// `HttpOnly`, `SameSite=Lax`, `Path=/` and a `Max-Age` equal to the token
/// lifetime, so browser and token expire together.
pub fn session_cookie(
    name: &'static str,
    token: String,
    lifetime_secs: i64,
    config: &ServerConfig,
) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(lifetime_secs))
        .build();

    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// A cookie that tells the browser to drop `name` immediately.
pub fn clear_cookie(name: &'static str, config: &ServerConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(name, String::new(), 0, config);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = ServerConfig::default();
        let cookie = session_cookie("jwt", "token".to_string(), 3600, &config);

        assert_eq!(cookie.name(), "jwt");
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
        assert_eq!(cookie.domain(), None);

        let header = cookie.to_string();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Max-Age=3600"));
    }

    #[test]
    fn test_session_cookie_domain_and_secure() {
        let config = ServerConfig {
            cookie_domain: Some("everato.example".to_string()),
            cookie_secure: true,
            ..Default::default()
        };
        let cookie = session_cookie("admin_jwt", "token".to_string(), 60, &config);

        assert_eq!(cookie.domain(), Some("everato.example"));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie("jwt", &ServerConfig::default());

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
    }
}
