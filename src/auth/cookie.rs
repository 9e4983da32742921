use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::SecurityConfig;

use super::session::SESSION_COOKIE;

/// Name of the short-lived cookie holding the OAuth state nonce.
pub const OAUTH_STATE_COOKIE: &str = "opsdesk_oauth_state";

/// Build the session cookie. Max-Age mirrors the token TTL so cookie and
/// token lapse together.
pub fn session_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::hours(security.session_ttl_hours as i64))
        .build()
}

/// Expire the session cookie immediately. Attributes must match the ones it
/// was set with or browsers keep the original.
pub fn clear_session_cookie(security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// State nonce cookie for the Google OAuth round trip. Ten minutes is ample
/// for a consent screen.
pub fn oauth_state_cookie(state: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, state))
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::minutes(10))
        .build()
}

pub fn clear_oauth_state_cookie(security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, ""))
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secure: bool) -> SecurityConfig {
        SecurityConfig {
            session_secret: "s".to_string(),
            session_ttl_hours: 168,
            cookie_secure: secure,
        }
    }

    #[test]
    fn session_cookie_carries_the_required_attributes() {
        let cookie = session_cookie("token-value".to_string(), &security(true));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(168)));
    }

    #[test]
    fn secure_attribute_follows_config() {
        let cookie = session_cookie("t".to_string(), &security(false));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn clearing_zeroes_the_max_age() {
        let cookie = clear_session_cookie(&security(true));
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
