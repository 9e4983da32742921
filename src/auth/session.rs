use axum_extra::extract::cookie::CookieJar;
use sqlx::Row;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::error::ApiError;
use crate::models::{CurrentUser, Role};

use super::token::{SessionClaims, TokenCodec};

/// Name of the session cookie. Fixed constant; the portal frontend relies
/// on it.
pub const SESSION_COOKIE: &str = "opsdesk_session";

/// Recover the authenticated user from the request's cookie jar.
///
/// Anything wrong with the credential itself (missing cookie, bad signature,
/// expiry, unknown subject, stale token version) resolves to `Ok(None)` and
/// is treated as "logged out"; only infrastructure failures surface as
/// errors. One database read per request, no caching, so role and name
/// changes and session revocation take effect immediately.
pub async fn resolve_session(
    jar: &CookieJar,
    db: &Database,
    codec: &TokenCodec,
) -> Result<Option<CurrentUser>, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match codec.verify(cookie.value()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            return Ok(None);
        }
    };

    let Ok(user_id) = Uuid::parse_str(&claims.sub) else {
        debug!("Session token subject is not a uuid");
        return Ok(None);
    };

    let pool = db.pool().await.map_err(ApiError::from)?;
    let row = sqlx::query(
        "SELECT id, name, email, role, token_version FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| ApiError::from(crate::database::DatabaseError::from(e)))?;

    let Some(row) = row else {
        // User deleted after the token was issued
        return Ok(None);
    };

    let token_version: i32 = row.get("token_version");
    if !token_version_current(&claims, token_version) {
        debug!("Rejected session token with stale tokenVersion for user {}", user_id);
        return Ok(None);
    }

    let stored_role: String = row.get("role");
    let role = match Role::parse(&stored_role) {
        Ok(role) => role,
        Err(raw) => {
            warn!("User {} carries unknown role '{}'; treating as unauthenticated", user_id, raw);
            return Ok(None);
        }
    };

    Ok(Some(CurrentUser {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role,
        token_version,
    }))
}

/// A token is only current while its tokenVersion claim equals the user's
/// stored counter. Incrementing the counter (revoke-sessions, future
/// password-change hooks) invalidates every previously issued token.
fn token_version_current(claims: &SessionClaims, stored: i32) -> bool {
    claims.token_version == stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn claims(token_version: i32) -> SessionClaims {
        SessionClaims {
            sub: Uuid::new_v4().to_string(),
            role: Role::User,
            token_version,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn stale_token_version_is_rejected() {
        // Issued at version 0, then the stored counter was bumped to 1
        assert!(!token_version_current(&claims(0), 1));
    }

    #[test]
    fn matching_token_version_is_current() {
        assert!(token_version_current(&claims(3), 3));
    }
}
