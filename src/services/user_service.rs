use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::{Role, User};

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
const MIN_PASSWORD_LEN: usize = 8;
const TEMP_PASSWORD_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Stored role is not a known value: {0}")]
    InvalidStoredRole(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Client-facing projection used by the admin listing. Never carries the
/// password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub has_password: bool,
    pub has_google: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub agent_users: i64,
    pub total_boards: i64,
    pub total_cards: i64,
}

pub struct UserService {
    pool: PgPool,
}

const USER_COLUMNS: &str =
    "id, name, email, password, role, google_id, token_version, created_at, updated_at";

fn user_from_row(row: PgRow) -> Result<User, UserError> {
    let stored_role: String = row.get("role");
    let role = Role::parse(&stored_role).map_err(UserError::InvalidStoredRole)?;
    Ok(User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password: row.get("password"),
        role,
        google_id: row.get("google_id"),
        token_version: row.get("token_version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

/// Generate a temporary password for admin-created accounts. Regenerates
/// until the candidate carries at least one letter and one digit so the
/// portal's password policy accepts it unchanged.
pub fn generate_temp_password() -> String {
    loop {
        let candidate: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TEMP_PASSWORD_LEN)
            .map(char::from)
            .collect();
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        let has_alpha = candidate.chars().any(|c| c.is_ascii_alphabetic());
        if has_digit && has_alpha {
            return candidate;
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    Ok(())
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    /// Credential login. Returns None for unknown email, wrong password, or
    /// an OAuth-only account; callers answer all three identically so the
    /// response does not reveal which accounts exist.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let Some(hash) = user.password.as_deref() else {
            // OAuth-only account; no password to check
            return Ok(None);
        };
        let matches =
            bcrypt::verify(password, hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        Ok(if matches { Some(user) } else { None })
    }

    /// Self-service registration; always creates a USER account.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, UserError> {
        let hash =
            bcrypt::hash(password, BCRYPT_COST).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        self.insert(name, email, Some(&hash), Role::User, None).await
    }

    /// Bootstrap path for the operator CLI: the first ADMIN account has no
    /// self-service way to exist.
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> Result<User, UserError> {
        let hash =
            bcrypt::hash(password, BCRYPT_COST).map_err(|e| UserError::PasswordHash(e.to_string()))?;
        self.insert(name, email, Some(&hash), Role::Admin, None).await
    }

    /// Admin-created collaborator account. The generated temporary password
    /// is returned exactly once, alongside the created user.
    pub async fn create_collaborator(
        &self,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<(User, String), UserError> {
        let temp_password = generate_temp_password();
        let hash = bcrypt::hash(&temp_password, BCRYPT_COST)
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;
        let user = self.insert(name, email, Some(&hash), role, None).await?;
        info!("Created collaborator {} with role {}", user.email, user.role);
        Ok((user, temp_password))
    }

    /// Look up a user for a Google login, linking or creating as needed:
    /// match on google_id first, then attach the google_id to an existing
    /// account with the same email, else create a fresh USER account with no
    /// password.
    pub async fn find_or_create_google(
        &self,
        google_id: &str,
        email: &str,
        name: &str,
    ) -> Result<User, UserError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE google_id = $1", USER_COLUMNS))
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = row {
            return user_from_row(row);
        }

        if let Some(existing) = self.find_by_email(email).await? {
            let row = sqlx::query(&format!(
                "UPDATE users SET google_id = $1, updated_at = now() WHERE id = $2 RETURNING {}",
                USER_COLUMNS
            ))
            .bind(google_id)
            .bind(existing.id)
            .fetch_one(&self.pool)
            .await?;
            info!("Linked Google account to {}", email);
            return user_from_row(row);
        }

        self.insert(name, email, None, Role::User, Some(google_id)).await
    }

    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        role: Role,
        google_id: Option<&str>,
    ) -> Result<User, UserError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, name, email, password, role, google_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(google_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                UserError::EmailTaken(email.to_string())
            } else {
                UserError::Database(e)
            }
        })?;
        user_from_row(row)
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, UserError> {
        let rows = sqlx::query(
            "SELECT id, name, email, role, password IS NOT NULL AS has_password, \
             google_id IS NOT NULL AS has_google, created_at \
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let stored_role: String = row.get("role");
                let role = Role::parse(&stored_role).map_err(UserError::InvalidStoredRole)?;
                Ok(UserSummary {
                    id: row.get("id"),
                    name: row.get("name"),
                    email: row.get("email"),
                    role,
                    has_password: row.get("has_password"),
                    has_google: row.get("has_google"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Change a user's application role. Role changes take effect on the
    /// target's next request; the session resolver re-reads the row every
    /// time.
    pub async fn set_role(&self, id: Uuid, role: Role) -> Result<User, UserError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET role = $1, updated_at = now() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserError::NotFound)?;
        user_from_row(row)
    }

    /// Invalidate every outstanding session for a user by bumping the
    /// token_version counter. Tokens minted before the bump fail the
    /// resolver's version check on their next request. Returns the new
    /// counter value.
    pub async fn revoke_sessions(&self, id: Uuid) -> Result<i32, UserError> {
        let row = sqlx::query(
            "UPDATE users SET token_version = token_version + 1, updated_at = now() \
             WHERE id = $1 RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserError::NotFound)?;
        let version: i32 = row.get("token_version");
        info!("Revoked sessions for user {} (token_version now {})", id, version);
        Ok(version)
    }

    pub async fn stats(&self) -> Result<AdminStats, UserError> {
        let row = sqlx::query(
            "SELECT \
               (SELECT count(*) FROM users) AS total_users, \
               (SELECT count(*) FROM users WHERE role = 'ADMIN') AS admin_users, \
               (SELECT count(*) FROM users WHERE role = 'AGENT') AS agent_users, \
               (SELECT count(*) FROM boards) AS total_boards, \
               (SELECT count(*) FROM cards) AS total_cards",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(AdminStats {
            total_users: row.get("total_users"),
            admin_users: row.get("admin_users"),
            agent_users: row.get("agent_users"),
            total_boards: row.get("total_boards"),
            total_cards: row.get("total_cards"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_passwords_satisfy_the_policy() {
        for _ in 0..20 {
            let password = generate_temp_password();
            assert_eq!(password.len(), TEMP_PASSWORD_LEN);
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| c.is_ascii_alphabetic()));
            validate_password(&password).unwrap();
        }
    }

    #[test]
    fn temp_passwords_are_not_repeated() {
        let a = generate_temp_password();
        let b = generate_temp_password();
        assert_ne!(a, b);
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn bcrypt_round_trip() {
        // Cost 4 keeps the test fast; production uses DEFAULT_COST
        let hash = bcrypt::hash("hunter2-hunter2", 4).unwrap();
        assert!(bcrypt::verify("hunter2-hunter2", &hash).unwrap());
        assert!(!bcrypt::verify("wrong-password", &hash).unwrap());
    }
}
