use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application-wide capability tier. Stored as TEXT in the users table and
/// parsed into this closed variant at the model boundary; authorization
/// logic never compares strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse a stored role value. Returns the raw value on failure so the
    /// caller can report which row is corrupt.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "USER" => Ok(Role::User),
            "AGENT" => Ok(Role::Agent),
            "ADMIN" => Ok(Role::Admin),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full identity record. `password` holds a bcrypt hash and is None for
/// OAuth-only accounts. Never serialized to clients; handlers work with
/// CurrentUser instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub google_id: Option<String>,
    pub token_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-request projection of the authenticated user. Excludes the password
/// column by construction: the session resolver never selects it.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub token_version: i32,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            token_version: user.token_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_roles() {
        assert_eq!(Role::parse("USER"), Ok(Role::User));
        assert_eq!(Role::parse("AGENT"), Ok(Role::Agent));
        assert_eq!(Role::parse("ADMIN"), Ok(Role::Admin));
        assert_eq!(Role::parse("admin"), Err("admin".to_string()));
        assert_eq!(Role::parse(""), Err(String::new()));
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"AGENT\"");
        let parsed: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn current_user_never_serializes_token_version() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::User,
            token_version: 3,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("token_version").is_none());
        assert_eq!(value["email"], "ana@example.com");
    }
}
