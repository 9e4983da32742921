use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Empty means "not configured" and is
    /// reported as such instead of being handed to the pool builder.
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Symmetric secret for session token signing. The same secret must
    /// verify everything it signs; there is no rotation mechanism.
    pub session_secret: String,
    /// Session lifetime. Cookie Max-Age and token exp both derive from it.
    pub session_ttl_hours: u64,
    /// Whether the session cookie carries the Secure attribute.
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// When set, only Google accounts on this email domain may sign in.
    pub allowed_domain: Option<String>,
}

impl GoogleConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }

        // Google OAuth overrides
        if let Ok(v) = env::var("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Ok(v) = env::var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        if let Ok(v) = env::var("GOOGLE_REDIRECT_URI") {
            self.google.redirect_uri = v;
        }
        if let Ok(v) = env::var("GOOGLE_ALLOWED_DOMAIN") {
            self.google.allowed_domain = if v.is_empty() { None } else { Some(v) };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgres://localhost:5432/opsdesk".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            security: SecurityConfig {
                session_secret: "opsdesk-dev-secret".to_string(),
                session_ttl_hours: 24 * 7, // 1 week
                cookie_secure: false,
            },
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: "http://localhost:3000/api/auth/google/callback".to_string(),
                allowed_domain: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 24 * 7,
                cookie_secure: true,
            },
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                allowed_domain: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                session_secret: String::new(),
                session_ttl_hours: 24 * 7,
                cookie_secure: true,
            },
            google: GoogleConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                allowed_domain: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.session_ttl_hours, 168);
        assert!(!config.security.cookie_secure);
        assert!(!config.google.is_configured());
        assert!(config.database.url.contains("opsdesk"));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.cookie_secure);
        assert!(config.security.session_secret.is_empty());
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn test_google_config_requires_all_fields() {
        let mut google = AppConfig::development().google;
        assert!(!google.is_configured());

        google.client_id = "client".to_string();
        google.client_secret = "secret".to_string();
        google.redirect_uri = "http://localhost/cb".to_string();
        assert!(google.is_configured());
    }
}
