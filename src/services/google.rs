use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::GoogleConfig;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth is not configured")]
    NotConfigured,

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Userinfo fetch failed: {0}")]
    Userinfo(String),

    #[error("Email domain not allowed: {0}")]
    DomainNotAllowed(String),
}

/// Profile fields we consume from Google's userinfo response.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    #[serde(rename = "sub")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// True when the email's domain passes the allow-list. No allow-list means
/// any domain may sign in.
pub fn domain_allowed(email: &str, allowed: Option<&str>) -> bool {
    let Some(allowed) = allowed else {
        return true;
    };
    match email.rsplit_once('@') {
        Some((_, domain)) => domain.eq_ignore_ascii_case(allowed),
        None => false,
    }
}

/// Random nonce for the OAuth state round trip.
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Thin client for Google's OAuth code flow: consent URL, code exchange,
/// userinfo fetch, allow-list check.
pub struct GoogleClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the consent-screen URL the login endpoint redirects to.
    pub fn consent_url(&self, state: &str) -> Result<String, GoogleError> {
        if !self.is_configured() {
            return Err(GoogleError::NotConfigured);
        }
        let mut url = url::Url::parse(AUTH_ENDPOINT).expect("static endpoint URL");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        if let Some(domain) = &self.config.allowed_domain {
            // Pre-filters the account chooser; the callback still verifies
            url.query_pairs_mut().append_pair("hd", domain);
        }
        Ok(url.to_string())
    }

    /// Exchange the callback code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GoogleError> {
        if !self.is_configured() {
            return Err(GoogleError::NotConfigured);
        }
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| GoogleError::Exchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            debug!("Google token endpoint answered {}", status);
            return Err(GoogleError::Exchange(format!("token endpoint answered {}", status)));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::Exchange(e.to_string()))?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in user's profile and enforce the domain allow-list.
    pub async fn fetch_user(&self, access_token: &str) -> Result<GoogleUser, GoogleError> {
        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GoogleError::Userinfo(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleError::Userinfo(format!(
                "userinfo endpoint answered {}",
                response.status()
            )));
        }
        let user: GoogleUser = response
            .json()
            .await
            .map_err(|e| GoogleError::Userinfo(e.to_string()))?;

        if !domain_allowed(&user.email, self.config.allowed_domain.as_deref()) {
            return Err(GoogleError::DomainNotAllowed(user.email));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_allow_list_admits_everyone() {
        assert!(domain_allowed("ana@example.com", None));
        assert!(domain_allowed("not-an-email", None));
    }

    #[test]
    fn allow_list_checks_the_domain() {
        assert!(domain_allowed("ana@corp.example", Some("corp.example")));
        assert!(domain_allowed("ana@CORP.EXAMPLE", Some("corp.example")));
        assert!(!domain_allowed("ana@other.example", Some("corp.example")));
        assert!(!domain_allowed("no-at-sign", Some("corp.example")));
        // Only the last @ splits user from domain
        assert!(!domain_allowed("ana@corp.example@other.example", Some("corp.example")));
    }

    #[test]
    fn consent_url_carries_the_oauth_parameters() {
        let client = GoogleClient::new(GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:3000/api/auth/google/callback".to_string(),
            allowed_domain: Some("corp.example".to_string()),
        });
        let url = client.consent_url("state-nonce").unwrap();
        assert!(url.starts_with(AUTH_ENDPOINT));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=state-nonce"));
        assert!(url.contains("hd=corp.example"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn unconfigured_client_refuses() {
        let client = GoogleClient::new(GoogleConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            allowed_domain: None,
        });
        assert!(matches!(client.consent_url("s"), Err(GoogleError::NotConfigured)));
    }

    #[test]
    fn state_nonces_are_long_and_distinct() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
