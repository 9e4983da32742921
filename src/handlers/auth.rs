// Auth endpoints: credential login, registration, Google OAuth, logout, me.
// These are the only routes that mint or clear the session cookie.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

use crate::auth::cookie::{
    clear_oauth_state_cookie, clear_session_cookie, oauth_state_cookie, session_cookie,
    OAUTH_STATE_COOKIE,
};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{CurrentUser, User};
use crate::routes::landing_route;
use crate::services::google::{generate_state, GoogleError};
use crate::services::user_service::{validate_password, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Sign a session token for `user` and build the response the login-shaped
/// endpoints share: cookie plus user projection and landing route.
fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, ApiResponse<serde_json::Value>), ApiError> {
    let token = state.codec.sign(user.id, user.role, user.token_version)?;
    let jar = jar.add(session_cookie(token, &state.config.security));
    let current: CurrentUser = user.into();
    let body = json!({
        "user": current,
        "landing": landing_route(user.role),
    });
    Ok((jar, ApiResponse::success(body)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let pool = state.db.pool().await?;
    let users = UserService::new(pool);

    // Unknown email, wrong password and OAuth-only accounts answer alike
    let user = users
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    issue_session(&state, jar, &user)
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut field_errors = HashMap::new();
    if body.name.trim().is_empty() {
        field_errors.insert("name".to_string(), "name is required".to_string());
    }
    if !body.email.contains('@') {
        field_errors.insert("email".to_string(), "a valid email is required".to_string());
    }
    if let Err(reason) = validate_password(&body.password) {
        field_errors.insert("password".to_string(), reason);
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid registration", Some(field_errors)));
    }

    let pool = state.db.pool().await?;
    let users = UserService::new(pool);
    let user = users.register(body.name.trim(), &body.email, &body.password).await?;

    let (jar, response) = issue_session(&state, jar, &user)?;
    Ok((jar, ApiResponse::created(response.data)))
}

/// POST /api/auth/logout. Idempotent; clearing an absent cookie is fine.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_session_cookie(&state.config.security));
    (jar, ApiResponse::success(json!({ "loggedOut": true })))
}

/// GET /api/auth/me
pub async fn me(user: CurrentUser) -> ApiResult<serde_json::Value> {
    let landing = landing_route(user.role);
    Ok(ApiResponse::success(json!({
        "user": user,
        "landing": landing,
    })))
}

fn login_error_redirect(reason: &str) -> Redirect {
    Redirect::to(&format!("/login?error={}", reason))
}

/// GET /api/auth/google. Sends the browser to Google's consent screen with
/// a state nonce pinned in a short-lived cookie.
pub async fn google_start(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let nonce = generate_state();
    match state.google.consent_url(&nonce) {
        Ok(url) => {
            let jar = jar.add(oauth_state_cookie(nonce, &state.config.security));
            (jar, Redirect::to(&url)).into_response()
        }
        Err(GoogleError::NotConfigured) => login_error_redirect("google_unavailable").into_response(),
        Err(e) => {
            warn!("Google consent URL failed: {}", e);
            login_error_redirect("google_unavailable").into_response()
        }
    }
}

/// GET /api/auth/google/callback. Every failure lands back on the login
/// page with an error tag; only a fully validated Google identity gets a
/// session cookie.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<GoogleCallbackQuery>,
) -> impl IntoResponse {
    // Read the pinned nonce before the jar gains the clearing cookie
    let expected_state = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.add(clear_oauth_state_cookie(&state.config.security));

    if let Some(error) = query.error.as_deref() {
        warn!("Google callback reported: {}", error);
        return (jar, login_error_redirect("google_denied")).into_response();
    }

    if expected_state.as_deref() != Some(query.state.as_str()) || query.state.is_empty() {
        return (jar, login_error_redirect("oauth_state")).into_response();
    }

    match google_sign_in(&state, &query).await {
        Ok(user) => match issue_session(&state, jar, &user) {
            Ok((jar, _)) => (jar, Redirect::to(landing_route(user.role))).into_response(),
            Err(e) => {
                warn!("Session issue after Google login failed: {}", e);
                login_error_redirect("session").into_response()
            }
        },
        Err(CallbackError::State) => (jar, login_error_redirect("oauth_state")).into_response(),
        Err(CallbackError::Domain) => (jar, login_error_redirect("domain_not_allowed")).into_response(),
        Err(CallbackError::Other) => (jar, login_error_redirect("google_failed")).into_response(),
    }
}

enum CallbackError {
    State,
    Domain,
    Other,
}

async fn google_sign_in(state: &AppState, query: &GoogleCallbackQuery) -> Result<User, CallbackError> {
    if query.code.is_empty() {
        return Err(CallbackError::State);
    }

    let access_token = state.google.exchange_code(&query.code).await.map_err(|e| {
        warn!("Google code exchange failed: {}", e);
        CallbackError::Other
    })?;

    let profile = state.google.fetch_user(&access_token).await.map_err(|e| match e {
        GoogleError::DomainNotAllowed(email) => {
            warn!("Rejected Google login from disallowed domain: {}", email);
            CallbackError::Domain
        }
        other => {
            warn!("Google userinfo failed: {}", other);
            CallbackError::Other
        }
    })?;

    let pool = state.db.pool().await.map_err(|e| {
        warn!("Database unavailable during Google login: {}", e);
        CallbackError::Other
    })?;
    let users = UserService::new(pool);
    users
        .find_or_create_google(&profile.id, &profile.email, &profile.name)
        .await
        .map_err(|e| {
            warn!("Google account provisioning failed: {}", e);
            CallbackError::Other
        })
}
