use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::resolve_session;
use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Resolved identity for the current request, present on every request once
/// the session middleware has run. `None` means "logged out".
#[derive(Clone, Debug)]
pub struct Session(pub Option<CurrentUser>);

/// Global middleware resolving the session cookie into a `Session`
/// extension. Runs for every request, including paths with no handler, so
/// the gate downstream always has an identity to work with.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_session(&jar, &state.db, &state.codec).await?;
    request.extensions_mut().insert(Session(user));
    Ok(next.run(request).await)
}

/// Handler extractor for routes the gate has already admitted. Rejects with
/// 401 if somehow reached without an authenticated session.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .and_then(|session| session.0.clone())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
