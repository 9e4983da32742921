use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::auth::{authorize, deny_response, Decision};

use super::session::Session;

/// Authorization gate consulted before any handler executes. Relies on the
/// session middleware having stored a `Session` extension; a missing
/// extension is treated as logged out.
pub async fn gate_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let user = request
        .extensions()
        .get::<Session>()
        .and_then(|session| session.0.clone());

    match authorize(&path, user.as_ref()) {
        Decision::Allow => next.run(request).await,
        Decision::Deny(reason) => {
            debug!("Denied {} ({:?})", path, reason);
            deny_response(&path, reason)
        }
    }
}
