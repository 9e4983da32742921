use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::ApiError;
use crate::models::{CurrentUser, Role};
use crate::routes::{self, RouteKind, RouteTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

/// Decide whether a request may proceed, in classification order: public
/// paths pass unconditionally, then missing identity, then insufficient
/// role. Pure so it is testable without a request in flight.
pub fn authorize(path: &str, user: Option<&CurrentUser>) -> Decision {
    let tier = routes::classify(path);

    if tier == RouteTier::Public {
        return Decision::Allow;
    }

    let Some(user) = user else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if tier == RouteTier::AdminOnly && user.role != Role::Admin {
        return Decision::Deny(DenyReason::Forbidden);
    }

    Decision::Allow
}

/// Map a denial to its HTTP shape. API callers get JSON status codes; page
/// requests get a login redirect, except that a forbidden page answers 404
/// so non-admins cannot learn which admin routes exist.
pub fn deny_response(path: &str, reason: DenyReason) -> Response {
    match (routes::route_kind(path), reason) {
        (RouteKind::Api, DenyReason::Unauthenticated) => {
            ApiError::unauthorized("Authentication required").into_response()
        }
        (RouteKind::Api, DenyReason::Forbidden) => {
            ApiError::forbidden("Insufficient permissions").into_response()
        }
        (RouteKind::Page, DenyReason::Unauthenticated) => Redirect::to("/login").into_response(),
        (RouteKind::Page, DenyReason::Forbidden) => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
            token_version: 0,
        }
    }

    #[test]
    fn public_paths_allow_anyone() {
        assert_eq!(authorize("/login", None), Decision::Allow);
        assert_eq!(authorize("/api/auth/login", None), Decision::Allow);
        assert_eq!(authorize("/", Some(&user(Role::User))), Decision::Allow);
    }

    #[test]
    fn protected_paths_need_identity() {
        assert_eq!(
            authorize("/tickets", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            authorize("/api/boards", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(authorize("/tickets", Some(&user(Role::User))), Decision::Allow);
    }

    #[test]
    fn admin_paths_need_the_admin_role() {
        for non_admin in [Role::User, Role::Agent] {
            assert_eq!(
                authorize("/admin/users", Some(&user(non_admin))),
                Decision::Deny(DenyReason::Forbidden)
            );
            assert_eq!(
                authorize("/api/admin/stats", Some(&user(non_admin))),
                Decision::Deny(DenyReason::Forbidden)
            );
        }
        assert_eq!(authorize("/admin/users", Some(&user(Role::Admin))), Decision::Allow);
        assert_eq!(authorize("/api/admin/stats", Some(&user(Role::Admin))), Decision::Allow);
    }

    #[test]
    fn unauthenticated_beats_forbidden() {
        // A missing identity on an admin path reports Unauthenticated, not Forbidden
        assert_eq!(
            authorize("/admin", None),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn api_denials_are_status_codes() {
        let res = deny_response("/api/boards", DenyReason::Unauthenticated);
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = deny_response("/api/admin/users", DenyReason::Forbidden);
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn page_denials_redirect_or_hide() {
        let res = deny_response("/tickets", DenyReason::Unauthenticated);
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get("location").unwrap(), "/login");

        // Forbidden admin pages answer 404, deliberately not 403
        let res = deny_response("/admin", DenyReason::Forbidden);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
