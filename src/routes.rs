use crate::models::Role;

/// Authorization tier a path requires before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTier {
    Public,
    AuthRequired,
    AdminOnly,
}

/// Whether a path belongs to the JSON API or to the portal's pages. Decides
/// the shape of a denial (401/403 JSON versus redirect/404).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Page,
    Api,
}

/// Single source of truth for route authorization. Longest matching prefix
/// wins; paths matching nothing fall back to AuthRequired, so forgetting to
/// list a new prefix can lock a route down but never open one up.
///
/// Page prefixes are listed even though pages are rendered elsewhere: the
/// gate still classifies and denies them.
const ROUTE_TABLE: &[(&str, RouteTier)] = &[
    // Portal entry and health
    ("/health", RouteTier::Public),
    ("/login", RouteTier::Public),
    ("/register", RouteTier::Public),
    // Token acquisition
    ("/api/auth/login", RouteTier::Public),
    ("/api/auth/register", RouteTier::Public),
    ("/api/auth/google", RouteTier::Public),
    ("/api/auth/logout", RouteTier::Public),
    // Authenticated API
    ("/api", RouteTier::AuthRequired),
    ("/api/auth/me", RouteTier::AuthRequired),
    ("/api/boards", RouteTier::AuthRequired),
    ("/api/cards", RouteTier::AuthRequired),
    // Authenticated pages
    ("/tickets", RouteTier::AuthRequired),
    ("/boards", RouteTier::AuthRequired),
    ("/projects", RouteTier::AuthRequired),
    ("/docs", RouteTier::AuthRequired),
    ("/trilhas", RouteTier::AuthRequired),
    ("/notifications", RouteTier::AuthRequired),
    ("/profile", RouteTier::AuthRequired),
    // Admin surfaces
    ("/admin", RouteTier::AdminOnly),
    ("/api/admin", RouteTier::AdminOnly),
];

/// True when `path` sits under `prefix` on a segment boundary, so "/admin"
/// covers "/admin" and "/admin/users" but not "/administrator".
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Classify an arbitrary path into its required tier.
pub fn classify(path: &str) -> RouteTier {
    // The bare root is the only public path not listed as a prefix
    if path == "/" {
        return RouteTier::Public;
    }

    let mut best: Option<(&str, RouteTier)> = None;
    for (prefix, tier) in ROUTE_TABLE {
        if matches_prefix(path, prefix) {
            match best {
                Some((current, _)) if current.len() >= prefix.len() => {}
                _ => best = Some((prefix, *tier)),
            }
        }
    }

    best.map(|(_, tier)| tier).unwrap_or(RouteTier::AuthRequired)
}

pub fn route_kind(path: &str) -> RouteKind {
    if path == "/api" || matches_prefix(path, "/api") {
        RouteKind::Api
    } else {
        RouteKind::Page
    }
}

/// Where a user lands after login, by role.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::User | Role::Agent => "/tickets",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_auth_entries_are_public() {
        assert_eq!(classify("/"), RouteTier::Public);
        assert_eq!(classify("/health"), RouteTier::Public);
        assert_eq!(classify("/login"), RouteTier::Public);
        assert_eq!(classify("/api/auth/login"), RouteTier::Public);
        assert_eq!(classify("/api/auth/google/callback"), RouteTier::Public);
    }

    #[test]
    fn longest_prefix_wins() {
        // "/api" alone requires auth; the more specific auth entries are public
        assert_eq!(classify("/api/auth/me"), RouteTier::AuthRequired);
        assert_eq!(classify("/api/auth/logout"), RouteTier::Public);
        assert_eq!(classify("/api/admin/users"), RouteTier::AdminOnly);
        assert_eq!(classify("/api/boards/123"), RouteTier::AuthRequired);
    }

    #[test]
    fn prefixes_match_on_segment_boundaries() {
        assert_eq!(classify("/admin"), RouteTier::AdminOnly);
        assert_eq!(classify("/admin/users"), RouteTier::AdminOnly);
        // Not under /admin; falls to the deny-by-default tier
        assert_eq!(classify("/administrator"), RouteTier::AuthRequired);
        assert_eq!(classify("/loginx"), RouteTier::AuthRequired);
    }

    #[test]
    fn unknown_paths_require_auth_by_default() {
        assert_eq!(classify("/reports/weekly"), RouteTier::AuthRequired);
        assert_eq!(classify("/api/unknown"), RouteTier::AuthRequired);
    }

    #[test]
    fn kind_splits_api_from_pages() {
        assert_eq!(route_kind("/api/boards"), RouteKind::Api);
        assert_eq!(route_kind("/api"), RouteKind::Api);
        assert_eq!(route_kind("/apis"), RouteKind::Page);
        assert_eq!(route_kind("/tickets"), RouteKind::Page);
        assert_eq!(route_kind("/"), RouteKind::Page);
    }

    #[test]
    fn landing_routes_by_role() {
        assert_eq!(landing_route(Role::Admin), "/admin");
        assert_eq!(landing_route(Role::User), "/tickets");
        assert_eq!(landing_route(Role::Agent), "/tickets");
    }
}
