//! Page gate: decides, per request path, whether a visitor may proceed.

/// Outcome of [`gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Redirect to the given path.
    Redirect(&'static str),
}

pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const HOME_PATH: &str = "/";

fn is_auth_page(path: &str) -> bool {
    path == LOGIN_PATH || path == SIGNUP_PATH
}

/// Static assets: the last path segment carries a file extension.
fn is_asset(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|segment| segment.rsplit_once('.'))
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

fn is_public(path: &str) -> bool {
    is_auth_page(path)
        || path == "/api"
        || path.starts_with("/api/")
        || path == "/health"
        || is_asset(path)
}

/// Decide what happens to a request for `path`.
///
/// ```
/// use votelens_auth::{gate, GateDecision};
///
/// assert_eq!(gate("/dashboard", false), GateDecision::Redirect("/login"));
/// assert_eq!(gate("/login", true), GateDecision::Redirect("/"));
/// assert_eq!(gate("/api/sentiment", false), GateDecision::Allow);
/// ```
pub fn gate(path: &str, authenticated: bool) -> GateDecision {
    if is_auth_page(path) {
        return if authenticated {
            GateDecision::Redirect(HOME_PATH)
        } else {
            GateDecision::Allow
        };
    }
    if authenticated || is_public(path) {
        GateDecision::Allow
    } else {
        GateDecision::Redirect(LOGIN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_pass_without_session() {
        for path in [
            "/login",
            "/signup",
            "/api/auth/me",
            "/api/news",
            "/health",
            "/favicon.ico",
            "/assets/app.3f2a.js",
        ] {
            assert_eq!(gate(path, false), GateDecision::Allow, "{path}");
        }
    }

    #[test]
    fn private_pages_redirect_to_login() {
        for path in ["/", "/dashboard", "/reports/abc", "/apiary", "/.env"] {
            assert_eq!(gate(path, false), GateDecision::Redirect(LOGIN_PATH), "{path}");
        }
    }

    #[test]
    fn signed_in_users_skip_auth_pages() {
        assert_eq!(gate("/login", true), GateDecision::Redirect(HOME_PATH));
        assert_eq!(gate("/signup", true), GateDecision::Redirect(HOME_PATH));
        assert_eq!(gate("/dashboard", true), GateDecision::Allow);
    }
}
