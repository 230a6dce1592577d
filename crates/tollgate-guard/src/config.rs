//! Guard configuration: the route map the decision table needs.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which paths anyone may visit, and where redirects go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Views reachable without a session. Matched exactly, after the
    /// query string and fragment are stripped.
    pub public_paths: Vec<String>,

    /// Where anonymous and expired users are sent.
    pub login_path: String,

    /// Where trusted users are sent when they open a public view.
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            public_paths: vec!["/login".into(), "/register".into()],
            login_path: "/login".into(),
            home_path: "/".into(),
        }
    }
}

impl GuardConfig {
    /// Fix any settings that would make redirects loop.
    ///
    /// Called automatically by [`NavigationGuard::new`](crate::NavigationGuard::new).
    /// Rules:
    /// - `login_path` and `home_path` must differ; if they don't, both
    ///   fall back to the defaults.
    /// - `login_path` is always public (anonymous users are sent there).
    /// - `home_path` is never public (trusted users are sent there).
    pub fn validated(mut self) -> Self {
        if self.login_path == self.home_path {
            let defaults = Self::default();
            warn!(
                path = %self.login_path,
                "login_path and home_path are the same, using defaults"
            );
            self.login_path = defaults.login_path;
            self.home_path = defaults.home_path;
        }

        if !self.public_paths.contains(&self.login_path) {
            warn!(path = %self.login_path, "login_path was not public, adding it");
            self.public_paths.push(self.login_path.clone());
        }

        if self.public_paths.contains(&self.home_path) {
            warn!(path = %self.home_path, "home_path was public, removing it");
            let home = self.home_path.clone();
            self.public_paths.retain(|p| *p != home);
        }

        self
    }

    /// Whether `path` needs no session.
    pub fn is_public(&self, path: &str) -> bool {
        let path = strip_suffixes(path);
        self.public_paths.iter().any(|p| p == path)
    }
}

/// `/login?next=/x#top` → `/login`.
fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
