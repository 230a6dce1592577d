//! The effectful half of the guard.

use tollgate_session::{Clock, Issuer, SessionStore, TrustState};
use tollgate_storage::Repository;
use tracing::debug;

use crate::{Decision, GuardConfig, Navigation, decide};

/// Evaluates navigations against the session store.
///
/// Holds no session state of its own: every evaluation re-reads storage
/// through [`SessionStore::restore`], so a decision can never rest on a
/// stale classification.
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    config: GuardConfig,
}

impl NavigationGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.config.is_public(path)
    }

    /// Decides whether the navigation `from` → `to` may proceed.
    ///
    /// An expired or undecodable credential is discarded before the
    /// decision is returned, so evaluating again (or following the
    /// redirect) does not run into it a second time.
    pub fn evaluate<I, R, C>(
        &self,
        store: &mut SessionStore<I, R, C>,
        to: &str,
        from: &str,
    ) -> Navigation
    where
        I: Issuer,
        R: Repository,
        C: Clock,
    {
        self.evaluate_with_trust(store, to, from).1
    }

    /// [`evaluate`](Self::evaluate), also returning the trust state the
    /// decision was based on.
    pub fn evaluate_with_trust<I, R, C>(
        &self,
        store: &mut SessionStore<I, R, C>,
        to: &str,
        from: &str,
    ) -> (TrustState, Navigation)
    where
        I: Issuer,
        R: Repository,
        C: Clock,
    {
        let trust = store.restore();
        if trust == TrustState::Expired {
            store.discard_credential();
        }

        let is_public = self.is_public(to);
        let decision = decide(&trust, is_public);
        debug!(to, from, trust = %trust, is_public, ?decision, "navigation evaluated");

        let navigation = match decision {
            Decision::Allow => Navigation::Allow,
            Decision::RedirectToLogin => Navigation::Redirect(self.config.login_path.clone()),
            Decision::RedirectToHome => Navigation::Redirect(self.config.home_path.clone()),
        };
        (trust, navigation)
    }
}
