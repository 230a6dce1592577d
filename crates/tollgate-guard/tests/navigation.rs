//! Integration tests for the navigation guard against a real session store.
//!
//! Each test seeds a `MemoryRepository` the way a previous page load
//! would have left it, then asks the guard about one navigation.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tollgate_guard::{GuardConfig, Navigation, NavigationGuard};
use tollgate_session::{
    Issuer, IssuerError, LoginPayload, LoginResponse, ManualClock, RegisterPayload,
    SessionConfig, SessionStore,
};
use tollgate_storage::{MemoryRepository, Repository};

// =========================================================================
// Helpers
// =========================================================================

const NOW: i64 = 1_700_000_000_000;

/// Accepts registrations; logins are not exercised here.
struct AcceptingIssuer;

impl Issuer for AcceptingIssuer {
    async fn register(&self, _: &RegisterPayload) -> Result<(), IssuerError> {
        Ok(())
    }

    async fn login(&self, _: &LoginPayload) -> Result<LoginResponse, IssuerError> {
        Err(IssuerError::Unreachable("not used".into()))
    }
}

type Store = SessionStore<AcceptingIssuer, MemoryRepository, ManualClock>;

struct Fixture {
    guard: NavigationGuard,
    store: Store,
    repo: MemoryRepository,
    clock: ManualClock,
}

fn fixture() -> Fixture {
    let repo = MemoryRepository::new();
    let clock = ManualClock::new(NOW);
    Fixture {
        guard: NavigationGuard::new(GuardConfig::default()),
        store: SessionStore::new(
            AcceptingIssuer,
            repo.clone(),
            clock.clone(),
            SessionConfig::default(),
        ),
        repo,
        clock,
    }
}

fn token_expiring_at(exp_secs: i64) -> String {
    let claims = format!(r#"{{"sub":"alice","exp":{exp_secs},"role":"user"}}"#);
    format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(claims))
}

fn seed_login(repo: &MemoryRepository, exp_secs: i64) {
    repo.set("username", "alice");
    repo.set("token", &token_expiring_at(exp_secs));
}

fn redirect(path: &str) -> Navigation {
    Navigation::Redirect(path.into())
}

// =========================================================================
// Anonymous
// =========================================================================

#[test]
fn test_anonymous_to_protected_redirects_to_login() {
    let mut f = fixture();
    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), redirect("/login"));
}

#[test]
fn test_anonymous_to_public_is_allowed() {
    let mut f = fixture();
    assert_eq!(f.guard.evaluate(&mut f.store, "/login", "/"), Navigation::Allow);
    assert_eq!(f.guard.evaluate(&mut f.store, "/register", "/login"), Navigation::Allow);
}

// =========================================================================
// Authenticated
// =========================================================================

#[test]
fn test_authenticated_to_login_redirects_home() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 + 3600);

    assert_eq!(f.guard.evaluate(&mut f.store, "/login", "/"), redirect("/"));
}

#[test]
fn test_authenticated_to_protected_is_allowed() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 + 3600);

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), Navigation::Allow);
    assert_eq!(f.store.role(), Some("user"));
}

#[test]
fn test_token_expiring_exactly_now_is_allowed() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000);

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), Navigation::Allow);
}

// =========================================================================
// Expired
// =========================================================================

#[test]
fn test_expired_to_protected_redirects_and_clears_token() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 - 1);

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), redirect("/login"));
    assert_eq!(f.repo.get("token"), None);
    assert_eq!(f.repo.get("username"), None);
}

#[test]
fn test_expired_redirect_is_idempotent() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 - 1);

    let first = f.guard.evaluate(&mut f.store, "/dashboard", "/");
    let second = f.guard.evaluate(&mut f.store, "/dashboard", "/");

    assert_eq!(first, second);
    assert!(f.repo.is_empty());
}

#[test]
fn test_expired_to_public_is_allowed_after_clearing() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 - 1);

    assert_eq!(f.guard.evaluate(&mut f.store, "/login", "/dashboard"), Navigation::Allow);
    assert_eq!(f.repo.get("token"), None);
}

#[test]
fn test_token_expires_between_navigations() {
    let mut f = fixture();
    seed_login(&f.repo, NOW / 1000 + 60);

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), Navigation::Allow);
    f.clock.advance(Duration::from_secs(61));
    assert_eq!(f.guard.evaluate(&mut f.store, "/settings", "/dashboard"), redirect("/login"));
}

#[test]
fn test_undecodable_token_redirects_and_clears() {
    let mut f = fixture();
    f.repo.set("token", "not.a.token");
    f.repo.set("username", "alice");

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), redirect("/login"));
    assert_eq!(f.repo.get("token"), None);
}

#[test]
fn test_undecodable_token_outranks_grace_flag() {
    let mut f = fixture();
    f.repo.set("token", "garbage");
    f.repo.set("justRegistered", "true");
    f.repo.set("registeredAt", &NOW.to_string());

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), redirect("/login"));
    assert!(f.repo.is_empty());
}

// =========================================================================
// Grace
// =========================================================================

#[tokio::test]
async fn test_register_then_protected_is_allowed() {
    let mut f = fixture();
    f.store
        .register(RegisterPayload {
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            username: "alice".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/register"), Navigation::Allow);
    assert_eq!(f.guard.evaluate(&mut f.store, "/login", "/dashboard"), redirect("/"));
}

#[test]
fn test_grace_lapsed_redirects_to_login() {
    let mut f = fixture();
    f.repo.set("justRegistered", "true");
    f.repo.set("registeredUser", "alice");
    f.repo.set("registeredAt", &NOW.to_string());

    f.clock.advance(Duration::from_secs(30 * 60));

    assert_eq!(f.guard.evaluate(&mut f.store, "/dashboard", "/"), redirect("/login"));
    assert!(f.repo.is_empty());
}

// =========================================================================
// Custom configuration
// =========================================================================

#[test]
fn test_custom_paths_are_used_for_redirects() {
    let mut f = fixture();
    let guard = NavigationGuard::new(GuardConfig {
        public_paths: vec!["/welcome".into()],
        login_path: "/signin".into(),
        home_path: "/app".into(),
    });

    assert_eq!(guard.evaluate(&mut f.store, "/app", "/"), redirect("/signin"));
    assert_eq!(guard.evaluate(&mut f.store, "/signin", "/app"), Navigation::Allow);

    seed_login(&f.repo, NOW / 1000 + 3600);
    assert_eq!(guard.evaluate(&mut f.store, "/welcome", "/app"), redirect("/app"));
}
