//! Walks one user through register → grace → login → logout, then lets a
//! second grace period run out.
//!
//! Talks to a real backend when `TOLLGATE_API_BASE_URL` is set, otherwise
//! to an in-process issuer. `RUST_LOG=debug` shows every guard decision.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tollgate::BASE_URL_ENV;
use tollgate::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// In-process issuer
// ---------------------------------------------------------------------------

/// Knows one password and signs nothing: the signature segment is a
/// placeholder, since clients never verify it anyway.
struct DemoIssuer;

impl Issuer for DemoIssuer {
    async fn register(&self, payload: &RegisterPayload) -> Result<(), IssuerError> {
        if payload.username == "admin" {
            return Err(IssuerError::Rejected {
                status: 409,
                message: Some("Username already exists".into()),
            });
        }
        Ok(())
    }

    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, IssuerError> {
        if payload.password != "correct horse battery staple" {
            return Err(IssuerError::Rejected {
                status: 401,
                message: Some("Invalid credentials".into()),
            });
        }

        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| IssuerError::InvalidResponse(e.to_string()))?
            .as_secs()
            + 3600;
        let claims = serde_json::json!({ "sub": payload.username, "exp": exp, "role": "user" });
        let token = format!(
            "{}.{}.demo",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );

        Ok(LoginResponse {
            token: Some(token),
            message: Some("Login successful".into()),
        })
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

fn signup(username: &str) -> RegisterPayload {
    RegisterPayload {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        username: username.into(),
        password: "correct horse battery staple".into(),
    }
}

async fn go(session: &SessionHandle, to: &str, from: &str) -> Result<(), TollgateError> {
    let nav = session.navigate(to, from).await?;
    info!(from, to, result = %nav, "navigate");
    Ok(())
}

async fn walkthrough<I: Issuer>(issuer: I) -> Result<(), TollgateError> {
    let (session, mut forced) = SessionRuntime::builder()
        .session_config(SessionConfig {
            grace_period_secs: 3,
        })
        .spawn(issuer, MemoryRepository::new(), SystemClock);

    go(&session, "/dashboard", "/").await?;

    if let Err(err) = session.register(signup("admin")).await {
        info!(error = %err, "registration refused");
    }

    let registration = session.register(signup("ada")).await?;
    info!(username = %registration.username, "registered");
    go(&session, "/dashboard", "/register").await?;
    go(&session, "/login", "/dashboard").await?;

    if let Err(err) = session.login(LoginPayload::new("ada", "hunter2")).await {
        info!(error = %err, "login refused");
    }

    let credential = session
        .login(LoginPayload::new("ada", "correct horse battery staple"))
        .await?;
    info!(role = ?credential.role(), expires_at = credential.expires_at_millis(), "logged in");
    go(&session, "/login", "/dashboard").await?;

    let record = session.snapshot().await?;
    info!(username = ?record.username(), status = %record.status(), "session snapshot");

    session.logout().await?;
    go(&session, "/dashboard", "/").await?;

    session.register(signup("grace")).await?;
    info!("registered again, waiting for the grace period to run out");
    if let Some(ForcedNavigation { to }) =
        tokio::time::timeout(Duration::from_secs(10), forced.recv()).await.ok().flatten()
    {
        info!(to = %to, "forced navigation");
    }
    go(&session, "/dashboard", "/").await?;

    session.shutdown().await
}

#[tokio::main]
async fn main() -> Result<(), TollgateError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if std::env::var_os(BASE_URL_ENV).is_some() {
        let config = IssuerConfig::from_env()?;
        info!(base_url = %config.base_url, "using HTTP issuer");
        walkthrough(HttpIssuer::new(config)).await
    } else {
        info!("using in-process issuer");
        walkthrough(DemoIssuer).await
    }
}
