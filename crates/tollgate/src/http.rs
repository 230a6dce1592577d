//! [`Issuer`] over HTTP.
//!
//! Talks JSON to a backend exposing:
//!
//! ```text
//! POST {base}/users/register   2xx: any body       error: {"message": "..."}
//! POST {base}/users/login      2xx: {"token": ...} error: {"message": "..."}
//! ```

use std::time::Duration;

use serde::Deserialize;
use tollgate_session::{Issuer, IssuerError, LoginPayload, LoginResponse, RegisterPayload};
use tracing::debug;

use crate::IssuerConfig;

const REGISTER_PATH: &str = "/users/register";
const LOGIN_PATH: &str = "/users/login";

/// Error body the backend sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// An [`Issuer`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpIssuer {
    config: IssuerConfig,
    client: reqwest::Client,
}

impl HttpIssuer {
    pub fn new(config: IssuerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(config, client)
    }

    /// Uses a caller-built client (proxies, custom roots, ...).
    pub fn with_client(config: IssuerConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// POSTs `body` as JSON and returns the raw body of a 2xx response.
    async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<Vec<u8>, IssuerError> {
        let url = self.config.endpoint(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| IssuerError::Unreachable(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IssuerError::Unreachable(e.to_string()))?;
        debug!(%url, status = status.as_u16(), "issuer responded");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.message);
            return Err(IssuerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }
}

impl Issuer for HttpIssuer {
    async fn register(&self, payload: &RegisterPayload) -> Result<(), IssuerError> {
        self.post(REGISTER_PATH, payload).await.map(drop)
    }

    async fn login(&self, payload: &LoginPayload) -> Result<LoginResponse, IssuerError> {
        let body = self.post(LOGIN_PATH, payload).await?;
        serde_json::from_slice(&body).map_err(|e| IssuerError::InvalidResponse(e.to_string()))
    }
}
