//! Startup configuration for reaching the issuer.

use serde::{Deserialize, Serialize};

/// Environment variable holding the issuer's base URL.
pub const BASE_URL_ENV: &str = "TOLLGATE_API_BASE_URL";

/// Used when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Errors from building an [`IssuerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("issuer base URL is empty")]
    EmptyBaseUrl,

    #[error("issuer base URL must start with http:// or https://, got {0:?}")]
    UnsupportedScheme(String),
}

/// Where the issuer lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Scheme, host and optional path prefix, without a trailing slash.
    pub base_url: String,

    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl IssuerConfig {
    /// Builds a config for `base_url`, normalised.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Reads [`BASE_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with the variable lookup
    /// supplied by the caller.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(BASE_URL_ENV) {
            Some(url) => Self::new(&url),
            None => Ok(Self::default()),
        }
    }

    /// `{base_url}{path}`; `path` starts with `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::UnsupportedScheme(url.to_string()));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_localhost() {
        let config = IssuerConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.endpoint("/users/login"), "http://localhost:8080/users/login");
    }

    #[test]
    fn test_new_trims_trailing_slashes() {
        let config = IssuerConfig::new("https://api.example.com/v1//").unwrap();
        assert_eq!(config.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(IssuerConfig::new("  "), Err(ConfigError::EmptyBaseUrl));
        assert_eq!(IssuerConfig::new("/"), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn test_new_rejects_missing_scheme() {
        assert_eq!(
            IssuerConfig::new("localhost:8080"),
            Err(ConfigError::UnsupportedScheme("localhost:8080".into()))
        );
    }

    #[test]
    fn test_from_lookup_unset_uses_default() {
        let config = IssuerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, IssuerConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_variable() {
        let config = IssuerConfig::from_lookup(|key| {
            (key == BASE_URL_ENV).then(|| "http://10.0.0.5:9000/".to_string())
        })
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn test_from_lookup_invalid_is_error() {
        let result = IssuerConfig::from_lookup(|_| Some("ftp://files".into()));
        assert!(matches!(result, Err(ConfigError::UnsupportedScheme(_))));
    }
}
