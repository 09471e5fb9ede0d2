//! Optional API key authentication.
//!
//! When enabled, every request outside the public path prefixes must carry
//! an `X-API-Key` header whose trimmed value is one of the configured keys.

use std::collections::HashSet;

use crate::config::ApiKeyConfig;

pub const X_API_KEY: &str = "x-api-key";

/// Why a request failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Invalid,
}

impl AuthFailure {
    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "API key is required",
            AuthFailure::Invalid => "Invalid API key",
        }
    }

    /// Label used for logs and metrics.
    pub fn reason(self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing_key",
            AuthFailure::Invalid => "invalid_key",
        }
    }
}

/// Accepted keys, parsed once from a comma-separated value.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashSet<String>,
}

impl KeySet {
    pub fn parse(raw: &str) -> Self {
        Self {
            keys: raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.keys.contains(candidate.trim())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Path prefixes exempt from authentication.
#[derive(Debug, Clone, Default)]
pub struct PublicPathSet {
    prefixes: Vec<String>,
}

impl PublicPathSet {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// The API key gate. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    enabled: bool,
    valid_keys: KeySet,
    public_paths: PublicPathSet,
}

impl Authenticator {
    pub fn new(enabled: bool, valid_keys: KeySet, public_paths: PublicPathSet) -> Self {
        Self {
            enabled,
            valid_keys,
            public_paths,
        }
    }

    pub fn from_config(config: &ApiKeyConfig) -> Self {
        let authenticator = Self::new(
            config.enabled,
            KeySet::parse(&config.keys),
            PublicPathSet::new(config.public_paths.iter().cloned()),
        );

        if authenticator.enabled {
            tracing::info!(
                valid_keys = authenticator.valid_keys.len(),
                "API key authentication enabled"
            );
        } else {
            tracing::info!("API key authentication disabled");
        }
        authenticator
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide whether a request to `path` carrying `api_key` may proceed.
    pub fn authenticate(&self, path: &str, api_key: Option<&str>) -> Result<(), AuthFailure> {
        if !self.enabled || self.public_paths.matches(path) {
            return Ok(());
        }

        let key = match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AuthFailure::Missing),
        };

        if self.valid_keys.contains(key) {
            tracing::debug!(path = %path, "Valid API key");
            Ok(())
        } else {
            Err(AuthFailure::Invalid)
        }
    }
}
