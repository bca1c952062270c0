//! Backend configuration.
//!
//! A [`RestConfig`] is built once at startup and handed to the table reader.
//! Reads from the environment happen only in [`RestConfig::from_env`]; the
//! rest of the crate never touches process-wide state.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Project URL, e.g. `https://abc.supabase.co`.
pub const URL_VAR: &str = "SUPABASE_URL";
/// Service credential sent as both `apikey` and bearer token.
pub const KEY_VAR: &str = "SUPABASE_SERVICE_ROLE";
/// Optional reserved-key collision policy (`override` or `reject`).
pub const RESERVED_POLICY_VAR: &str = "PGREST_RESERVED_FILTERS";

/// Path segment under which the backend serves tables.
pub const REST_PATH: &str = "rest/v1";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do when a filter column is named like a reserved query parameter
/// (`select`, `limit`, `offset`, `order`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReservedKeyPolicy {
    /// The filter replaces the reserved parameter.
    #[default]
    Override,
    /// The read fails with [`ReadError::ReservedFilterKey`](crate::ReadError::ReservedFilterKey).
    Reject,
}

impl FromStr for ReservedKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" => Ok(Self::Override),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'override' or 'reject', got '{other}'")),
        }
    }
}

impl fmt::Display for ReservedKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => f.write_str("override"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Connection settings for a PostgREST-compatible backend.
#[derive(Clone)]
pub struct RestConfig {
    base_url: String,
    service_key: String,
    /// Request-level timeout for each read.
    pub timeout: Duration,
    /// Collision policy for filters named like reserved parameters.
    pub reserved_policy: ReservedKeyPolicy,
}

impl RestConfig {
    /// Create a config for `base_url` (trailing slashes are dropped).
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            timeout: DEFAULT_TIMEOUT,
            reserved_policy: ReservedKeyPolicy::default(),
        }
    }

    /// Load from `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE` and the optional
    /// `PGREST_RESERVED_FILTERS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] if a required variable is unset or
    /// empty, and [`ConfigError::InvalidVar`] for an unknown policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(var))
        };

        let mut config = Self::new(required(URL_VAR)?, required(KEY_VAR)?);

        if let Some(raw) = lookup(RESERVED_POLICY_VAR).filter(|v| !v.trim().is_empty()) {
            config.reserved_policy = raw.parse().map_err(|reason| ConfigError::InvalidVar {
                var: RESERVED_POLICY_VAR,
                value: raw.clone(),
                reason,
            })?;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_reserved_policy(mut self, policy: ReservedKeyPolicy) -> Self {
        self.reserved_policy = policy;
        self
    }

    /// The project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential sent with every request.
    pub fn service_key(&self) -> &str {
        &self.service_key
    }

    /// `<base_url>/rest/v1`
    pub fn rest_base(&self) -> String {
        format!("{}/{REST_PATH}", self.base_url)
    }
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("reserved_policy", &self.reserved_policy)
            .finish()
    }
}
