//! Connection settings read from the environment.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_VAR: &str = "POSTS_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "POSTS_API_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "POSTS_API_USER_AGENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    /// Upper bound on one whole round trip.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source. Unparseable or empty
    /// values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(var = TIMEOUT_VAR, value = %raw, "invalid timeout, using default");
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            base_url: non_empty(BASE_URL_VAR).unwrap_or(defaults.base_url),
            timeout,
            user_agent: non_empty(USER_AGENT_VAR).unwrap_or(defaults.user_agent),
        }
    }
}

fn default_user_agent() -> String {
    format!("posts-core/{}", env!("CARGO_PKG_VERSION"))
}
