use std::env;
use std::time::Duration;

use tracing::warn;

/// What to do with a building whose `type` is not one of the known kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownDiscriminant {
    /// Log a warning and leave the entry out of the surrounding collection.
    Skip,
    /// Fail the whole hydration with a typed error.
    Reject,
}

/// Knobs for the response hydrator
#[derive(Debug, Clone)]
pub struct HydrationOptions {
    pub unknown_discriminant: UnknownDiscriminant,
    /// Maximum number of nested entities followed from the top-level node.
    pub max_depth: usize,
}

impl Default for HydrationOptions {
    fn default() -> Self {
        Self {
            unknown_discriminant: UnknownDiscriminant::Skip,
            max_depth: 64,
        }
    }
}

/// Client configuration shared by the facades
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash (e.g. "http://some.host/api")
    pub base_url: String,
    /// Timeout for a single request
    pub timeout: Duration,
    pub user_agent: String,
    pub hydration: HydrationOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("buildings-client/", env!("CARGO_PKG_VERSION")).to_string(),
            hydration: HydrationOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `BUILDINGS_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("BUILDINGS_API_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("BUILDINGS_API_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => warn!("Ignoring invalid BUILDINGS_API_TIMEOUT_SECS: {}", raw),
            }
        }

        if let Some(raw) = lookup("BUILDINGS_STRICT_TYPES") {
            match raw.as_str() {
                "1" | "true" | "yes" => {
                    config.hydration.unknown_discriminant = UnknownDiscriminant::Reject
                }
                "0" | "false" | "no" => {
                    config.hydration.unknown_discriminant = UnknownDiscriminant::Skip
                }
                _ => warn!("Ignoring invalid BUILDINGS_STRICT_TYPES: {}", raw),
            }
        }

        if let Some(raw) = lookup("BUILDINGS_MAX_DEPTH") {
            match raw.parse::<usize>() {
                Ok(depth) if depth > 0 => config.hydration.max_depth = depth,
                _ => warn!("Ignoring invalid BUILDINGS_MAX_DEPTH: {}", raw),
            }
        }

        config
    }
}
