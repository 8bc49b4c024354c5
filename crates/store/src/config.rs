#![forbid(unsafe_code)]

use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Trimmed environment lookup; blank values count as unset.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    /// `FM_API_BASE` and `FM_HTTP_TIMEOUT_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base) = lookup("FM_API_BASE") {
            config.base_url = base;
        }
        if let Some(ms) = lookup("FM_HTTP_TIMEOUT_MS").and_then(|raw| raw.parse::<u64>().ok()) {
            config.timeout = Duration::from_millis(ms.clamp(100, 300_000));
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_and_clamps() {
        let config = ApiConfig::from_lookup(|name| match name {
            "FM_API_BASE" => Some("http://10.0.0.2:4000".to_string()),
            "FM_HTTP_TIMEOUT_MS" => Some("5".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://10.0.0.2:4000");
        assert_eq!(config.timeout, Duration::from_millis(100));
    }

    #[test]
    fn unparsable_timeout_keeps_default() {
        let config = ApiConfig::from_lookup(|name| {
            (name == "FM_HTTP_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert_eq!(config, ApiConfig::default());
    }
}
