use serde::Deserialize;
use std::env;

/// One agent identity against the gateway. The primary identity signs
/// booking searches; a separate min-fare identity signs price-trend lookups.
/// Their token caches are never shared.
#[derive(Debug, Deserialize, Clone)]
pub struct AgentIdentity {
    pub acc_code: String,
    pub ag_code: String,
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub agent: AgentIdentity,
    pub min_fare_agent: AgentIdentity,
    #[serde(default = "default_airlines")]
    pub airlines: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Backoff before the single per-airline search retry.
    #[serde(default = "default_search_retry_backoff_ms")]
    pub search_retry_backoff_ms: u64,
    /// Coalescing window for status-only progress snapshots.
    #[serde(default = "default_snapshot_debounce_ms")]
    pub snapshot_debounce_ms: u64,
}

fn default_airlines() -> Vec<String> {
    ["VN", "VJ", "QH", "VU", "BL"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_search_retry_backoff_ms() -> u64 {
    1_000
}

fn default_snapshot_debounce_ms() -> u64 {
    300
}

impl GatewayConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `FARELINK__GATEWAY__BASE_URL=...`
            .add_source(config::Environment::with_prefix("FARELINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_omitted() {
        let json = r#"
            {
                "base_url": "https://gateway.example.com",
                "agent": { "acc_code": "ACC1", "ag_code": "AG1", "secret": "s1" },
                "min_fare_agent": { "acc_code": "ACC2", "ag_code": "AG2", "secret": "s2" }
            }
        "#;
        let cfg: GatewayConfig = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(cfg.airlines, vec!["VN", "VJ", "QH", "VU", "BL"]);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.search_retry_backoff_ms, 1_000);
        assert_eq!(cfg.snapshot_debounce_ms, 300);
    }

    #[test]
    fn test_tunables_are_overridable() {
        let json = r#"
            {
                "base_url": "https://gateway.example.com",
                "agent": { "acc_code": "ACC1", "ag_code": "AG1", "secret": "s1" },
                "min_fare_agent": { "acc_code": "ACC2", "ag_code": "AG2", "secret": "s2" },
                "search_retry_backoff_ms": 2000,
                "snapshot_debounce_ms": 150
            }
        "#;
        let cfg: GatewayConfig = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(cfg.search_retry_backoff_ms, 2_000);
        assert_eq!(cfg.snapshot_debounce_ms, 150);
    }
}
