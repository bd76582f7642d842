use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;

use crate::features::Flow;

/// Default scoring API address when neither the env var nor a flag is given.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Env var that overrides the scoring API address.
pub const API_URL_ENV: &str = "TX_RISK_API_URL";

/// Configuration shared by the normalizer, feature builder and merger.
///
/// Everything the pipeline depends on is carried here explicitly; there is no
/// process-wide state. `ScoringConfig::default()` documents the defaults.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Base URL of the scoring API, without a trailing slash.
    pub api_base_url: String,
    /// Date that the day offsets in `tr_datetime` count from.
    pub anchor_date: NaiveDate,
    /// Column names an upload must contain, exact after whitespace trim.
    pub required_columns: Vec<String>,
    /// Lowercased flow synonyms mapped onto their canonical value. Extend
    /// this map to support additional locales.
    pub flow_synonyms: HashMap<String, Flow>,
    /// Timeout for the health probe. Predict calls use the per-run timeout.
    pub health_timeout: Duration,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut flow_synonyms = HashMap::new();
        flow_synonyms.insert("расход".to_string(), Flow::Spend);
        flow_synonyms.insert("доход".to_string(), Flow::Income);

        ScoringConfig {
            api_base_url: DEFAULT_API_URL.to_string(),
            anchor_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            required_columns: ["customer_id", "tr_datetime", "mcc_code", "tr_type", "amount"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            flow_synonyms,
            health_timeout: Duration::from_millis(2500),
        }
    }
}

impl ScoringConfig {
    /// Defaults, with the API address taken from `TX_RISK_API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = ScoringConfig::default();
        config.api_base_url = resolve_api_url(std::env::var(API_URL_ENV).ok());
        config
    }
}

/// Pick the API address: a non-empty env value beats the default.
fn resolve_api_url(env_value: Option<String>) -> String {
    match env_value {
        Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_API_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.anchor_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.required_columns.len(), 5);
        assert_eq!(config.flow_synonyms.get("расход"), Some(&Flow::Spend));
        assert_eq!(config.flow_synonyms.get("доход"), Some(&Flow::Income));
    }

    #[test]
    fn test_resolve_api_url() {
        assert_eq!(resolve_api_url(None), DEFAULT_API_URL);
        assert_eq!(resolve_api_url(Some("".to_string())), DEFAULT_API_URL);
        assert_eq!(
            resolve_api_url(Some("http://scoring.internal:9000/".to_string())),
            "http://scoring.internal:9000"
        );
    }
}
