use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureRow;

/// How much of a server error body is surfaced in messages.
const BODY_PREVIEW: usize = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("scoring API is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("scoring API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("scoring API response was not in the expected shape: {reason}\n{body}")]
    Decode { reason: String, body: String },

    #[error("scoring API call failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One prediction for one submitted feature row, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub risk_level: String,
    pub verification_complexity: String,
    /// Per-class probabilities, when the model exposes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_proba: Option<BTreeMap<String, f64>>,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    rows: &'a [FeatureRow],
}

#[derive(Deserialize)]
struct PredictResponse {
    result: Vec<Prediction>,
}

/// Thin client for the two scoring API endpoints. One round trip per call,
/// no retries, no caching.
pub struct ScoringClient {
    http: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl ScoringClient {
    /// `timeout` applies to predict calls; the health probe uses its own,
    /// shorter `health_timeout`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        health_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("tx-risk/0.1")
            .build()?;
        Ok(ScoringClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout,
        })
    }

    /// Probe `GET /health`. Anything but HTTP 200 counts as unavailable.
    pub async fn health(&self) -> Result<(), ApiError> {
        let url = format!("{}/health", self.base_url);
        let sent = self.http.get(&url).timeout(self.health_timeout).send().await;
        match sent {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => Ok(()),
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::Unavailable {
                    reason: format!("HTTP {status}: {}", truncate(&body, 200)),
                })
            }
            Err(e) => Err(ApiError::Unavailable { reason: e.to_string() }),
        }
    }

    /// Submit feature rows to `POST /predict_batch` and parse the returned
    /// predictions. The caller is responsible for checking that the count
    /// matches what was submitted.
    pub async fn predict_batch(&self, rows: &[FeatureRow]) -> Result<Vec<Prediction>, ApiError> {
        let url = format!("{}/predict_batch", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&PredictRequest { rows })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: truncate(&body, BODY_PREVIEW).to_string(),
            });
        }

        let parsed: PredictResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                reason: e.to_string(),
                body: truncate(&body, BODY_PREVIEW).to_string(),
            })?;
        Ok(parsed.result)
    }
}

/// Cut to at most `max` characters, respecting char boundaries.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_parses_with_and_without_proba() {
        let with: Prediction = serde_json::from_str(
            r#"{"risk_level": "high", "verification_complexity": "hard",
                "risk_proba": {"low": 0.1, "medium": 0.2, "high": 0.7}}"#,
        )
        .unwrap();
        assert_eq!(with.risk_level, "high");
        assert_eq!(with.risk_proba.unwrap().get("high"), Some(&0.7));

        let without: Prediction = serde_json::from_str(
            r#"{"risk_level": "low", "verification_complexity": "simple"}"#,
        )
        .unwrap();
        assert!(without.risk_proba.is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let rows = vec![FeatureRow {
            amount: 100.0,
            mcc_code: 5411,
            tr_type: 1,
            flow: crate::features::Flow::Income,
            hour: 10,
        }];
        let body = serde_json::to_value(PredictRequest { rows: &rows }).unwrap();
        assert_eq!(body["rows"][0]["flow"], "income");
        assert_eq!(body["rows"][0]["hour"], 10);
        assert_eq!(body["rows"][0]["amount"], 100.0);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("доход", 3), "дох");
    }
}
