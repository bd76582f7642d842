use std::time::Duration;

use tx_risk::client::ScoringClient;
use tx_risk::config::ScoringConfig;
use tx_risk::features::build_features;
use tx_risk::ingest;
use tx_risk::merge::merge;

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore] // Requires a scoring API running at TX_RISK_API_URL (default localhost:8000)
async fn test_live_health_and_predict() {
    let config = ScoringConfig::from_env();
    let client = ScoringClient::new(
        &config.api_base_url,
        Duration::from_secs(30),
        config.health_timeout,
    )
    .unwrap();

    // 1. Health gate
    client.health().await.unwrap();
    println!("  API at {} is up", config.api_base_url);

    // 2. Normalize a small upload and derive features
    let raw = b"customer_id,tr_datetime,mcc_code,tr_type,amount\n\
                1,0 10:23:26,5411,1,100\n\
                2,5 23:59:59,5812,2,-50\n\
                3,12 00:15:00,6011,1,0\n";
    let table = ingest::normalize(raw).unwrap();
    let rows = build_features(&table, &config);
    assert_eq!(rows.len(), 3);

    // 3. Score and merge
    let predictions = client.predict_batch(&rows).await.unwrap();
    assert_eq!(predictions.len(), 3, "API must return one prediction per row");

    let scored = merge(&table, &predictions).unwrap();
    assert!(scored.has_column("risk_level"));
    assert!(scored.has_column("verification_complexity"));
    println!("  scored {} rows", scored.rows.len());
}
