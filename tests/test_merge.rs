use std::collections::BTreeMap;

use tx_risk::client::Prediction;
use tx_risk::ingest;
use tx_risk::merge::{FlattenError, MergeError, merge, probability_columns};
use tx_risk::table::Table;

// ── Helpers ──────────────────────────────────────────────────────────

fn upload() -> Table {
    let raw = b"customer_id,tr_datetime,mcc_code,tr_type,amount\n\
                1,0 10:23:26,5411,1,100\n\
                2,5 23:59:59,5812,2,-50\n\
                3,12 00:15:00,6011,1,0\n";
    ingest::normalize(raw).unwrap()
}

fn prediction(risk: &str, complexity: &str) -> Prediction {
    Prediction {
        risk_level: risk.to_string(),
        verification_complexity: complexity.to_string(),
        risk_proba: None,
    }
}

fn prediction_with_proba(risk: &str, probs: &[(&str, f64)]) -> Prediction {
    let risk_proba: BTreeMap<String, f64> = probs
        .iter()
        .map(|(label, p)| (label.to_string(), *p))
        .collect();
    Prediction {
        risk_level: risk.to_string(),
        verification_complexity: "simple".to_string(),
        risk_proba: Some(risk_proba),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn test_merge_appends_prediction_columns() {
    let table = upload();
    let predictions = vec![
        prediction("low", "simple"),
        prediction("high", "hard"),
        prediction("medium", "medium"),
    ];
    let scored = merge(&table, &predictions).unwrap();

    assert_eq!(scored.rows.len(), 3);
    assert_eq!(
        scored.columns,
        vec![
            "customer_id",
            "tr_datetime",
            "mcc_code",
            "tr_type",
            "amount",
            "risk_level",
            "verification_complexity"
        ]
    );
    let risk_idx = scored.column_index("risk_level").unwrap();
    assert_eq!(scored.rows[1][risk_idx], "high");
    // Original cells untouched.
    assert_eq!(scored.rows[1][0], "2");
}

#[test]
fn test_shape_mismatch_is_fatal() {
    let table = upload();
    let predictions = vec![prediction("low", "simple"), prediction("high", "hard")];
    let err = merge(&table, &predictions).unwrap_err();
    match err {
        MergeError::ShapeMismatch { submitted, returned } => {
            assert_eq!(submitted, 3);
            assert_eq!(returned, 2);
        }
    }
}

#[test]
fn test_probability_columns_flattened_sorted() {
    let table = upload();
    let predictions = vec![
        prediction_with_proba("low", &[("low", 0.8), ("medium", 0.15), ("high", 0.05)]),
        prediction_with_proba("high", &[("low", 0.1), ("high", 0.9)]),
        prediction("medium", "medium"),
    ];
    let scored = merge(&table, &predictions).unwrap();

    // Union of labels across the batch, sorted, one column each.
    assert!(scored.has_column("proba_high"));
    assert!(scored.has_column("proba_low"));
    assert!(scored.has_column("proba_medium"));
    let high_idx = scored.column_index("proba_high").unwrap();
    let medium_idx = scored.column_index("proba_medium").unwrap();
    assert_eq!(scored.rows[0][high_idx], "0.05");
    assert_eq!(scored.rows[1][high_idx], "0.9");
    // Rows lacking a label get an empty cell.
    assert_eq!(scored.rows[1][medium_idx], "");
    assert_eq!(scored.rows[2][high_idx], "");
}

#[test]
fn test_no_probabilities_no_extra_columns() {
    let table = upload();
    let predictions = vec![
        prediction("low", "simple"),
        prediction("low", "simple"),
        prediction("low", "simple"),
    ];
    let scored = merge(&table, &predictions).unwrap();
    assert_eq!(scored.columns.len(), 7);
    assert!(!scored.columns.iter().any(|c| c.starts_with("proba_")));
}

#[test]
fn test_flatten_collision_degrades_gracefully() {
    // An upload that already carries a proba_low column: flattening fails
    // and the merge silently drops all probability columns.
    let raw = b"customer_id,tr_datetime,mcc_code,tr_type,amount,proba_low\n\
                1,0 10:23:26,5411,1,100,0.99\n";
    let table = ingest::normalize(raw).unwrap();
    let predictions = vec![prediction_with_proba("low", &[("low", 0.5), ("high", 0.5)])];

    let err = probability_columns(&table, &predictions).unwrap_err();
    match err {
        FlattenError::ColumnCollision { column } => assert_eq!(column, "proba_low"),
    }

    let scored = merge(&table, &predictions).unwrap();
    // The upload's own column is untouched and no proba_high was added.
    let idx = scored.column_index("proba_low").unwrap();
    assert_eq!(scored.rows[0][idx], "0.99");
    assert!(!scored.has_column("proba_high"));
}

#[test]
fn test_merge_overwrites_same_named_columns() {
    let raw = b"customer_id,tr_datetime,mcc_code,tr_type,amount,risk_level\n\
                1,0 10:23:26,5411,1,100,stale\n";
    let table = ingest::normalize(raw).unwrap();
    let predictions = vec![prediction("high", "hard")];
    let scored = merge(&table, &predictions).unwrap();

    // Assignment semantics: same-named column is overwritten, not duplicated.
    assert_eq!(scored.columns.len(), 7);
    let idx = scored.column_index("risk_level").unwrap();
    assert_eq!(scored.rows[0][idx], "high");
}

#[test]
fn test_export_round_trip() {
    let table = upload();
    let predictions = vec![
        prediction_with_proba("low", &[("low", 0.8), ("high", 0.2)]),
        prediction("high", "hard"),
        prediction("medium", "medium"),
    ];
    let scored = merge(&table, &predictions).unwrap();

    let bytes = scored.to_csv_bytes().unwrap();
    let reread = ingest::normalize(&bytes).unwrap();

    assert_eq!(reread.rows.len(), scored.rows.len());
    assert_eq!(reread.columns, scored.columns);
    let risk_idx = reread.column_index("risk_level").unwrap();
    let complexity_idx = reread.column_index("verification_complexity").unwrap();
    for (original, round_tripped) in scored.rows.iter().zip(&reread.rows) {
        assert_eq!(original[risk_idx], round_tripped[risk_idx]);
        assert_eq!(original[complexity_idx], round_tripped[complexity_idx]);
    }
}
