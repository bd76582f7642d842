use std::collections::BTreeSet;

use thiserror::Error;

use crate::client::Prediction;
use crate::table::Table;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("prediction count does not match submitted rows: sent {submitted}, got {returned}")]
    ShapeMismatch { submitted: usize, returned: usize },
}

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("probability column `{column}` collides with an existing column")]
    ColumnCollision { column: String },
}

/// Append prediction columns to the uploaded rows.
///
/// Without a correlation key the only safe alignment is positional, so a
/// count mismatch is fatal. `risk_level` and `verification_complexity` are
/// always set (overwriting same-named upload columns, assignment semantics);
/// probability columns are best-effort and dropped wholesale if flattening
/// fails.
pub fn merge(table: &Table, predictions: &[Prediction]) -> Result<Table, MergeError> {
    if predictions.len() != table.rows.len() {
        return Err(MergeError::ShapeMismatch {
            submitted: table.rows.len(),
            returned: predictions.len(),
        });
    }

    let mut out = table.clone();
    out.set_column(
        "risk_level",
        predictions.iter().map(|p| p.risk_level.clone()).collect(),
    );
    out.set_column(
        "verification_complexity",
        predictions
            .iter()
            .map(|p| p.verification_complexity.clone())
            .collect(),
    );

    match probability_columns(&out, predictions) {
        Ok(columns) => {
            for (name, values) in columns {
                out.set_column(&name, values);
            }
        }
        // Probabilities never block the merge; the export just omits them.
        Err(FlattenError::ColumnCollision { .. }) => {}
    }

    Ok(out)
}

/// Flatten per-row probability maps into `proba_<label>` columns.
///
/// The union of labels seen anywhere in the batch becomes one column each,
/// sorted for a stable export order; rows missing a label get an empty cell.
/// A generated name that collides with an existing column fails the whole
/// flattening.
pub fn probability_columns(
    table: &Table,
    predictions: &[Prediction],
) -> Result<Vec<(String, Vec<String>)>, FlattenError> {
    let labels: BTreeSet<&str> = predictions
        .iter()
        .filter_map(|p| p.risk_proba.as_ref())
        .flat_map(|probs| probs.keys().map(String::as_str))
        .collect();

    let mut columns = Vec::new();
    for label in labels {
        let name = format!("proba_{label}");
        if table.has_column(&name) {
            return Err(FlattenError::ColumnCollision { column: name });
        }
        let values = predictions
            .iter()
            .map(|p| {
                p.risk_proba
                    .as_ref()
                    .and_then(|probs| probs.get(label))
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        columns.push((name, values));
    }
    Ok(columns)
}
