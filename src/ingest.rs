use thiserror::Error;

use crate::table::Table;

/// Delimiters the sniffer considers, most common first.
const SNIFF_DELIMITERS: &[u8] = b",;\t|";

/// How many non-blank lines the sniffer samples.
const SNIFF_SAMPLE: usize = 16;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("the file is empty — expected a header row and data rows")]
    Empty,

    #[error("could not parse the CSV with any known delimiter: {0}")]
    Unreadable(#[from] csv::Error),
}

/// Required columns that an upload is missing.
#[derive(Debug, Error)]
#[error(
    "the uploaded CSV is missing required columns: {}. \
     Semicolon-delimited exports are the usual cause — check the file's delimiter.",
    .0.join(", ")
)]
pub struct MissingColumnsError(pub Vec<String>);

/// Read raw uploaded bytes into a [`Table`].
///
/// Transaction exports vary between comma and semicolon conventions, and a
/// naive single-attempt parse silently produces a one-column table. Three
/// steps guard against that: a delimiter sniff across common candidates, a
/// forced-semicolon fallback when the sniff finds nothing, and a re-parse
/// when the result collapsed to a single column whose header still carries a
/// semicolon. Column names are whitespace-trimmed after parsing.
pub fn normalize(raw: &[u8]) -> Result<Table, ParseError> {
    let mut table = match sniff_delimiter(raw).and_then(|d| parse_with(raw, d).ok()) {
        Some(table) => table,
        None => parse_with(raw, b';')?,
    };

    if table.columns.len() == 1 && table.columns[0].contains(';') {
        table = parse_with(raw, b';')?;
    }

    if table.columns.iter().all(|c| c.is_empty()) {
        return Err(ParseError::Empty);
    }
    Ok(table)
}

/// Fail with the full list of absent names if any required column is missing.
pub fn require_columns(table: &Table, required: &[String]) -> Result<(), MissingColumnsError> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingColumnsError(missing))
    }
}

/// Pick the candidate that splits every sampled line into the same number of
/// fields, preferring the one that yields the most. None if no candidate
/// produces at least two consistent fields.
fn sniff_delimiter(raw: &[u8]) -> Option<u8> {
    let text = String::from_utf8_lossy(raw);
    let sample: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_SAMPLE)
        .collect();
    if sample.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for &delim in SNIFF_DELIMITERS {
        let mut counts = sample.iter().map(|line| line.split(delim as char).count());
        let first = counts.next().unwrap_or(1);
        if first < 2 || counts.any(|c| c != first) {
            continue;
        }
        if best.is_none_or(|(_, fields)| first > fields) {
            best = Some((delim, first));
        }
    }
    best.map(|(delim, _)| delim)
}

/// Parse with a fixed delimiter. Header names are trimmed; ragged data rows
/// are padded or cut to the header width so the table stays rectangular.
fn parse_with(raw: &[u8], delimiter: u8) -> Result<Table, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(Table { columns, rows })
}
