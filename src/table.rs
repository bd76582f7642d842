/// Tabular data with a schema known only at runtime.
///
/// Uploads carry arbitrary extra columns alongside the required ones, so rows
/// are kept as plain text cells and typed views are derived where needed.
/// Rows are always rectangular: every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Names from `required` that are absent, in the order given.
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .cloned()
            .collect()
    }

    /// Assign a column: overwrite in place if the name exists, append
    /// otherwise. `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Keep only the first `max_rows` rows. 0 means unlimited.
    pub fn truncate(&mut self, max_rows: usize) {
        if max_rows > 0 {
            self.rows.truncate(max_rows);
        }
    }

    /// Encode as UTF-8 CSV: header row followed by one record per row.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, csv::Error> {
        let mut buf = Vec::new();
        {
            let mut wtr = csv::Writer::from_writer(&mut buf);
            wtr.write_record(&self.columns)?;
            for row in &self.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        Ok(buf)
    }
}
