use serde::Serialize;
use serde_json::Value;

use crate::domain::ColumnSelection;
use crate::error::ExplorerError;
use crate::records::{ActivityRecord, FieldMap, TargetRecord};

/// Column-oriented view over a list of records.
///
/// Columns are the union of the records' field names in first-seen order.
/// A record without a given field gets a `null` cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordTable {
    pub fn from_field_maps<'a, I>(maps: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldMap>,
    {
        let maps: Vec<&FieldMap> = maps.into_iter().collect();
        let mut columns: Vec<String> = Vec::new();
        for map in &maps {
            for key in map.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = maps
            .iter()
            .map(|map| {
                columns
                    .iter()
                    .map(|column| map.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn from_targets(records: &[TargetRecord]) -> Self {
        Self::from_field_maps(records.iter().map(|record| &record.fields))
    }

    pub fn from_activities(records: &[ActivityRecord]) -> Self {
        Self::from_field_maps(records.iter().map(|record| &record.fields))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// The first `n` rows, all columns.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Restricts every row to the selected columns, in selection order.
    ///
    /// An empty selection returns the table unchanged. Selected names that are
    /// not columns of this table are skipped.
    pub fn project(&self, selection: &ColumnSelection) -> Self {
        if selection.is_all() {
            return self.clone();
        }
        let indices: Vec<usize> = selection
            .columns()
            .iter()
            .filter_map(|name| self.columns.iter().position(|column| column == name))
            .collect();

        Self {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Comma-separated text: a header row of column names, then one line per
    /// row. No index column.
    pub fn to_csv(&self) -> Result<String, ExplorerError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|err| ExplorerError::Csv(err.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(cell_text))
                .map_err(|err| ExplorerError::Csv(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ExplorerError::Csv(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| ExplorerError::Csv(err.to_string()))
    }
}

/// Text shown for a single cell, both on screen and in exports.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
