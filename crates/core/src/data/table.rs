use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde_json::{Map, Number, Value};

use crate::error::{Result, VisError};

/// Column-oriented view of tabular input, typed cell by cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(VisError::invalid(format!("duplicate column `{column}`")));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(VisError::invalid(format!(
                    "row {i} has {} cells but there are {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .into_records()
            .map(|record| record.map(|record| record.iter().map(parse_cell).collect()))
            .collect::<std::result::Result<Vec<Vec<Value>>, _>>()?;

        Self::new(columns, rows)
    }

    /// Builds a table from JSON objects. Columns appear in first-seen order and
    /// keys missing from a record become `null`.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    /// Parses a JSON array of objects.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let records: Vec<Map<String, Value>> = serde_json::from_str(text)?;
        Self::from_records(&records)
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

    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| VisError::MissingColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row[index].as_f64().ok_or_else(|| {
                    VisError::invalid(format!(
                        "column `{name}` row {i} is not numeric: {}",
                        row[index]
                    ))
                })
            })
            .collect()
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(cell.to_string()),
    }
}
