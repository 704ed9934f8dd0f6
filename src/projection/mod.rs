pub mod fixed;
pub mod generic;

use serde::Serialize;
use serde_json::Value;

use crate::envelope::{Record, ResponseEnvelope};
use crate::error::Result;

/// How columns are resolved for a response. Picked by inspecting the items,
/// never by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Columns come from the keys of the first item.
    Generic,
    /// Items carry the matched-item fields; use the declared column table.
    Fixed,
}

impl SchemaMode {
    pub fn detect(items: &[Record]) -> Self {
        match items.first() {
            Some(first) if fixed::MARKERS.iter().all(|k| first.contains_key(*k)) => {
                SchemaMode::Fixed
            }
            _ => SchemaMode::Generic,
        }
    }
}

/// Display formatting for one column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellFormat {
    Plain,
    /// Two decimals after a prefix, e.g. `$5.00`.
    Prefixed(&'static str),
    /// Two decimals before a suffix, e.g. `1.23 kg CO₂e`.
    Suffixed(&'static str),
}

impl CellFormat {
    pub fn render(self, value: &Value) -> String {
        match (self, value.as_f64()) {
            (CellFormat::Prefixed(p), Some(n)) => format!("{}{:.2}", p, n),
            (CellFormat::Suffixed(s), Some(n)) => format!("{:.2}{}", n, s),
            _ => plain(value),
        }
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub width: usize,
    pub format: CellFormat,
}

impl ColumnSpec {
    pub fn render(&self, row: &Row) -> String {
        row.fields
            .get(&self.key)
            .map(|v| self.format.render(v))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// 1-based position in the response.
    pub id: usize,
    pub fields: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectedTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
}

impl ProjectedTable {
    /// Nothing to display. Not an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalize a tabular response into columns and rows.
pub fn project(envelope: &ResponseEnvelope) -> Result<ProjectedTable> {
    let items = envelope.items();
    if items.is_empty() {
        return Ok(ProjectedTable::default());
    }
    match SchemaMode::detect(items) {
        SchemaMode::Generic => Ok(generic::project(items)),
        SchemaMode::Fixed => fixed::project(items),
    }
}
