use serde_json::Value;

use super::{CellFormat, ColumnSpec, ProjectedTable, Row};
use crate::envelope::Record;

pub const DEFAULT_WIDTH: usize = 18;

/// Columns are the first item's keys, in the order the body listed them.
/// Later items missing a key get a null cell for it.
pub fn project(items: &[Record]) -> ProjectedTable {
    let columns: Vec<ColumnSpec> = items
        .first()
        .map(|first| {
            first
                .keys()
                .map(|key| ColumnSpec {
                    key: key.clone(),
                    label: key.clone(),
                    width: DEFAULT_WIDTH,
                    format: CellFormat::Plain,
                })
                .collect()
        })
        .unwrap_or_default();

    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut fields = item.clone();
            for col in &columns {
                fields.entry(col.key.clone()).or_insert(Value::Null);
            }
            Row { id: i + 1, fields }
        })
        .collect();

    ProjectedTable { columns, rows }
}
