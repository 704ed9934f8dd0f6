use serde_json::{Number, Value};

use super::{CellFormat, ColumnSpec, ProjectedTable, Row};
use crate::envelope::Record;
use crate::error::{AnalysisError, Result};

/// Keys whose presence on the first item selects the fixed schema.
pub const MARKERS: [&str; 5] = [
    "matchedItem",
    "quantity",
    "matchedItemCarbonFootprint",
    "totalMatchedItemCarbonFootprint",
    "totalPrice",
];

const EMISSIONS_UNIT: &str = " kg CO₂e";
const CURRENCY: &str = "$";

#[derive(Clone, Copy)]
enum Cell {
    /// Copied as-is, may be absent.
    Text,
    /// Must be numeric. Numbers are copied as-is, numeric strings parsed.
    Count,
    /// Must be numeric, rounded to three decimals.
    Measure,
}

struct FixedColumn {
    source: &'static str,
    key: &'static str,
    label: &'static str,
    width: usize,
    cell: Cell,
    format: CellFormat,
}

const COLUMNS: &[FixedColumn] = &[
    FixedColumn {
        source: "matchedItem",
        key: "matchedItem",
        label: "Matched Item",
        width: 28,
        cell: Cell::Text,
        format: CellFormat::Plain,
    },
    FixedColumn {
        source: "quantity",
        key: "quantity",
        label: "Quantity",
        width: 10,
        cell: Cell::Count,
        format: CellFormat::Plain,
    },
    FixedColumn {
        source: "matchedItemCarbonFootprint",
        key: "globalFootprintPerUnit",
        label: "Footprint / Unit",
        width: 20,
        cell: Cell::Measure,
        format: CellFormat::Suffixed(EMISSIONS_UNIT),
    },
    FixedColumn {
        source: "totalMatchedItemCarbonFootprint",
        key: "totalGlobalFootprint",
        label: "Total Footprint",
        width: 20,
        cell: Cell::Measure,
        format: CellFormat::Suffixed(EMISSIONS_UNIT),
    },
    FixedColumn {
        source: "totalPrice",
        key: "totalPrice",
        label: "Total Price",
        width: 14,
        cell: Cell::Measure,
        format: CellFormat::Prefixed(CURRENCY),
    },
];

pub fn columns() -> Vec<ColumnSpec> {
    COLUMNS
        .iter()
        .map(|c| ColumnSpec {
            key: c.key.to_string(),
            label: c.label.to_string(),
            width: c.width,
            format: c.format,
        })
        .collect()
}

/// Any record with a missing or non-numeric measure fails the whole projection.
pub fn project(items: &[Record]) -> Result<ProjectedTable> {
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| project_row(i + 1, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProjectedTable {
        columns: columns(),
        rows,
    })
}

fn project_row(id: usize, item: &Record) -> Result<Row> {
    let mut fields = item.clone();
    for col in COLUMNS {
        let raw = item.get(col.source).unwrap_or(&Value::Null);
        let value = match col.cell {
            Cell::Text => raw.clone(),
            Cell::Count => count(id, col.source, raw)?,
            Cell::Measure => {
                let n = round3(numeric(id, col.source, raw)?);
                Number::from_f64(n).map(Value::Number).ok_or_else(|| AnalysisError::Projection {
                    row: id,
                    field: col.source.to_string(),
                    reason: "is not finite".into(),
                })?
            }
        };
        fields.insert(col.key.to_string(), value);
    }
    Ok(Row { id, fields })
}

fn numeric(row: usize, field: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Null => {
            return Err(AnalysisError::Projection {
                row,
                field: field.to_string(),
                reason: "is missing".into(),
            })
        }
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let n = parsed.ok_or_else(|| AnalysisError::Projection {
        row,
        field: field.to_string(),
        reason: format!("is not numeric ({})", value),
    })?;
    // "NaN" and "inf" parse as f64
    if !n.is_finite() {
        return Err(AnalysisError::Projection {
            row,
            field: field.to_string(),
            reason: "is not finite".into(),
        });
    }
    Ok(n)
}

fn count(row: usize, field: &str, value: &Value) -> Result<Value> {
    let n = numeric(row, field, value)?;
    Ok(match value {
        Value::Number(_) => value.clone(),
        _ if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Value::from(n as i64),
        _ => Value::from(n),
    })
}

fn round3(n: f64) -> f64 {
    (n * 1000.0).round() / 1000.0
}
