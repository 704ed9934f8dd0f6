use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AnalysisError, Result};

pub type Record = Map<String, Value>;

const ITEMS_KEY: &str = "items";

/// Raw body of a tabular response, before projection.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// `[ {...}, {...} ]`
    Bare(Vec<Record>),
    /// `{ "items": [...], "totalCarbonFootprint": 12.3, ... }`
    Wrapped { items: Vec<Record>, summary: Record },
}

impl ResponseEnvelope {
    /// Detect which of the two shapes the body has.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(elements) => Ok(ResponseEnvelope::Bare(records(elements)?)),
            Value::Object(mut obj) => {
                let items = match obj.shift_remove(ITEMS_KEY) {
                    Some(Value::Array(elements)) => records(elements)?,
                    Some(other) => {
                        return Err(AnalysisError::Parse(format!(
                            "'{}' is {}, expected an array",
                            ITEMS_KEY,
                            kind(&other)
                        )))
                    }
                    None => {
                        return Err(AnalysisError::Parse(format!(
                            "object has no '{}' array",
                            ITEMS_KEY
                        )))
                    }
                };
                // Only scalar, non-null extras count as summary data
                let summary = obj
                    .into_iter()
                    .filter(|(_, v)| matches!(v, Value::Bool(_) | Value::Number(_) | Value::String(_)))
                    .collect();
                Ok(ResponseEnvelope::Wrapped { items, summary })
            }
            other => Err(AnalysisError::Parse(format!(
                "expected an array or an object, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn items(&self) -> &[Record] {
        match self {
            ResponseEnvelope::Bare(items) => items,
            ResponseEnvelope::Wrapped { items, .. } => items,
        }
    }

    /// Auxiliary scalars from a wrapped body; empty for a bare array.
    pub fn summary(&self) -> Record {
        match self {
            ResponseEnvelope::Bare(_) => Record::new(),
            ResponseEnvelope::Wrapped { summary, .. } => summary.clone(),
        }
    }
}

fn records(elements: Vec<Value>) -> Result<Vec<Record>> {
    elements
        .into_iter()
        .enumerate()
        .map(|(i, el)| match el {
            Value::Object(rec) => Ok(rec),
            other => Err(AnalysisError::Parse(format!(
                "item {} is {}, expected an object",
                i + 1,
                kind(&other)
            ))),
        })
        .collect()
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Body returned by `/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub prediction: String,
    #[serde(default)]
    pub mapped_biomedical_category: Option<String>,
}

impl ClassificationResponse {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
