//! Summary table rows.

use std::fmt;

use geo_common::{StatKind, StatisticsResult};
use serde::{Deserialize, Serialize};

/// Leading columns of every summary row.
pub const DATE_FROM: &str = "date_from";
pub const DATE_TO: &str = "date_to";
pub const REGION: &str = "region";

/// One cell of a summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Explicitly unavailable; written as an empty cell.
    Empty,
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => FieldValue::Number(v),
            _ => FieldValue::Empty,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// Statistics of one product, as they go into the summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStatistics {
    pub product: String,
    pub statistics: StatisticsResult,
}

impl ProductStatistics {
    pub fn new(product: impl Into<String>, statistics: StatisticsResult) -> Self {
        Self {
            product: product.into(),
            statistics,
        }
    }

    /// (column, value) pairs in canonical stat order. Unavailable values are
    /// present as [`FieldValue::Empty`].
    pub fn fields(&self) -> Vec<(String, FieldValue)> {
        StatKind::ALL
            .into_iter()
            .filter(|kind| self.statistics.contains(*kind))
            .map(|kind| {
                (
                    kind.field_name(&self.product),
                    FieldValue::from(self.statistics.get(kind)),
                )
            })
            .collect()
    }
}

/// An ordered row of named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    fields: Vec<(String, FieldValue)>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Returns false if the column already exists.
    pub fn push(&mut self, column: impl Into<String>, value: FieldValue) -> bool {
        let column = column.into();
        if self.contains(&column) {
            return false;
        }
        self.fields.push((column, value));
        true
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(c, _)| c == column)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn header(&self) -> Vec<&str> {
        self.fields.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Cell texts in column order.
    pub fn record(&self) -> Vec<String> {
        self.fields.iter().map(|(_, v)| v.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }
}
