//! Statistic kinds and per-product statistics results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A spatial statistic computed over a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Mean,
    Min,
    Max,
}

impl StatKind {
    /// Every kind, in the order columns are written to the summary table.
    pub const ALL: [StatKind; 3] = [StatKind::Mean, StatKind::Min, StatKind::Max];

    pub fn name(&self) -> &'static str {
        match self {
            StatKind::Mean => "mean",
            StatKind::Min => "min",
            StatKind::Max => "max",
        }
    }

    /// Prefix of the summary table column ("avg_lst", "min_aod", ...).
    pub fn field_prefix(&self) -> &'static str {
        match self {
            StatKind::Mean => "avg",
            StatKind::Min => "min",
            StatKind::Max => "max",
        }
    }

    /// Column name for this statistic of a product.
    pub fn field_name(&self, product: &str) -> String {
        format!("{}_{}", self.field_prefix(), product)
    }

    /// Parse from string (case-insensitive, "avg" accepted for mean).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "avg" | "average" => Some(StatKind::Mean),
            "min" | "minimum" => Some(StatKind::Min),
            "max" | "maximum" => Some(StatKind::Max),
            _ => None,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a spatial reduction: each requested kind maps to a value, or
/// `None` when the region held no valid pixels.
///
/// Unavailable statistics are entries, not missing keys, so a result always
/// lists every kind that was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsResult {
    values: BTreeMap<StatKind, Option<f64>>,
}

impl StatisticsResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result with every requested kind unavailable.
    pub fn unavailable(kinds: &[StatKind]) -> Self {
        Self {
            values: kinds.iter().map(|k| (*k, None)).collect(),
        }
    }

    pub fn set(&mut self, kind: StatKind, value: Option<f64>) {
        self.values.insert(kind, value);
    }

    /// Value of a statistic; `None` if unavailable or not requested.
    pub fn get(&self, kind: StatKind) -> Option<f64> {
        self.values.get(&kind).copied().flatten()
    }

    /// Whether the kind was requested (available or not).
    pub fn contains(&self, kind: StatKind) -> bool {
        self.values.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = StatKind> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, Option<f64>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every requested statistic is unavailable.
    pub fn all_unavailable(&self) -> bool {
        self.values.values().all(Option::is_none)
    }
}
