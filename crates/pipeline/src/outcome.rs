//! Per-product results of a run.

use std::sync::Arc;

use geo_common::{ProductDescriptor, StatisticsResult};
use raster::{Coverage, RasterSample};
use renderer::{Legend, MapLayer};

/// How one product's pipeline ended.
///
/// Every variant is terminal. Only `Succeeded` carries a sample, and only a
/// succeeded product gets a raster export.
#[derive(Debug, Clone)]
pub enum ProductOutcome {
    Succeeded { sample: Arc<RasterSample> },
    /// The catalog had nothing for the region and window.
    NoImagery,
    /// Fetching or reducing failed; the run continues without this product.
    Failed { error: String },
    /// A derived product whose inputs were not all available.
    Skipped { reason: String },
}

impl ProductOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProductOutcome::Succeeded { .. })
    }

    pub fn sample(&self) -> Option<&Arc<RasterSample>> {
        match self {
            ProductOutcome::Succeeded { sample } => Some(sample),
            _ => None,
        }
    }

    /// Short state name for logs and reports.
    pub fn state(&self) -> &'static str {
        match self {
            ProductOutcome::Succeeded { .. } => "succeeded",
            ProductOutcome::NoImagery => "no_imagery",
            ProductOutcome::Failed { .. } => "failed",
            ProductOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Everything a run produced for one product.
#[derive(Debug, Clone)]
pub struct ProductReport {
    pub descriptor: ProductDescriptor,
    pub outcome: ProductOutcome,
    /// Requested statistics; all unavailable unless the product succeeded.
    pub statistics: StatisticsResult,
    pub coverage: Option<Coverage>,
    /// Empty unless the product succeeded.
    pub legend: Legend,
    pub layer: Option<MapLayer>,
}

impl ProductReport {
    /// Report for a product that produced no sample.
    pub fn unavailable(descriptor: &ProductDescriptor, outcome: ProductOutcome) -> Self {
        Self {
            descriptor: descriptor.clone(),
            statistics: StatisticsResult::unavailable(&descriptor.stat_kinds()),
            coverage: None,
            legend: Legend::empty(descriptor),
            layer: None,
            outcome,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}
