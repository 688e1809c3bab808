//! Product descriptors: what to fetch, how to rescale it and how to show it.

use serde::{Deserialize, Serialize};

use crate::{GeoError, GeoResult, Palette, StatKind};

/// Static description of one satellite-derived product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Short identifier used in field names and file names (e.g. "lst")
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Catalog collection identifier (e.g. "MODIS/061/MOD11A1")
    pub catalog_id: String,

    /// Band within the collection (e.g. "LST_Day_1km")
    pub band: String,

    /// Multiplier applied to raw pixel values
    pub scale_factor: f64,

    /// Added after scaling
    #[serde(default)]
    pub offset: f64,

    /// Sampling resolution for fetch, reduction and export
    pub native_resolution_m: f64,

    /// Unit label for display
    #[serde(default)]
    pub units: Option<String>,

    /// Display palette, ascending by value
    pub palette: Palette,

    /// Statistics to compute over the region
    #[serde(default = "default_statistics")]
    pub statistics: Vec<StatKind>,
}

fn default_statistics() -> Vec<StatKind> {
    vec![StatKind::Mean]
}

impl ProductDescriptor {
    pub fn validate(&self) -> GeoResult<()> {
        let invalid = |msg: String| GeoError::invalid_descriptor(&self.id, msg);

        if self.id.trim().is_empty() {
            return Err(invalid("product id is empty".to_string()));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(invalid(format!(
                "product id '{}' may only contain ASCII letters, digits and '_'",
                self.id
            )));
        }
        if self.catalog_id.trim().is_empty() {
            return Err(invalid("catalog id is empty".to_string()));
        }
        if self.band.trim().is_empty() {
            return Err(invalid("band name is empty".to_string()));
        }
        if self.scale_factor == 0.0 || !self.scale_factor.is_finite() {
            return Err(invalid(format!(
                "scale factor must be finite and non-zero, got {}",
                self.scale_factor
            )));
        }
        if !self.offset.is_finite() {
            return Err(invalid(format!("offset {} is not finite", self.offset)));
        }
        if !(self.native_resolution_m > 0.0 && self.native_resolution_m.is_finite()) {
            return Err(invalid(format!(
                "native resolution must be positive, got {}",
                self.native_resolution_m
            )));
        }
        if self.statistics.is_empty() {
            return Err(invalid("at least one statistic must be requested".to_string()));
        }
        self.palette
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(())
    }

    /// Requested statistics in canonical column order, without duplicates.
    pub fn stat_kinds(&self) -> Vec<StatKind> {
        StatKind::ALL
            .into_iter()
            .filter(|k| self.statistics.contains(k))
            .collect()
    }

    /// Display domain of the palette (min, max).
    pub fn display_domain(&self) -> Option<(f64, f64)> {
        self.palette.domain()
    }

    /// Title for legends and layers: name if set, id otherwise.
    pub fn title(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
