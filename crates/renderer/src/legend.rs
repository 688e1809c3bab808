//! Legends derived from product palettes.
//!
//! A legend has one entry per palette stop, in ascending value order. The
//! swatch is the stop color as `#rrggbb`; the label is the stop's own label
//! when set, otherwise its value followed by the product units.

use geo_common::{PaletteStop, ProductDescriptor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::png::encode_rgba_png;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// "#rrggbb"
    pub swatch: String,
    pub value: f64,
    pub label: String,
}

/// Legend for one product layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub product: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Legend without entries, shown for products that produced no imagery.
    pub fn empty(descriptor: &ProductDescriptor) -> Self {
        Self {
            product: descriptor.id.clone(),
            title: descriptor.title().to_string(),
            units: descriptor.units.clone(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the legend for a product from its palette.
pub fn build_legend(descriptor: &ProductDescriptor) -> Result<Legend> {
    descriptor
        .palette
        .validate()
        .map_err(|e| RenderError::invalid_palette(&descriptor.id, e.to_string()))?;

    let entries = descriptor
        .palette
        .stops
        .iter()
        .map(|stop| entry_for(&descriptor.id, stop, descriptor.units.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    debug!(product = %descriptor.id, entries = entries.len(), "Built legend");

    Ok(Legend {
        product: descriptor.id.clone(),
        title: descriptor.title().to_string(),
        units: descriptor.units.clone(),
        entries,
    })
}

fn entry_for(product: &str, stop: &PaletteStop, units: Option<&str>) -> Result<LegendEntry> {
    let swatch = stop.color.to_hex().ok_or_else(|| {
        RenderError::invalid_palette(product, format!("unrecognized color {:?}", stop.color))
    })?;

    let label = match (&stop.label, units) {
        (Some(label), _) => label.clone(),
        (None, Some(units)) if !units.is_empty() => format!("{} {}", stop.value, units),
        (None, _) => stop.value.to_string(),
    };

    Ok(LegendEntry {
        swatch,
        value: stop.value,
        label,
    })
}

/// Render a horizontal color ramp across the palette's display domain.
///
/// Column `x` shows the color of `min + (max - min) * x / (width - 1)`.
pub fn render_legend_strip(
    descriptor: &ProductDescriptor,
    width: usize,
    height: usize,
) -> Result<Vec<u8>> {
    let (min, max) = descriptor
        .display_domain()
        .ok_or_else(|| RenderError::invalid_palette(&descriptor.id, "palette has no stops"))?;

    let mut row = Vec::with_capacity(width * 4);
    for x in 0..width {
        let t = if width > 1 {
            x as f64 / (width - 1) as f64
        } else {
            0.0
        };
        let (r, g, b, a) = descriptor
            .palette
            .interpolate(min + (max - min) * t)
            .ok_or_else(|| RenderError::invalid_palette(&descriptor.id, "unrecognized color"))?;
        row.extend_from_slice(&[r, g, b, a]);
    }

    let pixels = row.repeat(height);
    encode_rgba_png(&pixels, width, height)
}
