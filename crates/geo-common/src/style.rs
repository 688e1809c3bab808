//! Display palettes for product layers.
//!
//! A palette is an ordered list of value/color stops. The first and last stop
//! values define the display domain of the product (e.g. NDVI 0.0 - 0.8).

use serde::{Deserialize, Serialize};

use crate::{GeoError, GeoResult};

/// A color stop in a palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteStop {
    /// The physical value at this stop
    pub value: f64,

    /// The color at this stop
    pub color: Color,

    /// Optional label for legend
    #[serde(default)]
    pub label: Option<String>,
}

impl PaletteStop {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: Color::Text(color.into()),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string ("#RRGGBB", "#RRGGBBAA", "RRGGBB") or a named color
    Text(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    pub fn transparent() -> Self {
        Color::Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert to an RGBA tuple, `None` if the color cannot be parsed.
    pub fn to_rgba(&self) -> Option<(u8, u8, u8, u8)> {
        match self {
            Color::Text(s) => parse_hex_color(s).or_else(|| named_color(s)),
            Color::Array(arr) => match arr.len() {
                3 => Some((arr[0], arr[1], arr[2], 255)),
                4 => Some((arr[0], arr[1], arr[2], arr[3])),
                _ => None,
            },
            Color::Rgba { r, g, b, a } => Some((*r, *g, *b, *a)),
        }
    }

    /// "#rrggbb" form of the color, used as the legend swatch.
    pub fn to_hex(&self) -> Option<String> {
        self.to_rgba()
            .map(|(r, g, b, _)| format!("#{:02x}{:02x}{:02x}", r, g, b))
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8, u8)> {
    let s = s.trim().trim_start_matches('#');
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    match s.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some((channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<(u8, u8, u8, u8)> {
    let rgba = match name.trim().to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "darkgreen" => (0, 100, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" => (0, 255, 255, 255),
        "magenta" => (255, 0, 255, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "brown" => (165, 42, 42, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => return None,
    };
    Some(rgba)
}

/// Ordered palette stops with linear interpolation between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    pub stops: Vec<PaletteStop>,
}

impl Palette {
    pub fn new(stops: Vec<PaletteStop>) -> Self {
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn validate(&self) -> GeoResult<()> {
        if self.stops.len() < 2 {
            return Err(GeoError::InvalidPalette(
                "palette must have at least 2 color stops".to_string(),
            ));
        }

        for stop in &self.stops {
            if !stop.value.is_finite() {
                return Err(GeoError::InvalidPalette(format!(
                    "stop value {} is not finite",
                    stop.value
                )));
            }
            if stop.color.to_rgba().is_none() {
                return Err(GeoError::InvalidPalette(format!(
                    "unrecognized color {:?}",
                    stop.color
                )));
            }
        }

        if self.stops.windows(2).any(|w| w[1].value <= w[0].value) {
            return Err(GeoError::InvalidPalette(
                "color stops must be in ascending value order".to_string(),
            ));
        }

        Ok(())
    }

    /// Display domain (first stop value, last stop value).
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((self.stops.first()?.value, self.stops.last()?.value))
    }

    /// Interpolate the color for a value, clamping outside the domain.
    pub fn interpolate(&self, value: f64) -> Option<(u8, u8, u8, u8)> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;

        if value.is_nan() {
            return None;
        }
        if value <= first.value {
            return first.color.to_rgba();
        }
        if value >= last.value {
            return last.color.to_rgba();
        }

        // Find bracketing stops
        let upper = self.stops.iter().position(|s| value <= s.value)?;
        let low = &self.stops[upper - 1];
        let high = &self.stops[upper];
        let t = ((value - low.value) / (high.value - low.value)).clamp(0.0, 1.0);

        let (r1, g1, b1, a1) = low.color.to_rgba()?;
        let (r2, g2, b2, a2) = high.color.to_rgba()?;

        let lerp_u8 =
            |a: u8, b: u8| -> u8 { ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8 };

        Some((
            lerp_u8(r1, r2),
            lerp_u8(g1, g2),
            lerp_u8(b1, b2),
            lerp_u8(a1, a2),
        ))
    }
}
