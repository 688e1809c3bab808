//! Presentation layer for product samples.
//!
//! - [`legend`]: ordered legend entries built from a product palette, plus a
//!   horizontal legend strip image
//! - [`layer`]: palette colorization of a sample into an RGBA map layer
//! - [`png`]: PNG encoding of RGBA buffers

pub mod error;
pub mod layer;
pub mod legend;
pub mod png;

pub use error::{RenderError, Result};
pub use layer::MapLayer;
pub use legend::{build_legend, render_legend_strip, Legend, LegendEntry};
pub use png::encode_rgba_png;
