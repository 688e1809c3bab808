//! Error types for rendering.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Palette stops missing, unordered or unparseable.
    #[error("invalid palette for '{product}': {message}")]
    InvalidPalette { product: String, message: String },

    /// Sample and descriptor describe different products.
    #[error("sample of '{sample}' cannot be rendered with the '{descriptor}' palette")]
    ProductMismatch { sample: String, descriptor: String },

    /// Requested image has no pixels or an inconsistent buffer.
    #[error("invalid image dimensions: {0}")]
    InvalidDimensions(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("legend serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    pub fn invalid_palette(product: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPalette {
            product: product.into(),
            message: message.into(),
        }
    }

    pub fn dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
