//! Charts for assembled WTSS datasets.
//!
//! This crate provides:
//! - `layout`: pixel geometry shared by rendering and hit-testing
//! - `presenter`: hover, tooltip, overlay placement and click handling
//! - `render`: plotters output to SVG text or an RGB bitmap

pub mod layout;
pub mod presenter;
pub mod render;

pub use presenter::{ChartPresenter, PresentationMode};

/// Chart rendering failures.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Bitmap buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, ChartError>;
