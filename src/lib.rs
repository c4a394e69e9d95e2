//! Paint a removal mask over a photo, pick a stock-photo style and hand the
//! flattened result to a generation backend.
//!
//! The interesting part is the masking canvas in [`editor`]: it fits the
//! photo into a resizable container ([`geometry`]), keeps one raster with the
//! photo and the painted strokes ([`surface`], [`stroke`]) and exports it as
//! bare base64 PNG ([`export`]). [`app`] is the host's screen state machine;
//! [`upload`], [`style`] and [`generation`] are the thin collaborators around
//! it.

pub mod app;
pub mod config;
pub mod draw;
pub mod editor;
pub mod error;
pub mod export;
pub mod generation;
pub mod geometry;
pub mod logging;
pub mod stroke;
pub mod style;
pub mod surface;
pub mod types;
pub mod upload;

pub use editor::{ImageEditor, MaskHandle};
pub use error::{Error, Result};
pub use geometry::{FitGeometry, fit_to_container};
pub use stroke::Brush;
pub use types::{Point, Size, ToolMode};
