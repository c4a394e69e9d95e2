// Editor settings, loaded from an optional TOML file. Every field has a
// default so an empty (or missing) file gives the stock behaviour.

use crate::error::{Error, Result};
use crate::stroke::Brush;
use crate::types::Rgba;
use crate::upload::MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub brush_width: f32,
    /// RGBA, straight alpha.
    pub brush_color: [u8; 4],
    pub max_upload_bytes: u64,
    pub window_width: usize,
    pub window_height: usize,
    /// Inset between the window edge and the canvas container.
    pub padding: u32,
    /// 0x00RRGGBB behind the canvas.
    pub backdrop: u32,
    /// Where queued generation requests are written.
    pub outbox_dir: PathBuf,
    /// Where downloaded results are saved.
    pub output_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let c = Brush::DEFAULT_COLOR;
        Self {
            brush_width: Brush::DEFAULT_WIDTH,
            brush_color: [c.r, c.g, c.b, c.a],
            max_upload_bytes: MAX_UPLOAD_BYTES,
            window_width: 1024,
            window_height: 768,
            padding: 16,
            backdrop: 0x00_F1_F5_F9,
            outbox_dir: PathBuf::from("outbox"),
            output_dir: PathBuf::from("."),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.brush_width.is_finite() && self.brush_width > 0.0) {
            return Err(Error::config(format!("brush_width must be > 0, got {}", self.brush_width)));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(Error::config("window size must be non-zero"));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::config("max_upload_bytes must be non-zero"));
        }
        Ok(())
    }

    pub fn brush(&self) -> Brush {
        let [r, g, b, a] = self.brush_color;
        Brush { width: self.brush_width, color: Rgba::new(r, g, b, a) }
    }
}
