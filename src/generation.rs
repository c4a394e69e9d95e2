//! Contract with the image-generation backend.
//!
//! The editor only contributes the optional mask payload; everything else in
//! [`GenerationRequest`] comes from the host. [`OutboxGenerator`] is the
//! offline backend the desktop host ships with: it drops each request into a
//! directory for an external worker and echoes the source image back.

use crate::error::{Error, Result};
use crate::export;
use crate::style::StockStyle;
use serde::Serialize;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub image_base64: String,
    pub mime_type: String,
    pub prompt: String,
    pub style: StockStyle,
    /// Flattened image + red strokes; `None` when nothing was painted.
    pub mask_base64: Option<String>,
}

pub trait ImageGenerator {
    /// Returns the generated image as bare base64.
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

pub struct OutboxGenerator {
    dir: PathBuf,
    seq: Cell<u32>,
}

impl OutboxGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), seq: Cell::new(0) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_job_dir(&self) -> PathBuf {
        let seq = self.seq.get();
        self.seq.set(seq.wrapping_add(1));
        self.dir.join(format!("{}-{seq:04}", unix_millis()))
    }
}

impl ImageGenerator for OutboxGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if request.image_base64.is_empty() {
            return Err(Error::generation("request carries no image"));
        }

        let job = self.next_job_dir();
        std::fs::create_dir_all(&job)?;

        let json = serde_json::to_vec_pretty(request)?;
        std::fs::write(job.join("request.json"), json)?;

        if let Some(mask) = &request.mask_base64 {
            std::fs::write(job.join("mask.png"), export::decode_base64(mask)?)?;
        }

        info!(job = %job.display(), style = %request.style, masked = request.mask_base64.is_some(), "request queued");
        Ok(request.image_base64.clone())
    }
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
