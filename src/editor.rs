//! The masking canvas: fit geometry, the render surface and the stroke
//! engine wired to the events a host view delivers.
//!
//! The host drives [`ImageEditor`] with layout and pointer events and hands
//! the rest of the application a [`MaskHandle`], which only exposes the
//! four sanctioned operations (tool mode, reset, export, mask presence).
//! The surface itself is never reachable from outside.

use crate::error::{Error, Result};
use crate::export;
use crate::geometry::{self, FitGeometry};
use crate::stroke::{Brush, StrokeEngine};
use crate::surface::RenderSurface;
use crate::types::{FrameBuffer, Point, Size, ToolMode};
use image::RgbaImage;
use tracing::{debug, info, warn};

/// Called with the new mask presence on every reset (`false`) and on the
/// first painted segment after a reset (`true`).
pub type MaskListener = Box<dyn FnMut(bool)>;

pub struct ImageEditor {
    source: Option<RgbaImage>,
    container_origin: Point,
    container: Size,
    fit: Option<FitGeometry>,
    surface: Option<RenderSurface>,
    strokes: StrokeEngine,
    tool: ToolMode,
    listener: Option<MaskListener>,
}

impl ImageEditor {
    pub fn new(brush: Brush) -> Self {
        Self {
            source: None,
            container_origin: Point::default(),
            container: Size::default(),
            fit: None,
            surface: None,
            strokes: StrokeEngine::new(brush),
            tool: ToolMode::View,
            listener: None,
        }
    }

    pub fn set_mask_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.tool
    }

    pub fn has_mask(&self) -> bool {
        self.strokes.has_strokes()
    }

    pub fn is_drawing(&self) -> bool {
        self.strokes.is_drawing()
    }

    pub fn fit(&self) -> Option<FitGeometry> {
        self.fit
    }

    /// Narrow command surface for the rest of the application.
    pub fn handle(&mut self) -> MaskHandle<'_> {
        MaskHandle { editor: self }
    }

    // ---------------------------------------------------------------------
    // Lifecycle events
    // ---------------------------------------------------------------------

    /// Decode a new source image and re-fit. A payload that does not decode
    /// leaves the editor without an image (nothing to paint, nothing to export).
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<()> {
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                info!(width = rgba.width(), height = rgba.height(), "source image loaded");
                // Strokes belong to the previous photo, even when no fit is
                // possible yet.
                self.source = Some(rgba);
                self.fit = None;
                self.surface = None;
                self.strokes.reset();
                self.setup_canvas();
                if self.fit.is_none() {
                    self.notify(false);
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "source image failed to decode");
                self.source = None;
                self.fit = None;
                self.surface = None;
                self.strokes.reset();
                self.notify(false);
                Err(Error::Decode(e))
            }
        }
    }

    /// Where the container sits in viewport space. Moving the container does
    /// not re-fit; only its size does.
    pub fn place_container(&mut self, origin: Point) {
        self.container_origin = origin;
    }

    /// New container size. Re-fits and wipes the mask, even mid-stroke.
    pub fn resize_container(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "container resized");
        self.container = size;
        self.setup_canvas();
    }

    // ---------------------------------------------------------------------
    // Pointer events (viewport coordinates)
    // ---------------------------------------------------------------------

    pub fn pointer_down(&mut self, viewport: Point) {
        if !self.tool.is_erase() || self.surface.is_none() {
            return;
        }
        let at = geometry::to_surface_coords(viewport, self.surface_origin());
        self.strokes.begin(at);
    }

    pub fn pointer_move(&mut self, viewport: Point) {
        if !self.tool.is_erase() {
            return;
        }
        let to = geometry::to_surface_coords(viewport, self.surface_origin());
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.strokes.extend(surface, to) {
            info!("mask painted");
            self.notify(true);
        }
    }

    pub fn pointer_up(&mut self) {
        self.strokes.end();
    }

    pub fn pointer_leave(&mut self) {
        if self.strokes.end() {
            debug!("pointer left surface while drawing");
        }
    }

    /// Whether `viewport` lies over the surface's bounding box.
    pub fn contains(&self, viewport: Point) -> bool {
        let Some(fit) = self.fit else {
            return false;
        };
        let o = self.surface_origin();
        viewport.x >= o.x
            && viewport.y >= o.y
            && viewport.x < o.x + fit.render_width as f32
            && viewport.y < o.y + fit.render_height as f32
    }

    // ---------------------------------------------------------------------
    // Host commands
    // ---------------------------------------------------------------------

    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        if mode == self.tool {
            return;
        }
        debug!(?mode, "tool mode");
        self.tool = mode;
        if !mode.is_erase() {
            self.strokes.abandon();
        }
    }

    /// Same path as a re-fit: redraw the base, drop strokes, notify.
    pub fn reset_mask(&mut self) {
        self.setup_canvas();
    }

    /// Flattened image + strokes as bare base64 PNG, or `None` when nothing
    /// has been painted since the last reset.
    pub fn exported_mask(&self) -> Result<Option<String>> {
        if !self.strokes.has_strokes() {
            return Ok(None);
        }
        let Some(surface) = self.surface.as_ref() else {
            return Ok(None);
        };
        let payload = export::encode_png_base64(surface.pixels())?;
        info!(bytes = payload.len(), "mask exported");
        Ok(Some(payload))
    }

    /// Draw the surface into the window buffer at its on-screen position.
    pub fn present_into(&self, fb: &mut FrameBuffer, backdrop: u32) {
        if let Some(surface) = &self.surface {
            let o = self.surface_origin();
            surface.present_into(fb, (o.x as u32, o.y as u32), backdrop);
        }
    }

    // ---------------------------------------------------------------------

    fn surface_origin(&self) -> Point {
        let (dx, dy) = self
            .fit
            .map(|f| f.centered_origin(self.container))
            .unwrap_or((0, 0));
        Point::new(
            self.container_origin.x + dx as f32,
            self.container_origin.y + dy as f32,
        )
    }

    /// Fit, resize the surface, redraw the base image and reset the mask.
    /// No-op until both the container and the image have real sizes.
    fn setup_canvas(&mut self) {
        let Some(source) = self.source.as_ref() else {
            return;
        };
        let image_size = Size::new(source.width(), source.height());
        let Some(fit) = geometry::fit_to_container(self.container, image_size) else {
            debug!(?image_size, container = ?self.container, "layout not measured yet");
            return;
        };

        let surface = self
            .surface
            .get_or_insert_with(|| RenderSurface::new(fit.size()));
        surface.redraw_base(source, fit);
        self.fit = Some(fit);
        self.strokes.reset();
        debug!(
            render_width = fit.render_width,
            render_height = fit.render_height,
            "canvas fitted"
        );
        self.notify(false);
    }

    fn notify(&mut self, has_mask: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener(has_mask);
        }
    }
}

/// What the rest of the application may do with the canvas.
pub struct MaskHandle<'a> {
    editor: &'a mut ImageEditor,
}

impl MaskHandle<'_> {
    pub fn set_tool_mode(&mut self, mode: ToolMode) {
        self.editor.set_tool_mode(mode);
    }

    pub fn reset_mask(&mut self) {
        self.editor.reset_mask();
    }

    pub fn exported_mask(&self) -> Result<Option<String>> {
        self.editor.exported_mask()
    }

    pub fn has_mask(&self) -> bool {
        self.editor.has_mask()
    }
}
