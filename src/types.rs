// Core types shared by the editor, the surface and the window host.

/// What the window shows each frame.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate to a new window size; contents are zeroed.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

/// Pixel dimensions of a container or an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero in either axis means "not measured yet".
    pub fn is_measured(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// A position in some coordinate space (viewport or surface-local).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Whether pointer input paints the mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolMode {
    #[default]
    View,
    Erase,
}

impl ToolMode {
    pub fn is_erase(self) -> bool {
        matches!(self, ToolMode::Erase)
    }
}

/// Straight (non-premultiplied) RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}
