// What you SEE:
// • The photo, fitted into the window (letterboxed, never cropped).
// • E: erase tool. Hold Left Mouse to paint the red removal mask. V: view tool.
// • C clears the mask. 1–5 pick a style. G generates.
// • On the result screen: S saves the image, B goes back to the editor.
// • ESC quits. The title bar shows the current state.

use anyhow::Context;
use clap::Parser;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use stock_eraser::app::{App, AppState};
use stock_eraser::config::EditorConfig;
use stock_eraser::draw::{Command, Drawer, draw_brush_ring};
use stock_eraser::editor::ImageEditor;
use stock_eraser::export;
use stock_eraser::generation::{ImageGenerator, OutboxGenerator, unix_millis};
use stock_eraser::geometry::{FitGeometry, fit_to_container};
use stock_eraser::style::StockStyle;
use stock_eraser::surface::RenderSurface;
use stock_eraser::types::{FrameBuffer, Point, Size, ToolMode};
use stock_eraser::{logging, upload};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "stock-eraser", version, about = "Turn a snapshot into a stock photo")]
struct Cli {
    /// Photo to edit (JPEG, PNG, WebP; up to 10MB)
    image: PathBuf,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Style preset id (standard, vibrant_product, soft_portrait, architectural, cinematic)
    #[arg(long)]
    style: Option<StockStyle>,

    /// Custom instructions for the generator
    #[arg(long)]
    prompt: Option<String>,

    /// -v debug, -vv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    /* --- Upload intake ---
       Visual: nothing yet; a rejected file exits with the user-facing message. */
    let asset = upload::from_path(&cli.image, config.max_upload_bytes)
        .with_context(|| format!("cannot use {}", cli.image.display()))?;
    let mut app = App::new();
    app.image_selected(asset.clone());
    if let Some(style) = cli.style {
        app.select_style(style)?;
    }
    if let Some(prompt) = cli.prompt {
        app.set_prompt(prompt)?;
    }

    /* --- Editor ---
       Mask presence arrives through the listener; we fold it into the app
       state once per frame. */
    let (mask_tx, mask_rx) = mpsc::channel();
    let mut editor = ImageEditor::new(config.brush());
    editor.set_mask_listener(move |has_mask| {
        let _ = mask_tx.send(has_mask);
    });
    let pad = config.padding as f32;
    editor.place_container(Point::new(pad, pad));
    if let Err(e) = editor.load_image(&asset.decode_bytes()?) {
        // Nothing to paint on; generation still works without a mask.
        warn!(error = %e, "editor has no image");
    }

    /* --- Window + screen buffer --- */
    let mut drawer = Drawer::new("Stock Eraser", config.window_width, config.window_height)?;
    let mut screen = FrameBuffer::new(config.window_width, config.window_height);
    let mut window_size = (0, 0); // forces a fit on the first frame
    let mut container = Size::default();
    let mut was_down = false;
    let mut title = String::new();

    let backend = OutboxGenerator::new(&config.outbox_dir);
    info!(outbox = %backend.dir().display(), "generation requests are queued here");
    let mut result: Option<ResultView> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Layout: a new window size re-fits the canvas (and wipes the mask). */
        let size = drawer.size();
        if size != window_size {
            window_size = size;
            screen.resize(size.0, size.1);
            container = container_size(size, config.padding);
            editor.resize_container(container);
            if let Some(view) = result.as_mut() {
                view.layout(container);
            }
        }

        /* 2) Keyboard commands */
        for cmd in drawer.commands() {
            match cmd {
                Command::ViewTool => set_tool(&mut app, &mut editor, ToolMode::View),
                Command::EraseTool => set_tool(&mut app, &mut editor, ToolMode::Erase),
                Command::ClearMask => {
                    if matches!(app.state(), AppState::Editing(_) | AppState::Failed { .. }) {
                        editor.handle().reset_mask();
                    }
                }
                Command::Style(slot) => {
                    if let Some(style) = StockStyle::from_slot(slot) {
                        if let Err(e) = app.select_style(style) {
                            debug!(error = %e, "style ignored");
                        }
                    }
                }
                Command::Generate => {
                    result = generate(&mut app, &mut editor, &backend, container);
                }
                Command::BackToEdit => {
                    if app.back_to_edit().is_ok() {
                        result = None;
                        // The editor comes back fresh, like a remount.
                        editor.handle().reset_mask();
                    }
                }
                Command::SaveResult => {
                    if let Some(view) = &result {
                        match view.save(&config.output_dir) {
                            Ok(path) => info!(path = %path.display(), "result saved"),
                            Err(e) => warn!(error = %e, "could not save result"),
                        }
                    }
                }
            }
        }

        /* 3) Pointer → stroke events, only while the editor is on screen.
           Leaving the canvas (or the window) ends the stroke. */
        let mouse = drawer.mouse_pos();
        let down = drawer.left_mouse_down();
        if matches!(app.state(), AppState::Editing(_) | AppState::Failed { .. }) {
            match mouse {
                Some(p) if editor.contains(p) => {
                    if down && !was_down {
                        editor.pointer_down(p);
                    } else if down {
                        editor.pointer_move(p);
                    } else if was_down {
                        editor.pointer_up();
                    }
                }
                _ => editor.pointer_leave(),
            }
        }
        was_down = down;

        /* 4) Mask presence notifications → app state */
        for has_mask in mask_rx.try_iter() {
            app.mask_presence_changed(has_mask);
        }

        /* 5) Draw: result screen or editor (+ brush ring while erasing) */
        screen.fill(config.backdrop);
        match (&result, app.state()) {
            (Some(view), AppState::Complete { .. }) => view.present_into(&mut screen, config.padding, container, config.backdrop),
            _ => {
                editor.present_into(&mut screen, config.backdrop);
                if editor.tool_mode().is_erase() {
                    if let Some(p) = mouse.filter(|p| editor.contains(*p)) {
                        let r = (config.brush_width * 0.5).round() as i32;
                        draw_brush_ring(&mut screen, p.x as i32, p.y as i32, r, 0x00_33_33_33);
                    }
                }
            }
        }

        let next_title = window_title(&app);
        if next_title != title {
            drawer.set_title(&next_title);
            title = next_title;
        }

        /* 6) Present to the window */
        drawer.present(&screen)?;
    }

    Ok(())
}

fn container_size(window: (usize, usize), padding: u32) -> Size {
    let inset = 2 * padding as usize;
    Size::new(
        window.0.saturating_sub(inset) as u32,
        window.1.saturating_sub(inset) as u32,
    )
}

fn set_tool(app: &mut App, editor: &mut ImageEditor, mode: ToolMode) {
    match app.set_tool_mode(mode) {
        Ok(()) => editor.handle().set_tool_mode(mode),
        Err(e) => debug!(error = %e, "tool change ignored"),
    }
}

/// Submit the current session. Returns the result view on success.
fn generate(
    app: &mut App,
    editor: &mut ImageEditor,
    backend: &impl ImageGenerator,
    container: Size,
) -> Option<ResultView> {
    let handle = editor.handle();
    let mask = if handle.has_mask() {
        handle.exported_mask().unwrap_or_else(|e| {
            warn!(error = %e, "mask export failed; submitting without it");
            None
        })
    } else {
        None
    };

    let request = match app.begin_generation(mask) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "generate ignored");
            return None;
        }
    };

    let outcome = backend
        .generate(&request)
        .and_then(|generated| ResultView::decode(&generated, container).map(|view| (generated, view)));

    match outcome {
        Ok((generated, view)) => {
            if let Err(e) = app.generation_succeeded(generated) {
                debug!(error = %e, "result dropped");
                return None;
            }
            Some(view)
        }
        Err(e) => {
            warn!(error = %e, "generation failed");
            if let Err(e) = app.generation_failed() {
                debug!(error = %e, "failure not recorded");
            }
            None
        }
    }
}

fn window_title(app: &App) -> String {
    let Some(session) = app.session() else {
        return "Stock Eraser".to_string();
    };
    let tool = match session.tool {
        ToolMode::View => "View",
        ToolMode::Erase => "Magic Eraser",
    };
    let mut title = format!(
        "Stock Eraser - {} | {} | Style: {} ({})",
        app.state().name(),
        tool,
        session.style.label(),
        session.style.description(),
    );
    if session.has_mask {
        title.push_str(" | Object removal active (red mask)");
    }
    if let AppState::Failed { message, .. } = app.state() {
        title.push_str(" | ");
        title.push_str(message);
    }
    title
}

/// The generated image, fitted into the same container as the editor.
struct ResultView {
    image: RgbaImage,
    surface: RenderSurface,
    fit: Option<FitGeometry>,
}

impl ResultView {
    fn decode(base64: &str, container: Size) -> stock_eraser::Result<Self> {
        let bytes = export::decode_base64(base64)?;
        let image = image::load_from_memory(&bytes)?.to_rgba8();
        let mut view = Self { image, surface: RenderSurface::new(Size::default()), fit: None };
        view.layout(container);
        Ok(view)
    }

    fn layout(&mut self, container: Size) {
        let image_size = Size::new(self.image.width(), self.image.height());
        self.fit = fit_to_container(container, image_size);
        if let Some(fit) = self.fit {
            self.surface.redraw_base(&self.image, fit);
        }
    }

    fn present_into(&self, fb: &mut FrameBuffer, padding: u32, container: Size, backdrop: u32) {
        if let Some(fit) = self.fit {
            let (dx, dy) = fit.centered_origin(container);
            self.surface.present_into(fb, (padding + dx, padding + dy), backdrop);
        }
    }

    /// Full-resolution PNG, named like a browser download.
    fn save(&self, dir: &Path) -> stock_eraser::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("stockified-{}.png", unix_millis()));
        std::fs::write(&path, export::encode_png(&self.image)?)?;
        Ok(path)
    }
}
