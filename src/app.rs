//! Host screen state as one explicit state machine.
//!
//! Each variant carries exactly the data that screen needs, so combinations
//! like "complete without a result" or "editing without an image" cannot be
//! represented.

use crate::error::{Error, Result};
use crate::generation::GenerationRequest;
use crate::style::StockStyle;
use crate::types::ToolMode;
use crate::upload::ImageAsset;
use tracing::info;

pub const GENERATION_FAILED_MSG: &str =
    "Something went wrong while generating the image. Please try again.";

/// Everything the editing screen tracks for one uploaded image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub original: ImageAsset,
    pub style: StockStyle,
    pub prompt: String,
    pub tool: ToolMode,
    pub has_mask: bool,
}

impl Session {
    fn new(original: ImageAsset) -> Self {
        Self {
            original,
            style: StockStyle::default(),
            prompt: String::new(),
            tool: ToolMode::View,
            has_mask: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for an upload.
    #[default]
    Idle,
    Editing(Session),
    Generating(Session),
    Complete { session: Session, generated: String },
    Failed { session: Session, message: String },
}

impl AppState {
    pub fn name(&self) -> &'static str {
        match self {
            AppState::Idle => "idle",
            AppState::Editing(_) => "editing",
            AppState::Generating(_) => "generating",
            AppState::Complete { .. } => "complete",
            AppState::Failed { .. } => "failed",
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AppState::Idle => None,
            AppState::Editing(s) | AppState::Generating(s) => Some(s),
            AppState::Complete { session, .. } | AppState::Failed { session, .. } => Some(session),
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            AppState::Idle => None,
            AppState::Editing(s) | AppState::Generating(s) => Some(s),
            AppState::Complete { session, .. } | AppState::Failed { session, .. } => Some(session),
        }
    }

    /// The editor is shown (and editable) in these states.
    fn editable_session_mut(&mut self) -> Option<&mut Session> {
        match self {
            AppState::Editing(s) | AppState::Failed { session: s, .. } => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct App {
    state: AppState,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    /// A new upload always starts a fresh editing session.
    pub fn image_selected(&mut self, asset: ImageAsset) {
        info!(mime = %asset.mime_type, "image selected");
        self.state = AppState::Editing(Session::new(asset));
    }

    pub fn select_style(&mut self, style: StockStyle) -> Result<()> {
        self.edit("select a style", |s| s.style = style)
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> Result<()> {
        let prompt = prompt.into();
        self.edit("edit the prompt", |s| s.prompt = prompt)
    }

    pub fn set_tool_mode(&mut self, tool: ToolMode) -> Result<()> {
        self.edit("switch tools", |s| s.tool = tool)
    }

    /// Mirror of the editor's mask-presence notification.
    pub fn mask_presence_changed(&mut self, has_mask: bool) {
        if let Some(s) = self.state.session_mut() {
            s.has_mask = has_mask;
        }
    }

    /// Enter `Generating` and build the backend request. The mask is only
    /// attached when the session believes one is painted.
    pub fn begin_generation(&mut self, mask: Option<String>) -> Result<GenerationRequest> {
        let session = match std::mem::take(&mut self.state) {
            AppState::Editing(s) | AppState::Failed { session: s, .. } => s,
            AppState::Complete { session, .. } => session,
            other => return self.reject(other, "generate"),
        };

        let request = GenerationRequest {
            image_base64: session.original.data.clone(),
            mime_type: session.original.mime_type.clone(),
            prompt: session.prompt.clone(),
            style: session.style,
            mask_base64: if session.has_mask { mask } else { None },
        };
        info!(style = %request.style, masked = request.mask_base64.is_some(), "generation started");
        self.state = AppState::Generating(session);
        Ok(request)
    }

    pub fn generation_succeeded(&mut self, generated: String) -> Result<()> {
        match std::mem::take(&mut self.state) {
            AppState::Generating(session) => {
                info!("generation complete");
                self.state = AppState::Complete { session, generated };
                Ok(())
            }
            other => self.reject(other, "finish generating"),
        }
    }

    /// The backend's error detail is logged by the caller; the user only sees
    /// a generic retryable message.
    pub fn generation_failed(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            AppState::Generating(session) => {
                self.state = AppState::Failed { session, message: GENERATION_FAILED_MSG.to_string() };
                Ok(())
            }
            other => self.reject(other, "fail generating"),
        }
    }

    /// Leave the result view; the generated image is dropped.
    pub fn back_to_edit(&mut self) -> Result<()> {
        match std::mem::take(&mut self.state) {
            AppState::Complete { session, .. } => {
                self.state = AppState::Editing(session);
                Ok(())
            }
            other => self.reject(other, "go back to editing"),
        }
    }

    /// Remove the image and return to the upload screen.
    pub fn reset(&mut self) {
        info!("session reset");
        self.state = AppState::Idle;
    }

    fn edit(&mut self, action: &'static str, f: impl FnOnce(&mut Session)) -> Result<()> {
        let state = self.state.name();
        match self.state.editable_session_mut() {
            Some(s) => {
                f(s);
                Ok(())
            }
            None => Err(Error::InvalidTransition { action, state }),
        }
    }

    fn reject<T>(&mut self, previous: AppState, action: &'static str) -> Result<T> {
        let state = previous.name();
        self.state = previous;
        Err(Error::InvalidTransition { action, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> ImageAsset {
        ImageAsset { data: "QUJD".into(), mime_type: "image/png".into() }
    }

    #[test]
    fn upload_starts_fresh_session() {
        let mut app = App::new();
        app.image_selected(asset());
        app.select_style(StockStyle::Cinematic).unwrap();
        app.set_prompt("blur background").unwrap();
        app.set_tool_mode(ToolMode::Erase).unwrap();
        app.mask_presence_changed(true);

        app.image_selected(asset());
        let s = app.session().unwrap();
        assert_eq!(s.style, StockStyle::Standard);
        assert!(s.prompt.is_empty());
        assert_eq!(s.tool, ToolMode::View);
        assert!(!s.has_mask);
    }

    #[test]
    fn happy_path_and_back() {
        let mut app = App::new();
        app.image_selected(asset());
        app.set_prompt("warm sunlight").unwrap();
        app.mask_presence_changed(true);

        let req = app.begin_generation(Some("TUFTSw==".into())).unwrap();
        assert_eq!(req.prompt, "warm sunlight");
        assert_eq!(req.mask_base64.as_deref(), Some("TUFTSw=="));
        assert_eq!(app.state().name(), "generating");

        app.generation_succeeded("R0VO".into()).unwrap();
        assert!(matches!(app.state(), AppState::Complete { generated, .. } if generated == "R0VO"));

        app.back_to_edit().unwrap();
        assert_eq!(app.state().name(), "editing");
    }

    #[test]
    fn mask_is_dropped_when_session_has_none() {
        let mut app = App::new();
        app.image_selected(asset());
        let req = app.begin_generation(Some("stale".into())).unwrap();
        assert_eq!(req.mask_base64, None);
    }

    #[test]
    fn failure_keeps_session_editable_and_retryable() {
        let mut app = App::new();
        app.image_selected(asset());
        app.begin_generation(None).unwrap();
        app.generation_failed().unwrap();
        match app.state() {
            AppState::Failed { message, .. } => assert_eq!(message, GENERATION_FAILED_MSG),
            other => panic!("unexpected {other:?}"),
        }
        app.set_prompt("again").unwrap();
        app.begin_generation(None).unwrap();
        assert_eq!(app.state().name(), "generating");
    }

    #[test]
    fn invalid_transitions_leave_state_untouched() {
        let mut app = App::new();
        assert!(matches!(app.begin_generation(None), Err(Error::InvalidTransition { .. })));
        assert_eq!(app.state(), &AppState::Idle);
        assert!(app.back_to_edit().is_err());
        assert!(app.select_style(StockStyle::Cinematic).is_err());

        app.image_selected(asset());
        app.begin_generation(None).unwrap();
        // Double submit and edits while generating are refused.
        assert!(app.begin_generation(None).is_err());
        assert!(app.set_prompt("x").is_err());
        assert_eq!(app.state().name(), "generating");
        assert!(app.back_to_edit().is_err());
    }

    #[test]
    fn regenerate_from_result() {
        let mut app = App::new();
        app.image_selected(asset());
        app.begin_generation(None).unwrap();
        app.generation_succeeded("R0VO".into()).unwrap();
        app.begin_generation(None).unwrap();
        assert_eq!(app.state().name(), "generating");
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut app = App::new();
        app.image_selected(asset());
        app.reset();
        assert!(app.session().is_none());
    }

    #[test]
    fn generation_outcome_needs_generating_state() {
        let mut app = App::new();
        assert!(matches!(app.generation_failed(), Err(Error::InvalidTransition { .. })));

        app.image_selected(asset());
        let err = app.generation_succeeded("R0VO".into()).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(app.state().name(), "editing");
        assert!(app.generation_failed().is_err());
        assert_eq!(app.state().name(), "editing");
    }
}
