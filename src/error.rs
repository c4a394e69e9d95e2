// Every variant states *where* things went wrong.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError), // Upload bytes are not a usable image

    #[error("Image encode error: {0}")]
    Encode(String), // Flattening the surface to PNG failed

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// User-facing upload rejection; the text is shown as-is.
    #[error("{0}")]
    Upload(String),

    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: &'static str },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        Self::Upload(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn generation<S: Into<String>>(msg: S) -> Self {
        Self::Generation(msg.into())
    }
}
