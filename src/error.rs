use std::path::PathBuf;
use thiserror::Error;

/// Result type for compositing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building masks or running a compositing job
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required inputs: {}", .0.join(", "))]
    MissingInputs(Vec<&'static str>),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to open video source {}: {reason}", .path.display())]
    OpenSource { path: PathBuf, reason: String },

    #[error("degenerate greenscreen region: bounding box is {width}x{height}")]
    Geometry { width: u32, height: u32 },

    #[error("video sink error: {0}")]
    Sink(String),

    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
