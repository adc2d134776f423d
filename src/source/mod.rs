mod ffmpeg;
mod probe;

pub use ffmpeg::FfmpegSource;
pub use probe::{probe_video, VideoMeta};

use crate::error::Result;
use image::RgbImage;

/// Trait for replacement frame sources. Sources are finite, ordered and
/// non-restartable; the pipeline owns one exclusively for a run.
pub trait FrameSource {
    /// Decode the next frame, or `None` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Native resolution of decoded frames.
    fn resolution(&self) -> (u32, u32);

    /// Native frame rate of the source.
    fn frame_rate(&self) -> f64;
}
