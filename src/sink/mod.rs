mod ffmpeg;

pub use ffmpeg::FfmpegSink;

use crate::error::Result;
use image::RgbImage;

/// Trait for composited-frame destinations.
pub trait FrameSink {
    /// Append one frame to the output.
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Frame size the sink was opened with.
    fn resolution(&self) -> (u32, u32);

    /// Flush buffered frames and finalize the container. A sink that wrote
    /// zero frames still finalizes to a valid (empty) output.
    fn finish(&mut self) -> Result<()>;
}
