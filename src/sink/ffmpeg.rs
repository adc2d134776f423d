use super::FrameSink;
use crate::error::{Error, Result};
use image::RgbImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// MP4 sink backed by an ffmpeg child process. Raw RGB24 frames go in over
/// a pipe; ffmpeg encodes them with the mpeg4 codec (the widely supported
/// `mp4v` tag the original tooling used).
pub struct FfmpegSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    width: u32,
    height: u32,
    path: PathBuf,
}

impl FfmpegSink {
    pub fn open<P: AsRef<Path>>(path: P, width: u32, height: u32, fps: f64) -> Result<Self> {
        let path = path.as_ref();
        let ffmpeg = which::which("ffmpeg").map_err(|_| Error::FfmpegNotFound)?;

        tracing::info!(
            "Opening video sink {} ({}x{} @ {:.2} fps)",
            path.display(),
            width,
            height,
            fps
        );

        let mut child = Command::new(ffmpeg)
            .args(["-y", "-v", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(format!("{fps}"))
            .args(["-i", "pipe:0"])
            .args(["-an", "-c:v", "mpeg4", "-q:v", "5", "-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Sink(format!("failed to start encoder: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Sink("encoder accepted no input pipe".to_string()))?;

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            width,
            height,
            path: path.to_path_buf(),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(Error::Sink(format!(
                "frame is {}x{} but sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Sink("sink already finalized".to_string()))?;
        stdin.write_all(frame.as_raw())?;
        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn finish(&mut self) -> Result<()> {
        // Closing stdin tells the encoder to flush and write the trailer.
        self.stdin.take();
        let Some(child) = self.child.take() else {
            return Ok(());
        };

        let output = child.wait_with_output()?;
        if output.status.success() {
            tracing::info!("Finalized video sink {}", self.path.display());
            Ok(())
        } else {
            Err(Error::Sink(format!(
                "encoder exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // A sink abandoned mid-run (error paths) still releases the encoder;
        // the partial file's content is discardable by contract.
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
