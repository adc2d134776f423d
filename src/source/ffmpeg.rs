use super::probe::{probe_video, VideoMeta};
use super::FrameSource;
use crate::error::{Error, Result};
use image::RgbImage;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Frame source backed by an ffmpeg child process streaming raw RGB24
/// frames over a pipe. Audio streams are never decoded.
pub struct FfmpegSource {
    child: Child,
    stdout: ChildStdout,
    meta: VideoMeta,
    path: PathBuf,
    frame_len: usize,
}

impl FfmpegSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let meta = probe_video(path)?;
        let ffmpeg = which::which("ffmpeg").map_err(|_| Error::FfmpegNotFound)?;

        tracing::info!(
            "Opening video source {} ({}x{} @ {:.2} fps)",
            path.display(),
            meta.width,
            meta.height,
            meta.fps
        );

        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::OpenSource {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| Error::OpenSource {
            path: path.to_path_buf(),
            reason: "decoder produced no output pipe".to_string(),
        })?;

        Ok(Self {
            child,
            stdout,
            frame_len: meta.width as usize * meta.height as usize * 3,
            meta,
            path: path.to_path_buf(),
        })
    }

}

impl FrameSource for FfmpegSource {
    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut buf = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {
                let frame = RgbImage::from_raw(self.meta.width, self.meta.height, buf)
                    .ok_or_else(|| Error::Decode {
                        path: self.path.clone(),
                        reason: "frame buffer size mismatch".to_string(),
                    })?;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.meta.width, self.meta.height)
    }

    fn frame_rate(&self) -> f64 {
        self.meta.fps
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        // The decoder may still be running when a run stops early; reap it
        // so no child process or pipe handle leaks.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
