//! Video metadata via ffprobe's JSON output.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Metadata of the first video stream of a file.
#[derive(Debug, Clone, Copy)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

/// Query width, height and frame rate of the first video stream.
pub fn probe_video(path: &Path) -> Result<VideoMeta> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let ffprobe = which::which("ffprobe").map_err(|_| Error::FfprobeNotFound)?;

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,avg_frame_rate,r_frame_rate",
            "-of",
            "json",
        ])
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(Error::OpenSource {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        reason: format!("unreadable ffprobe output: {e}"),
    })?;

    parse_meta(parsed).ok_or_else(|| Error::Decode {
        path: path.to_path_buf(),
        reason: "no decodable video stream".to_string(),
    })
}

fn parse_meta(parsed: ProbeOutput) -> Option<VideoMeta> {
    let stream = parsed.streams.into_iter().next()?;
    let width = stream.width.filter(|&w| w > 0)?;
    let height = stream.height.filter(|&h| h > 0)?;

    // avg_frame_rate can be "0/0" for some containers; fall back to
    // r_frame_rate in that case.
    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))?;

    Some(VideoMeta { width, height, fps })
}

/// Parse ffprobe's rational frame rate ("30000/1001", "25/1").
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_rates() {
        assert_eq!(parse_rate("25/1"), Some(25.0));
        let ntsc = parse_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_rate("0/0"), None);
        assert_eq!(parse_rate("garbage"), None);
    }

    #[test]
    fn parses_ffprobe_json() {
        let json = r#"{
            "streams": [
                {"width": 1280, "height": 720, "avg_frame_rate": "30/1", "r_frame_rate": "30/1"}
            ]
        }"#;
        let parsed: ProbeOutput = serde_json::from_str(json).unwrap();
        let meta = parse_meta(parsed).unwrap();
        assert_eq!((meta.width, meta.height), (1280, 720));
        assert_eq!(meta.fps, 30.0);
    }

    #[test]
    fn falls_back_to_r_frame_rate() {
        let json = r#"{
            "streams": [
                {"width": 640, "height": 480, "avg_frame_rate": "0/0", "r_frame_rate": "24/1"}
            ]
        }"#;
        let parsed: ProbeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parse_meta(parsed).unwrap().fps, 24.0);
    }

    #[test]
    fn stream_without_dimensions_is_rejected() {
        let json = r#"{"streams": [{"avg_frame_rate": "30/1"}]}"#;
        let parsed: ProbeOutput = serde_json::from_str(json).unwrap();
        assert!(parse_meta(parsed).is_none());
    }
}
