//! Orchestration: detect regions, open sources and sink, then composite
//! frame-synchronously until the shortest source runs out.

use crate::compositor;
use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::geometry::{self, Rect};
use crate::mask::{self, KeyBand};
use crate::sink::{FfmpegSink, FrameSink};
use crate::source::{FfmpegSource, FrameSource};
use image::{GrayImage, RgbImage};
use std::path::Path;

/// Output frame rate when several sources are composited at once. A
/// single-source run inherits the source's native rate instead.
pub const MULTI_SOURCE_FPS: f64 = 30.0;

/// One detected greenscreen region: its binary mask and tight bounding box.
pub struct Region {
    pub mask: GrayImage,
    pub bounds: Rect,
}

/// Detect up to `count` keyable regions, largest first, with bounding
/// boxes already derived and guaranteed non-degenerate.
pub fn detect_regions(base: &RgbImage, band: &KeyBand, count: usize) -> Result<Vec<Region>> {
    mask::build_masks(base, band, count)
        .into_iter()
        .map(|mask| {
            let bounds = geometry::bounding_box(&mask).ok_or(Error::Geometry {
                width: 0,
                height: 0,
            })?;
            tracing::info!(
                "Greenscreen region {}x{} px at ({}, {})",
                bounds.width,
                bounds.height,
                bounds.x,
                bounds.y
            );
            Ok(Region { mask, bounds })
        })
        .collect()
}

/// Read one frame from every source per iteration, in list order, and stop
/// the moment any source is exhausted; frames already read for that
/// iteration are discarded. Each surviving iteration composites every
/// (region, frame) pair in list order onto a fresh copy of the base image.
/// Returns the number of frames written, which equals the shortest source.
pub fn run_lockstep<K>(
    base: &RgbImage,
    regions: &[Region],
    sources: &mut [Box<dyn FrameSource>],
    sink: &mut K,
) -> Result<u64>
where
    K: FrameSink + ?Sized,
{
    if regions.len() != sources.len() {
        return Err(Error::Config(format!(
            "{} detected region(s) but {} replacement source(s)",
            regions.len(),
            sources.len()
        )));
    }

    let mut written = 0u64;
    'frames: loop {
        let mut frames = Vec::with_capacity(sources.len());
        for source in sources.iter_mut() {
            match source.read_frame()? {
                Some(frame) => frames.push(frame),
                None => break 'frames,
            }
        }

        let mut canvas = base.clone();
        for (region, frame) in regions.iter().zip(&frames) {
            compositor::composite_into(&mut canvas, &region.mask, region.bounds, frame);
        }
        sink.write_frame(&canvas)?;
        written += 1;

        if written % 30 == 0 {
            tracing::debug!("{} frames composited", written);
        }
    }

    sink.finish()?;
    Ok(written)
}

/// Full video job: detect one region per replacement video in the base
/// image and write the composited video described by `config`.
///
/// Every failure is raised before frame processing starts: missing paths,
/// an undecodable base image, a region/source count mismatch and sources
/// that will not open all abort the run with nothing written.
pub fn replace_with_videos(config: &JobConfig, band: &KeyBand) -> Result<u64> {
    config.validate()?;
    let base = load_image(&config.base_image)?;

    let regions = detect_regions(&base, band, config.replacements.len())?;
    if regions.len() != config.replacements.len() {
        return Err(Error::Config(format!(
            "found {} greenscreen region(s) for {} replacement video(s)",
            regions.len(),
            config.replacements.len()
        )));
    }

    let mut sources: Vec<Box<dyn FrameSource>> = Vec::with_capacity(config.replacements.len());
    for path in &config.replacements {
        sources.push(Box::new(FfmpegSource::open(path)?));
    }

    let fps = if sources.len() == 1 {
        sources[0].frame_rate()
    } else {
        MULTI_SOURCE_FPS
    };
    let (width, height) = base.dimensions();
    let mut sink = FfmpegSink::open(&config.output, width, height, fps)?;

    let written = run_lockstep(&base, &regions, &mut sources, &mut sink)?;
    tracing::info!("Wrote {} frames to {}", written, config.output.display());
    Ok(written)
}

/// Still-image job: replace the largest greenscreen region of the base
/// image with a background image and save the result.
pub fn replace_with_image(config: &JobConfig, band: &KeyBand) -> Result<()> {
    if config.replacements.len() != 1 {
        return Err(Error::Config(format!(
            "still-image compositing takes exactly one background image, got {}",
            config.replacements.len()
        )));
    }

    config.validate()?;
    let base = load_image(&config.base_image)?;
    let background = load_image(&config.replacements[0])?;

    let region = detect_regions(&base, band, 1)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Config("no greenscreen region detected".to_string()))?;

    let result = compositor::composite(&base, &region.mask, region.bounds, &background);
    result
        .save(&config.output)
        .map_err(|e| Error::Sink(format!("failed to save {}: {e}", config.output.display())))?;

    tracing::info!("Wrote composited image to {}", config.output.display());
    Ok(())
}

/// Load a raster image as RGB, with existence checked first so the error
/// distinguishes a missing file from a corrupt one.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};
    use std::collections::VecDeque;

    const BASE: Rgb<u8> = Rgb([50, 60, 70]);

    /// In-memory source yielding a fixed frame list.
    struct VecSource {
        frames: VecDeque<RgbImage>,
        fps: f64,
    }

    impl VecSource {
        fn solid(color: Rgb<u8>, count: usize) -> Self {
            Self {
                frames: (0..count)
                    .map(|_| RgbImage::from_pixel(16, 16, color))
                    .collect(),
                fps: 30.0,
            }
        }
    }

    impl FrameSource for VecSource {
        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            Ok(self.frames.pop_front())
        }

        fn resolution(&self) -> (u32, u32) {
            (16, 16)
        }

        fn frame_rate(&self) -> f64 {
            self.fps
        }
    }

    /// In-memory sink collecting every written frame.
    #[derive(Default)]
    struct VecSink {
        frames: Vec<RgbImage>,
        finished: bool,
    }

    impl FrameSink for VecSink {
        fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }

        fn resolution(&self) -> (u32, u32) {
            (200, 150)
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn rect_region(image_w: u32, image_h: u32, bounds: Rect) -> Region {
        let mut mask = GrayImage::new(image_w, image_h);
        for y in bounds.y..bounds.y + bounds.height {
            for x in bounds.x..bounds.x + bounds.width {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        Region { mask, bounds }
    }

    #[test]
    fn output_length_is_the_shortest_source() {
        let base = RgbImage::from_pixel(200, 150, BASE);
        let regions = vec![
            rect_region(
                200,
                150,
                Rect {
                    x: 10,
                    y: 10,
                    width: 40,
                    height: 30,
                },
            ),
            rect_region(
                200,
                150,
                Rect {
                    x: 100,
                    y: 60,
                    width: 50,
                    height: 40,
                },
            ),
        ];
        let mut sources: Vec<Box<dyn FrameSource>> = vec![
            Box::new(VecSource::solid(Rgb([255, 0, 0]), 5)),
            Box::new(VecSource::solid(Rgb([0, 0, 255]), 8)),
        ];
        let mut sink = VecSink::default();

        let written = run_lockstep(&base, &regions, &mut sources, &mut sink).unwrap();

        assert_eq!(written, 5);
        assert_eq!(sink.frames.len(), 5);
        assert!(sink.finished);

        // Every frame carries both composites and untouched base elsewhere
        for frame in &sink.frames {
            assert_eq!(frame.dimensions(), (200, 150));
            assert_eq!(*frame.get_pixel(20, 20), Rgb([255, 0, 0]));
            assert_eq!(*frame.get_pixel(120, 80), Rgb([0, 0, 255]));
            assert_eq!(*frame.get_pixel(180, 10), BASE);
        }
    }

    #[test]
    fn empty_source_still_finalizes_the_sink() {
        let base = RgbImage::from_pixel(200, 150, BASE);
        let regions = vec![rect_region(
            200,
            150,
            Rect {
                x: 10,
                y: 10,
                width: 40,
                height: 30,
            },
        )];
        let mut sources: Vec<Box<dyn FrameSource>> =
            vec![Box::new(VecSource::solid(Rgb([255, 0, 0]), 0))];
        let mut sink = VecSink::default();

        let written = run_lockstep(&base, &regions, &mut sources, &mut sink).unwrap();

        assert_eq!(written, 0);
        assert!(sink.frames.is_empty());
        assert!(sink.finished);
    }

    #[test]
    fn count_mismatch_fails_before_any_frame_is_touched() {
        let base = RgbImage::from_pixel(200, 150, BASE);
        let regions = vec![
            rect_region(
                200,
                150,
                Rect {
                    x: 10,
                    y: 10,
                    width: 40,
                    height: 30,
                },
            ),
            rect_region(
                200,
                150,
                Rect {
                    x: 100,
                    y: 60,
                    width: 50,
                    height: 40,
                },
            ),
        ];
        let mut sources: Vec<Box<dyn FrameSource>> =
            vec![Box::new(VecSource::solid(Rgb([255, 0, 0]), 5))];
        let mut sink = VecSink::default();

        let err = run_lockstep(&base, &regions, &mut sources, &mut sink).unwrap_err();

        assert!(matches!(err, Error::Config(_)));
        assert!(sink.frames.is_empty());
        assert!(!sink.finished);
    }

    #[test]
    fn later_regions_overwrite_earlier_ones_where_they_overlap() {
        let base = RgbImage::from_pixel(100, 100, BASE);
        let overlap = Rect {
            x: 20,
            y: 20,
            width: 30,
            height: 30,
        };
        let regions = vec![
            rect_region(100, 100, overlap),
            rect_region(100, 100, overlap),
        ];
        let mut sources: Vec<Box<dyn FrameSource>> = vec![
            Box::new(VecSource::solid(Rgb([255, 0, 0]), 1)),
            Box::new(VecSource::solid(Rgb([0, 0, 255]), 1)),
        ];
        let mut sink = VecSink::default();

        run_lockstep(&base, &regions, &mut sources, &mut sink).unwrap();

        // List order is composite order, so the second source wins
        assert_eq!(*sink.frames[0].get_pixel(30, 30), Rgb([0, 0, 255]));
    }

    #[test]
    fn region_shortfall_aborts_before_opening_sources() {
        // A base image with one green region but two replacement paths must
        // fail with a configuration error and leave no output file behind.
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().join("base.png");
        let output_path = dir.path().join("out.mp4");

        let mut base = RgbImage::from_pixel(80, 60, BASE);
        for y in 10..40 {
            for x in 10..50 {
                base.put_pixel(x, y, Rgb([0, 255, 0]));
            }
        }
        base.save(&base_path).unwrap();

        // The replacement paths only need to exist; they are never opened.
        let clip_a = dir.path().join("a.mp4");
        let clip_b = dir.path().join("b.mp4");
        std::fs::write(&clip_a, b"").unwrap();
        std::fs::write(&clip_b, b"").unwrap();

        let config = JobConfig::builder()
            .base_image(&base_path)
            .replacement(&clip_a)
            .replacement(&clip_b)
            .output(&output_path)
            .build()
            .unwrap();

        let err = replace_with_videos(&config, &KeyBand::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!output_path.exists());
    }

    #[test]
    fn missing_replacement_path_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().join("base.png");
        RgbImage::from_pixel(10, 10, BASE).save(&base_path).unwrap();

        let config = JobConfig::builder()
            .base_image(&base_path)
            .replacement(dir.path().join("nope.mp4"))
            .output(dir.path().join("out.mp4"))
            .build()
            .unwrap();

        let err = replace_with_videos(&config, &KeyBand::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn still_image_job_composites_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().join("base.png");
        let bg_path = dir.path().join("bg.png");
        let output_path = dir.path().join("result.png");

        let mut base = RgbImage::from_pixel(120, 90, BASE);
        for y in 20..60 {
            for x in 30..90 {
                base.put_pixel(x, y, Rgb([0, 255, 0]));
            }
        }
        base.save(&base_path).unwrap();
        RgbImage::from_pixel(32, 32, Rgb([200, 10, 10]))
            .save(&bg_path)
            .unwrap();

        let config = JobConfig::builder()
            .base_image(&base_path)
            .replacement(&bg_path)
            .output(&output_path)
            .build()
            .unwrap();

        replace_with_image(&config, &KeyBand::default()).unwrap();

        let result = image::open(&output_path).unwrap().to_rgb8();
        assert_eq!(result.dimensions(), (120, 90));
        assert_eq!(*result.get_pixel(60, 40), Rgb([200, 10, 10]));
        assert_eq!(*result.get_pixel(5, 5), BASE);
    }
}
