//! Batch visual check of greenscreen detection. The first image of a folder
//! serves as the background; every other image gets its detected regions
//! outlined and composited so the detection quality can be reviewed by eye.

use crate::compositor;
use crate::config::is_image_file;
use crate::contour::{self, Contour, Simplification};
use crate::error::{Error, Result};
use crate::geometry;
use crate::mask::KeyBand;
use crate::pipeline;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::fs;
use std::path::{Path, PathBuf};

const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const HULL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const APPROX_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

/// Process every image in `input_dir`, writing annotated and composited
/// results into `output_dir`. Images that fail to load are skipped with a
/// warning rather than aborting the batch.
pub fn run(input_dir: &Path, output_dir: &Path, min_area: f64) -> Result<()> {
    let images = list_images(input_dir)?;
    if images.len() < 2 {
        return Err(Error::Config(format!(
            "{} must contain at least two images (background plus subjects)",
            input_dir.display()
        )));
    }

    let background = pipeline::load_image(&images[0])?;
    tracing::info!("Background: {}", images[0].display());
    fs::create_dir_all(output_dir)?;

    for path in &images[1..] {
        if let Err(e) = analyze_image(path, &background, output_dir, min_area) {
            tracing::warn!("Skipping {}: {e}", path.display());
        }
    }
    Ok(())
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    // Deterministic order regardless of directory iteration
    files.sort();
    Ok(files)
}

fn analyze_image(
    path: &Path,
    background: &RgbImage,
    output_dir: &Path,
    min_area: f64,
) -> Result<()> {
    let image = pipeline::load_image(path)?;
    let contours = contour::find_contours(&image, &KeyBand::inspection());

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let (width, height) = image.dimensions();
    let mut annotated = image.clone();

    for c in &contours {
        if contour::area(c) <= min_area {
            continue;
        }
        tracing::debug!("Contour of {} points, area {:.0}", c.len(), contour::area(c));

        let hull = contour::simplify(c, Simplification::ConvexHull);
        let approx = contour::simplify(c, Simplification::ApproxPolygon);

        draw_outline(&mut annotated, c, CONTOUR_COLOR);
        draw_outline(&mut annotated, &hull, HULL_COLOR);
        draw_outline(&mut annotated, &approx, APPROX_COLOR);

        for (polygon, tag) in [(&hull, "convex_hull"), (&approx, "approx")] {
            let region_mask = contour::mask_from_polygon(width, height, polygon);
            let Some(bounds) = geometry::bounding_box(&region_mask) else {
                continue;
            };
            let composited = compositor::composite(&annotated, &region_mask, bounds, background);
            save_result(&composited, &output_dir.join(format!("result_{tag}_{name}")))?;
        }
    }

    save_result(&annotated, &output_dir.join(format!("result_{name}")))
}

fn save_result(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| Error::Sink(format!("failed to save {}: {e}", path.display())))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn draw_outline(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>) {
    if contour.len() < 2 {
        return;
    }
    for i in 0..contour.len() {
        let a = contour[i];
        let b = contour[(i + 1) % contour.len()];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}
