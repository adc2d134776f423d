//! Per-frame alpha compositing of a replacement frame into the masked
//! region of a base image.

use crate::geometry::Rect;
use image::{imageops, GrayImage, RgbImage};

/// Composite `replacement` into `base` where `mask` is active, scoped to
/// `region`. Returns a new image; `base` is never touched. Pixels outside
/// `region` are copied from `base` unchanged.
pub fn composite(
    base: &RgbImage,
    mask: &GrayImage,
    region: Rect,
    replacement: &RgbImage,
) -> RgbImage {
    let mut canvas = base.clone();
    composite_into(&mut canvas, mask, region, replacement);
    canvas
}

/// In-place variant used by the video pipeline, which layers several
/// regions onto one working copy of the base image.
///
/// The replacement is resized to the region with an averaging filter, then
/// blended per channel with normalized mask weights. Masks stay binary, so
/// the blend is a hard cut rather than a feather.
pub fn composite_into(
    canvas: &mut RgbImage,
    mask: &GrayImage,
    region: Rect,
    replacement: &RgbImage,
) {
    let resized = imageops::resize(
        replacement,
        region.width,
        region.height,
        imageops::FilterType::Triangle,
    );

    for dy in 0..region.height {
        for dx in 0..region.width {
            let x = region.x + dx;
            let y = region.y + dy;

            let weight = mask.get_pixel(x, y)[0] as f32 / 255.0;
            if weight == 0.0 {
                continue;
            }

            let top = resized.get_pixel(dx, dy);
            let px = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended = top[c] as f32 * weight + px[c] as f32 * (1.0 - weight);
                px[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
