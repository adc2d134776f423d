//! Binary morphology with a square structuring element.
//!
//! Pixels outside the image neither constrain erosion nor contribute to
//! dilation, so regions touching the border are preserved.

use image::{GrayImage, Luma};

/// Radius of the 5x5 structuring element used for mask cleanup.
const RADIUS: i64 = 2;

/// Closing: dilate then erode. Fills internal holes smaller than the kernel.
pub fn close(mask: &GrayImage) -> GrayImage {
    erode(&dilate(mask))
}

/// Opening: erode then dilate. Removes isolated specks smaller than the kernel.
pub fn open(mask: &GrayImage) -> GrayImage {
    dilate(&erode(mask))
}

pub fn dilate(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if window_contains(mask, x, y, 255) {
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }
    out
}

pub fn erode(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if !window_contains(mask, x, y, 0) {
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }
    out
}

/// True if any in-bounds pixel of the kernel window centered at (x, y)
/// has the given value.
fn window_contains(mask: &GrayImage, x: u32, y: u32, value: u8) -> bool {
    let (width, height) = mask.dimensions();
    for dy in -RADIUS..=RADIUS {
        for dx in -RADIUS..=RADIUS {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            if mask.get_pixel(nx as u32, ny as u32)[0] == value {
                return true;
            }
        }
    }
    false
}
