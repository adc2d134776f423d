//! Diagnostic contour extraction: outlines of keyable regions plus two
//! simplification strategies for visual validation and alternate
//! compositing shapes.

mod simplify;
mod trace;

pub use simplify::{approx_polygon, area, convex_hull, perimeter};

use crate::mask::{self, KeyBand};
use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// Ordered outline of one connected region, outer boundary only.
pub type Contour = Vec<Point<i32>>;

/// Contours below this area are skipped for compositing by default.
pub const DEFAULT_MIN_AREA: f64 = 10_000.0;

/// Douglas-Peucker tolerance as a fraction of the contour perimeter.
const APPROX_EPSILON_RATIO: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simplification {
    /// Smallest convex polygon enclosing the contour. Over-includes
    /// concave regions by construction.
    ConvexHull,
    /// Douglas-Peucker approximation at 2% of the perimeter.
    ApproxPolygon,
}

/// Outer contours of every keyable region in the image.
pub fn find_contours(image: &RgbImage, band: &KeyBand) -> Vec<Contour> {
    find_mask_contours(&mask::build_raw_mask(image, band))
}

/// Outer contours of an already-built binary mask.
pub fn find_mask_contours(mask: &GrayImage) -> Vec<Contour> {
    trace::trace_components(mask)
}

pub fn simplify(contour: &[Point<i32>], method: Simplification) -> Contour {
    match method {
        Simplification::ConvexHull => convex_hull(contour),
        Simplification::ApproxPolygon => {
            approx_polygon(contour, APPROX_EPSILON_RATIO * perimeter(contour))
        }
    }
}

/// Rasterize a simplified polygon back into a binary mask so contour-derived
/// shapes can feed the regular compositor.
pub fn mask_from_polygon(width: u32, height: u32, polygon: &[Point<i32>]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);

    // draw_polygon_mut wants an open ring of at least three vertices
    let ring: &[Point<i32>] = if polygon.len() > 1 && polygon.first() == polygon.last() {
        &polygon[..polygon.len() - 1]
    } else {
        polygon
    };

    if ring.len() < 3 {
        for p in ring {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height {
                mask.put_pixel(p.x as u32, p.y as u32, Luma([255]));
            }
        }
        return mask;
    }

    draw_polygon_mut(&mut mask, ring, Luma([255]));
    mask
}
