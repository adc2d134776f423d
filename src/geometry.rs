//! Bounding-box derivation for binary masks.

use image::GrayImage;

/// Axis-aligned rectangle in image coordinates. Always lies fully inside
/// the image it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Tightest rectangle enclosing every active (255) pixel of the mask,
/// or `None` for an empty mask. Callers must treat `None` as a fatal
/// precondition failure before any resize against the box.
pub fn bounding_box(mask: &GrayImage) -> Option<Rect> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, px) in mask.enumerate_pixels() {
        if px[0] == 255 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return None;
    }

    Some(Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn empty_mask_has_no_box() {
        assert_eq!(bounding_box(&GrayImage::new(10, 10)), None);
    }

    #[test]
    fn single_pixel_box() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(4, 7, Luma([255]));

        let rect = bounding_box(&mask).unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 4,
                y: 7,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn box_is_tight_around_scattered_pixels() {
        let mut mask = GrayImage::new(50, 50);
        mask.put_pixel(10, 12, Luma([255]));
        mask.put_pixel(30, 12, Luma([255]));
        mask.put_pixel(20, 40, Luma([255]));

        let rect = bounding_box(&mask).unwrap();
        assert_eq!(rect.x, 10);
        assert_eq!(rect.y, 12);
        assert_eq!(rect.width, 21);
        assert_eq!(rect.height, 29);

        // Every active pixel lies inside the box
        for (x, y, px) in mask.enumerate_pixels() {
            if px[0] == 255 {
                assert!(x >= rect.x && x < rect.x + rect.width);
                assert!(y >= rect.y && y < rect.y + rect.height);
            }
        }
    }

    #[test]
    fn full_mask_spans_the_image() {
        let mask = GrayImage::from_pixel(8, 6, Luma([255]));
        let rect = bounding_box(&mask).unwrap();
        assert_eq!((rect.width, rect.height), (8, 6));
        assert_eq!((rect.x, rect.y), (0, 0));
    }
}
