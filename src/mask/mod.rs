//! Greenscreen segmentation: HSV thresholding, morphological cleanup and
//! connected-component ranking turn a color image into binary region masks.

mod components;
mod hsv;
mod morphology;

pub use components::{label_components, ComponentMap};
pub use hsv::rgb_to_hsv;

use image::{GrayImage, Luma, RgbImage};

/// Inclusive HSV band that qualifies a pixel as keyable. Hue is on the
/// 0-179 scale, saturation and value on 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBand {
    pub hue: (u8, u8),
    pub saturation: (u8, u8),
    pub value: (u8, u8),
}

impl Default for KeyBand {
    /// The standard greenscreen band: hue 35-85, saturation and value 100-255.
    fn default() -> Self {
        Self {
            hue: (35, 85),
            saturation: (100, 255),
            value: (100, 255),
        }
    }
}

impl KeyBand {
    /// Tighter hue band (40-80) used by the inspection tool to show how
    /// sensitive a detection is to the threshold choice.
    pub fn inspection() -> Self {
        Self {
            hue: (40, 80),
            ..Self::default()
        }
    }

    pub fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        self.hue.0 <= h
            && h <= self.hue.1
            && self.saturation.0 <= s
            && s <= self.saturation.1
            && self.value.0 <= v
            && v <= self.value.1
    }
}

/// Threshold plus morphological cleanup, before component filtering.
/// Closing runs before opening so interior holes are filled rather than
/// being misread as noise and carved out further.
pub fn build_raw_mask(image: &RgbImage, band: &KeyBand) -> GrayImage {
    let mask = threshold(image, band);
    let mask = morphology::close(&mask);
    morphology::open(&mask)
}

/// Detect up to `desired` keyable regions, one binary mask per region,
/// ordered by pixel area descending. Returns fewer masks when the image
/// contains fewer regions; never pads and never errors on a short result.
pub fn build_masks(image: &RgbImage, band: &KeyBand, desired: usize) -> Vec<GrayImage> {
    let cleaned = build_raw_mask(image, band);
    let map = label_components(&cleaned);

    map.labels_by_size()
        .into_iter()
        .take(desired)
        .map(|label| map.extract(label))
        .collect()
}

/// Convenience for the single-region case. The mask is empty when the image
/// contains no keyable region at all.
pub fn build_mask(image: &RgbImage, band: &KeyBand) -> GrayImage {
    build_masks(image, band, 1)
        .into_iter()
        .next()
        .unwrap_or_else(|| GrayImage::new(image.width(), image.height()))
}

fn threshold(image: &RgbImage, band: &KeyBand) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, px) in image.enumerate_pixels() {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        if band.contains(h, s, v) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}
