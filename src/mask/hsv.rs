//! RGB to HSV conversion on the 8-bit scale common to vision tooling:
//! hue 0-179 (degrees halved), saturation and value 0-255.

/// Convert one 8-bit RGB pixel to (hue, saturation, value).
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let value = max;
    let saturation = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let hue_degrees = if hue_degrees < 0.0 {
        hue_degrees + 360.0
    } else {
        hue_degrees
    };

    (
        (hue_degrees / 2.0).round().min(179.0) as u8,
        saturation.round() as u8,
        value as u8,
    )
}
