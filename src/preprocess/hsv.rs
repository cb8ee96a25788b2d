//! HSV colour range masking (OpenCV 8-bit convention: H 0..180, S and V 0..255)

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::Deserialize;

/// Inclusive HSV bounds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.lower[i] && hsv[i] <= self.upper[i])
    }

    /// 255 where the pixel falls inside the range, 0 elsewhere
    pub fn mask(&self, image: &RgbImage) -> GrayImage {
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let inside = self.contains(rgb_to_hsv(*image.get_pixel(x, y)));
            Luma([if inside { 255 } else { 0 }])
        })
    }
}

/// Convert one RGB pixel to 8-bit HSV
pub fn rgb_to_hsv(Rgb([r, g, b]): Rgb<u8>) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [(h / 2.0).round() as u8 % 180, s.round() as u8, max as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colours() {
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([255, 255, 0])), [30, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([128, 128, 128])), [0, 0, 128]);
    }

    #[test]
    fn test_yellow_mask() {
        let yellow = HsvRange::new([20, 100, 100], [40, 255, 255]);
        let mut image = RgbImage::from_pixel(4, 1, Rgb([0, 0, 255]));
        image.put_pixel(1, 0, Rgb([250, 220, 30]));
        image.put_pixel(2, 0, Rgb([90, 90, 20]));

        let mask = yellow.mask(&image);
        let values: Vec<u8> = mask.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 255, 0, 0]);
    }
}
