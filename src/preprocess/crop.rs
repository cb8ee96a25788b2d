//! Region-of-interest cropping

use image::{GenericImageView, RgbImage};
use serde::Deserialize;

/// Window of `scale` times the frame size centred at `(w / cx_div, h / cy_div)`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CenteredCrop {
    pub scale: f32,
    pub cx_div: f32,
    pub cy_div: f32,
}

impl Default for CenteredCrop {
    /// The challenge overlay sits left of centre in the upper quarter
    fn default() -> Self {
        Self {
            scale: 0.4,
            cx_div: 2.4,
            cy_div: 4.0,
        }
    }
}

impl CenteredCrop {
    /// Crop bounds `(x, y, width, height)` clamped to a `width` x `height` frame
    pub fn bounds(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (w, h) = (width as f32, height as f32);
        let (cx, cy) = (w / self.cx_div, h / self.cy_div);
        let (half_w, half_h) = (w * self.scale / 2.0, h * self.scale / 2.0);

        let left = (cx - half_w).clamp(0.0, w).round() as u32;
        let right = (cx + half_w).clamp(0.0, w).round() as u32;
        let top = (cy - half_h).clamp(0.0, h).round() as u32;
        let bottom = (cy + half_h).clamp(0.0, h).round() as u32;
        (left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }

    /// Cropped copy of `frame` and its top-left corner in frame coordinates
    pub fn apply(&self, frame: &RgbImage) -> (RgbImage, (u32, u32)) {
        let (x, y, width, height) = self.bounds(frame.width(), frame.height());
        (frame.view(x, y, width, height).to_image(), (x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_crop_on_full_hd() {
        // centre (800, 270), window 768x432
        let bounds = CenteredCrop::default().bounds(1920, 1080);
        assert_eq!(bounds, (416, 54, 768, 432));
    }

    #[test]
    fn test_crop_is_clamped() {
        let crop = CenteredCrop {
            scale: 1.0,
            cx_div: 4.0,
            cy_div: 4.0,
        };
        let (x, y, w, h) = crop.bounds(100, 80);
        assert_eq!((x, y), (0, 0));
        assert_eq!((w, h), (75, 60));

        let (image, origin) = crop.apply(&RgbImage::new(100, 80));
        assert_eq!(origin, (0, 0));
        assert_eq!(image.dimensions(), (75, 60));
    }
}
