// Recognizer capability and its output types
use crate::error::CaptchaResult;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in text-view pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (u32, u32) {
        (
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        // Regions come from user config and may reach past u32::MAX
        x >= self.x
            && x < self.x.saturating_add(self.width)
            && y >= self.y
            && y < self.y.saturating_add(self.height)
    }
}

/// One OCR hypothesis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedText {
    pub text: String,
    /// 0.0 to 1.0
    pub confidence: f32,
    pub bbox: Rect,
}

impl RecognizedText {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox,
        }
    }
}

/// External text recognizer, loaded once and shared across frames
pub trait TextRecognizer: Send + Sync {
    /// Returns zero or more hypotheses in no particular order
    fn recognize(&self, image: &RgbImage) -> CaptchaResult<Vec<RecognizedText>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(10, 20, 30, 5);
        assert_eq!(rect.center(), (25, 22));
        assert!(rect.contains_point(10, 20));
        assert!(!rect.contains_point(40, 22));
        assert!(!rect.contains_point(12, 25));
    }

    #[test]
    fn test_rect_near_u32_max_does_not_overflow() {
        let rect = Rect::new(u32::MAX - 5, u32::MAX - 5, 100, u32::MAX);
        assert!(rect.contains_point(u32::MAX - 1, u32::MAX - 2));
        assert!(!rect.contains_point(3, 3));
        assert_eq!(rect.center(), (u32::MAX, u32::MAX));
    }
}
