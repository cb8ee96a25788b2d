/// Template matching data types
use image::GrayImage;
use serde::Serialize;

/// A single detected template instance in frame coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Match {
    /// Center X coordinate
    pub x: i32,
    /// Center Y coordinate
    pub y: i32,
    /// Half the scaled template width
    pub radius: i32,
    /// Normalized correlation score (-1.0 to 1.0)
    pub score: f32,
    /// Scale factor that produced this match
    pub scale: f32,
}

impl Match {
    pub fn new(x: i32, y: i32, radius: i32, score: f32, scale: f32) -> Self {
        Self {
            x,
            y,
            radius,
            score,
            scale,
        }
    }

    /// Euclidean distance between two match centers
    pub fn distance_to(&self, other: &Match) -> f64 {
        center_distance((self.x, self.y), (other.x, other.y))
    }

    /// Shift a match found inside a crop back into full-frame coordinates
    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Euclidean distance between two integer points
pub fn center_distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// A named grayscale pattern, optionally restricted to a validity mask
#[derive(Clone, Debug)]
pub struct Template {
    /// Template name (e.g. "captcha_template", "arcanine")
    pub name: String,
    /// Grayscale pixels
    pub pixels: GrayImage,
    /// Pixels with a non-zero mask value take part in the correlation
    pub mask: Option<GrayImage>,
}

impl Template {
    pub fn new(name: impl Into<String>, pixels: GrayImage) -> Self {
        Self {
            name: name.into(),
            pixels,
            mask: None,
        }
    }

    /// Attach a validity mask. A mask whose size differs from the pixels makes
    /// the template unusable: the matcher skips it and asset loading rejects it.
    pub fn with_mask(mut self, mask: GrayImage) -> Self {
        self.mask = Some(mask);
        self
    }

    /// True when there is no mask or it covers the pixels exactly
    pub fn mask_matches_pixels(&self) -> bool {
        self.mask
            .as_ref()
            .is_none_or(|m| m.dimensions() == self.pixels.dimensions())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Number of pixels that take part in the correlation
    pub fn valid_pixel_count(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.pixels().filter(|p| p[0] > 0).count(),
            None => (self.width() * self.height()) as usize,
        }
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{}) r={} score={:.3} scale={:.2}",
            self.x, self.y, self.radius, self.score, self.scale
        )
    }
}
