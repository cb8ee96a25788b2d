//! Frame filters that isolate the regions the matchers and the recognizer look at.
//!
//! The session only depends on [`FramePreprocessor`]; the yellow-text filter
//! mirrors the overlay the game draws for its captcha (yellow lettering with
//! a darker outline in the upper part of the screen).

pub mod crop;
pub mod hsv;

pub use crop::CenteredCrop;
pub use hsv::{HsvRange, rgb_to_hsv};

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::{close, dilate, open};
use imageproc::region_labelling::{Connectivity, connected_components};

/// A single-channel raster cut out of a frame
#[derive(Debug, Clone)]
pub struct Roi {
    pub image: GrayImage,
    /// Top-left corner of the raster in frame coordinates
    pub origin: (u32, u32),
}

impl Roi {
    pub fn full_frame(frame: &RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(frame.clone()).to_luma8(),
            origin: (0, 0),
        }
    }
}

/// Isolates regions of interest before detection
pub trait FramePreprocessor: Send + Sync {
    /// Raster searched for the challenge banner
    fn banner_view(&self, frame: &RgbImage) -> Roi;

    /// Colour raster handed to the text recognizer
    fn text_view(&self, frame: &RgbImage) -> RgbImage;

    /// Raster searched for the creature icon and the selectable markers
    fn marker_view(&self, frame: &RgbImage) -> Roi {
        Roi::full_frame(frame)
    }
}

/// No filtering: full-frame luma for matching, the frame itself for OCR
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughPreprocessor;

impl FramePreprocessor for PassthroughPreprocessor {
    fn banner_view(&self, frame: &RgbImage) -> Roi {
        Roi::full_frame(frame)
    }

    fn text_view(&self, frame: &RgbImage) -> RgbImage {
        frame.clone()
    }
}

/// Keeps only yellow overlay text inside the challenge crop
#[derive(Debug, Clone)]
pub struct YellowTextPreprocessor {
    pub crop: CenteredCrop,
    /// Banner lettering
    pub banner_range: HsvRange,
    /// Bright, saturated core of the name text
    pub text_range: HsvRange,
    /// Permissive range that also catches the text outline
    pub outline_range: HsvRange,
    /// Connected components smaller than this are dropped from the text mask
    pub min_component_area: u32,
}

impl Default for YellowTextPreprocessor {
    fn default() -> Self {
        Self {
            crop: CenteredCrop::default(),
            banner_range: HsvRange::new([20, 100, 100], [40, 255, 255]),
            text_range: HsvRange::new([20, 150, 180], [35, 255, 255]),
            outline_range: HsvRange::new([20, 100, 100], [35, 255, 255]),
            min_component_area: 50,
        }
    }
}

impl YellowTextPreprocessor {
    pub fn with_crop(mut self, crop: CenteredCrop) -> Self {
        self.crop = crop;
        self
    }

    /// Binary mask of the text and its outline, cleaned of speckle
    pub fn text_mask(&self, cropped: &RgbImage) -> GrayImage {
        let core = dilate(&self.text_range.mask(cropped), Norm::LInf, 1);
        let outline = self.outline_range.mask(cropped);
        let combined = GrayImage::from_fn(cropped.width(), cropped.height(), |x, y| {
            Luma([core.get_pixel(x, y)[0].max(outline.get_pixel(x, y)[0])])
        });

        let cleaned = close(&open(&combined, Norm::LInf, 1), Norm::LInf, 1);
        let cleaned = remove_small_components(&cleaned, self.min_component_area);
        median_filter(&cleaned, 1, 1)
    }
}

impl FramePreprocessor for YellowTextPreprocessor {
    fn banner_view(&self, frame: &RgbImage) -> Roi {
        let (cropped, origin) = self.crop.apply(frame);
        let mask = self.banner_range.mask(&cropped);
        let mask = close(&open(&mask, Norm::LInf, 1), Norm::LInf, 1);
        Roi {
            image: mask,
            origin,
        }
    }

    fn text_view(&self, frame: &RgbImage) -> RgbImage {
        let (cropped, _) = self.crop.apply(frame);
        let mask = self.text_mask(&cropped);
        RgbImage::from_fn(cropped.width(), cropped.height(), |x, y| {
            if mask.get_pixel(x, y)[0] > 0 {
                *cropped.get_pixel(x, y)
            } else {
                Rgb([0, 0, 0])
            }
        })
    }
}

/// Zero out 8-connected foreground components with fewer than `min_area` pixels
pub fn remove_small_components(mask: &GrayImage, min_area: u32) -> GrayImage {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut areas: Vec<u32> = Vec::new();
    for label in labels.pixels().map(|p| p[0] as usize) {
        if label >= areas.len() {
            areas.resize(label + 1, 0);
        }
        areas[label] += 1;
    }

    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let label = labels.get_pixel(x, y)[0] as usize;
        if label != 0 && areas[label] >= min_area {
            *mask.get_pixel(x, y)
        } else {
            Luma([0])
        }
    })
}
