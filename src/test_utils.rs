//! Synthetic rasters shared by unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Deterministic pseudo-random texture; shifted copies correlate near zero.
pub fn noise_patch(width: u32, height: u32, seed: u32) -> GrayImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    GrayImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        Luma([(state >> 24) as u8])
    })
}

/// Flat gray canvas
pub fn gray_canvas(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Copy `patch` into `canvas` with its top-left corner at (x, y)
pub fn paste(canvas: &mut GrayImage, patch: &GrayImage, x: u32, y: u32) {
    image::imageops::replace(canvas, patch, x as i64, y as i64);
}

/// Copy `patch` into `canvas` so that its center lands on (cx, cy)
pub fn paste_centered(canvas: &mut GrayImage, patch: &GrayImage, cx: u32, cy: u32) {
    paste(canvas, patch, cx - patch.width() / 2, cy - patch.height() / 2);
}

/// Expand a grayscale raster into an RGB frame
pub fn to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}
