/// Template matching implementation
///
/// Multi-scale zero-mean normalized cross-correlation with optional template
/// masks, followed by greedy radius-aware de-duplication.
use super::config::MatchConfig;
use super::nms::suppress_overlaps;
use super::types::{Match, Template};
use image::GrayImage;
use image::imageops::{self, FilterType};
use rayon::prelude::*;

/// Window variance (per valid pixel) below which a location counts as flat
const VARIANCE_EPSILON: f64 = 1e-6;

/// Template matcher for finding every instance of a template in a raster
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    /// Keep every scale and row on the calling thread; results are merged in
    /// scale order either way
    sequential: bool,
}

/// Template pixels that take part in the correlation, mean removed
struct PreparedTemplate {
    width: u32,
    height: u32,
    /// (dx, dy, zero-mean value) for every valid pixel
    entries: Vec<(u32, u32, f64)>,
    /// sqrt(sum of squared zero-mean values)
    norm: f64,
}

impl TemplateMatcher {
    /// Create a matcher that spreads scales over the rayon pool
    pub fn new() -> Self {
        Self { sequential: false }
    }

    /// Create a matcher that runs every scale on the calling thread
    pub fn sequential() -> Self {
        Self { sequential: true }
    }

    /// Find all instances of `template` in `frame`
    ///
    /// # Arguments
    /// * `frame` - The raster to search (full frame or region of interest)
    /// * `template` - Pattern to look for; masked-out pixels are ignored
    /// * `scales` - Scale factors applied to the template
    /// * `threshold` - Minimum correlation score (-1.0 to 1.0)
    ///
    /// # Returns
    /// De-duplicated matches sorted by score (highest first), in the
    /// coordinates of `frame`. Scales whose resized template does not fit
    /// inside the frame are skipped.
    pub fn find(
        &self,
        frame: &GrayImage,
        template: &Template,
        scales: &[f32],
        threshold: f32,
    ) -> Vec<Match> {
        if !template.mask_matches_pixels() {
            log::warn!("⚠️ Template '{}' has a mask of a different size, skipping", template.name);
            return Vec::new();
        }

        let per_scale: Vec<Vec<Match>> = if self.sequential {
            scales
                .iter()
                .map(|&scale| self.scan_scale(frame, template, scale, threshold))
                .collect()
        } else {
            scales
                .par_iter()
                .map(|&scale| self.scan_scale(frame, template, scale, threshold))
                .collect()
        };

        let candidates: Vec<Match> = per_scale.into_iter().flatten().collect();
        let candidate_count = candidates.len();
        let matches = suppress_overlaps(candidates);

        log::debug!(
            "🔍 '{}': {} candidates -> {} matches (threshold {:.2})",
            template.name,
            candidate_count,
            matches.len(),
            threshold
        );
        matches
    }

    /// Find using a scale/threshold preset
    pub fn find_with(&self, frame: &GrayImage, template: &Template, config: &MatchConfig) -> Vec<Match> {
        self.find(frame, template, &config.scales, config.threshold)
    }

    /// Best match only, if any location clears the threshold
    pub fn find_best(
        &self,
        frame: &GrayImage,
        template: &Template,
        config: &MatchConfig,
    ) -> Option<Match> {
        self.find_with(frame, template, config).into_iter().next()
    }

    /// Every location scoring at or above `threshold` for one scale
    fn scan_scale(
        &self,
        frame: &GrayImage,
        template: &Template,
        scale: f32,
        threshold: f32,
    ) -> Vec<Match> {
        if !(scale.is_finite() && scale > 0.0) {
            log::debug!("⚠️ Skipping invalid scale {scale} for '{}'", template.name);
            return Vec::new();
        }

        let Some((pixels, mask)) = scale_template(template, scale) else {
            return Vec::new();
        };

        // Skip if scaled template is larger than search area
        if pixels.width() > frame.width() || pixels.height() > frame.height() {
            log::debug!(
                "⚠️ Skipping scale {:.2} for '{}' - too large for frame: {}x{} > {}x{}",
                scale,
                template.name,
                pixels.width(),
                pixels.height(),
                frame.width(),
                frame.height()
            );
            return Vec::new();
        }

        let Some(prepared) = PreparedTemplate::new(&pixels, mask.as_ref()) else {
            log::debug!("⚠️ Template '{}' has no contrast at scale {:.2}", template.name, scale);
            return Vec::new();
        };

        let radius = (template.width() as f32 * scale / 2.0).round() as i32;
        let half_w = (prepared.width / 2) as i32;
        let half_h = (prepared.height / 2) as i32;
        let offsets = prepared.offsets(frame.width());
        let out_w = frame.width() - prepared.width + 1;
        let out_h = frame.height() - prepared.height + 1;

        let row_matches = |y: u32| -> Vec<Match> {
            (0..out_w)
                .filter_map(|x| {
                    let score = prepared.score_at(frame, &offsets, x, y);
                    (score >= threshold).then(|| {
                        Match::new(x as i32 + half_w, y as i32 + half_h, radius, score, scale)
                    })
                })
                .collect()
        };

        if self.sequential {
            (0..out_h).flat_map(row_matches).collect()
        } else {
            (0..out_h).into_par_iter().flat_map_iter(row_matches).collect()
        }
    }
}

impl PreparedTemplate {
    fn new(pixels: &GrayImage, mask: Option<&GrayImage>) -> Option<Self> {
        let valid: Vec<(u32, u32, f64)> = pixels
            .enumerate_pixels()
            .filter(|(x, y, _)| mask.is_none_or(|m| m.get_pixel(*x, *y)[0] > 0))
            .map(|(x, y, p)| (x, y, p[0] as f64))
            .collect();
        if valid.is_empty() {
            return None;
        }

        let mean = valid.iter().map(|(_, _, v)| v).sum::<f64>() / valid.len() as f64;
        let entries: Vec<(u32, u32, f64)> =
            valid.into_iter().map(|(x, y, v)| (x, y, v - mean)).collect();
        let norm = entries.iter().map(|(_, _, v)| v * v).sum::<f64>().sqrt();
        if norm <= VARIANCE_EPSILON {
            return None;
        }

        Some(Self {
            width: pixels.width(),
            height: pixels.height(),
            entries,
            norm,
        })
    }

    /// Row-major offsets of the valid pixels for a frame of the given width
    fn offsets(&self, frame_width: u32) -> Vec<(usize, f64)> {
        self.entries
            .iter()
            .map(|&(dx, dy, v)| ((dy as usize) * frame_width as usize + dx as usize, v))
            .collect()
    }

    /// Zero-mean normalized correlation of the window whose top-left is (x, y)
    fn score_at(&self, frame: &GrayImage, offsets: &[(usize, f64)], x: u32, y: u32) -> f32 {
        let raw = frame.as_raw();
        let base = y as usize * frame.width() as usize + x as usize;
        let count = offsets.len() as f64;

        let (mut sum, mut sum_sq, mut cross) = (0.0f64, 0.0f64, 0.0f64);
        for &(offset, t) in offsets {
            let v = raw[base + offset] as f64;
            sum += v;
            sum_sq += v * v;
            cross += t * v;
        }

        let variance = sum_sq - sum * sum / count;
        if variance <= VARIANCE_EPSILON * count {
            return 0.0;
        }
        (cross / (self.norm * variance.sqrt())).clamp(-1.0, 1.0) as f32
    }
}

/// Resize template pixels (and mask) by `scale`; None when it collapses to nothing
fn scale_template(template: &Template, scale: f32) -> Option<(GrayImage, Option<GrayImage>)> {
    if (scale - 1.0).abs() <= 0.01 {
        return Some((template.pixels.clone(), template.mask.clone()));
    }

    let new_width = (template.width() as f32 * scale).round() as u32;
    let new_height = (template.height() as f32 * scale).round() as u32;
    if new_width == 0 || new_height == 0 {
        return None;
    }

    let pixels = imageops::resize(&template.pixels, new_width, new_height, FilterType::Lanczos3);
    let mask = template
        .mask
        .as_ref()
        .map(|m| imageops::resize(m, new_width, new_height, FilterType::Nearest));
    Some((pixels, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gray_canvas, noise_patch, paste, paste_centered};
    use image::Luma;

    #[test]
    fn test_single_instance_found_once() {
        let patch = noise_patch(16, 16, 7);
        let mut frame = gray_canvas(120, 90, 128);
        paste_centered(&mut frame, &patch, 70, 40);

        let matcher = TemplateMatcher::new();
        let template = Template::new("noise", patch);
        let matches = matcher.find(&frame, &template, &[0.5, 1.0, 1.5], 0.8);

        assert_eq!(matches.len(), 1, "got {:?}", matches);
        let m = matches[0];
        assert!((m.x - 70).abs() <= 1 && (m.y - 40).abs() <= 1, "center {m}");
        assert_eq!(m.scale, 1.0);
        assert_eq!(m.radius, 8);
        assert!(m.score > 0.99);
    }

    #[test]
    fn test_half_scale_instance_reports_its_scale() {
        let patch = noise_patch(32, 32, 9);
        let small = imageops::resize(&patch, 16, 16, FilterType::Lanczos3);
        let mut frame = gray_canvas(100, 80, 128);
        paste(&mut frame, &small, 40, 30);

        let template = Template::new("noise", patch);
        let matches = TemplateMatcher::new().find(&frame, &template, &[0.5, 1.0], 0.9);

        assert_eq!(matches.len(), 1, "got {:?}", matches);
        let m = matches[0];
        assert_eq!(m.scale, 0.5);
        assert_eq!(m.radius, (32.0f32 * 0.5 / 2.0).round() as i32);
        assert_eq!((m.x, m.y), (48, 38));
        assert!(m.score > 0.99);
    }

    #[test]
    fn test_mismatched_mask_is_skipped() {
        let frame = noise_patch(40, 40, 1);
        let template = Template::new("sprite", noise_patch(10, 10, 2)).with_mask(gray_canvas(4, 4, 255));
        assert!(TemplateMatcher::new().find(&frame, &template, &[1.0, 0.5], -1.0).is_empty());
    }

    #[test]
    fn test_absent_template_returns_empty() {
        let frame = noise_patch(80, 60, 3);
        let template = Template::new("other", noise_patch(12, 12, 99));
        let matches = TemplateMatcher::new().find(&frame, &template, &[1.0], 0.8);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_multiple_instances_sorted_and_separated() {
        let patch = noise_patch(12, 12, 21);
        let mut frame = gray_canvas(150, 60, 90);
        for cx in [20, 75, 130] {
            paste_centered(&mut frame, &patch, cx, 30);
        }

        let template = Template::new("marker", patch);
        let matches = TemplateMatcher::new().find(&frame, &template, &[1.0], 0.8);

        assert_eq!(matches.len(), 3);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for (i, a) in matches.iter().enumerate() {
            for b in &matches[i + 1..] {
                assert!(a.distance_to(b) >= a.radius.max(b.radius) as f64);
            }
        }
    }

    #[test]
    fn test_oversized_scales_are_skipped() {
        let frame = gray_canvas(20, 20, 0);
        let template = Template::new("big", noise_patch(16, 16, 5));
        assert!(TemplateMatcher::new().find(&frame, &template, &[2.0, 4.0], 0.1).is_empty());
        assert!(TemplateMatcher::new().find(&frame, &template, &[0.0, -1.0], 0.1).is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let patch = noise_patch(10, 10, 11);
        let mut frame = noise_patch(64, 48, 12);
        paste(&mut frame, &patch, 30, 20);
        let template = Template::new("noise", patch);
        let matcher = TemplateMatcher::new();

        let first = matcher.find(&frame, &template, &[0.8, 1.0, 1.2], 0.5);
        let second = matcher.find(&frame, &template, &[0.8, 1.0, 1.2], 0.5);
        assert_eq!(first, second);
        assert_eq!(first, TemplateMatcher::sequential().find(&frame, &template, &[0.8, 1.0, 1.2], 0.5));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let frame = noise_patch(40, 40, 1);
        let template = Template::new("noise", noise_patch(8, 8, 2));
        for m in TemplateMatcher::new().find(&frame, &template, &[1.0], -1.0) {
            assert!((-1.0..=1.0).contains(&m.score));
        }
    }

    #[test]
    fn test_mask_ignores_background() {
        // Sprite occupies the left half; the right half of the template is junk
        let sprite = noise_patch(8, 16, 31);
        let mut template_pixels = noise_patch(16, 16, 32);
        paste(&mut template_pixels, &sprite, 0, 0);
        let mask = GrayImage::from_fn(16, 16, |x, _| Luma([if x < 8 { 255 } else { 0 }]));

        // In the frame the sprite sits on a different background
        let mut frame = gray_canvas(80, 60, 40);
        let mut instance = noise_patch(16, 16, 77);
        paste(&mut instance, &sprite, 0, 0);
        paste(&mut frame, &instance, 30, 20);

        let matcher = TemplateMatcher::new();
        let unmasked = Template::new("sprite", template_pixels.clone());
        let masked = Template::new("sprite", template_pixels).with_mask(mask);

        let plain_best = matcher.find(&frame, &unmasked, &[1.0], -1.0);
        assert!(plain_best.first().is_none_or(|m| m.score < 0.9));

        let hits = matcher.find(&frame, &masked, &[1.0], 0.95);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].x, hits[0].y), (38, 28));
    }

    #[test]
    fn test_flat_template_never_matches() {
        let frame = noise_patch(30, 30, 4);
        let template = Template::new("flat", gray_canvas(6, 6, 200));
        assert!(TemplateMatcher::new().find(&frame, &template, &[1.0], -1.0).is_empty());
    }
}
