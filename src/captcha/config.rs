//! Session configuration

use crate::error::{CaptchaError, CaptchaResult};
use crate::names::{DEFAULT_MAX_DISTANCE, NameSelection};
use crate::ocr::DEFAULT_LANGUAGE;
use crate::preprocess::CenteredCrop;
use crate::template_matching::{MatchConfig, banner_config, creature_config, marker_config};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Challenge banner search on the banner view
    pub banner: MatchConfig,
    /// Per-creature icon search used to seed the tracker
    pub creature: MatchConfig,
    /// Selectable marker search while tracking
    pub marker: MatchConfig,
    /// Top banner score must exceed this to start a challenge
    pub presence_threshold: f32,
    /// Maximum edit distance for a confident name
    pub max_name_distance: usize,
    /// Markers needed on a frame before the tracker re-anchors
    pub min_marker_candidates: usize,
    pub recognizer_timeout_ms: u64,
    pub name_selection: NameSelection,
    /// Resize factor applied to the text view before OCR
    pub ocr_downscale: f32,
    /// Tesseract language code of the overlay text
    pub ocr_language: String,
    /// Challenge overlay crop used by the yellow-text filter
    pub crop: CenteredCrop,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            banner: banner_config(),
            creature: creature_config(),
            marker: marker_config(),
            presence_threshold: 0.65,
            max_name_distance: DEFAULT_MAX_DISTANCE,
            min_marker_candidates: 2,
            recognizer_timeout_ms: 5000,
            name_selection: NameSelection::default(),
            ocr_downscale: 0.5,
            ocr_language: DEFAULT_LANGUAGE.to_string(),
            crop: CenteredCrop::default(),
        }
    }
}

impl SessionConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> CaptchaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CaptchaError::Config {
            path: path.to_path_buf(),
            description: e.to_string(),
        })?;
        let config: SessionConfig =
            serde_json::from_str(&content).map_err(|e| CaptchaError::Config {
                path: path.to_path_buf(),
                description: e.to_string(),
            })?;
        config.validate().map_err(|description| CaptchaError::Config {
            path: path.to_path_buf(),
            description,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (label, m) in [("banner", &self.banner), ("creature", &self.creature), ("marker", &self.marker)] {
            if m.scales.is_empty() {
                return Err(format!("{label}: at least one scale is required"));
            }
            if !(-1.0..=1.0).contains(&m.threshold) {
                return Err(format!("{label}: threshold {} outside [-1, 1]", m.threshold));
            }
        }
        if self.ocr_language.trim().is_empty() {
            return Err("ocr_language must not be empty".to_string());
        }
        if !(self.ocr_downscale > 0.0 && self.ocr_downscale <= 1.0) {
            return Err(format!("ocr_downscale {} outside (0, 1]", self.ocr_downscale));
        }
        Ok(())
    }

    pub fn recognizer_timeout(&self) -> Duration {
        Duration::from_millis(self.recognizer_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Rect;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.presence_threshold, 0.65);
        assert_eq!(config.max_name_distance, 3);
        assert_eq!(config.min_marker_candidates, 2);
        assert_eq!(config.name_selection, NameSelection::BestResolved);
        assert_eq!(config.ocr_language, "por");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "presence_threshold": 0.7,
                "ocr_language": "eng",
                "marker": {{"threshold": 0.75, "scales": [0.5]}},
                "name_selection": {{"region": {{"x": 0, "y": 0, "width": 300, "height": 40}}}}
            }}"#
        )
        .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.presence_threshold, 0.7);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.marker.scales, vec![0.5]);
        assert_eq!(config.name_selection, NameSelection::Region(Rect::new(0, 0, 300, 40)));
        assert_eq!(config.banner, banner_config());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"banner": {{"threshold": 0.5, "scales": []}}}}"#).unwrap();
        let err = SessionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CaptchaError::Config { .. }));

        let err = SessionConfig::from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, CaptchaError::Config { .. }));
    }
}
