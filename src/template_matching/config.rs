//! Configuration for template matching operations

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum correlation score for a location to become a candidate (-1.0 to 1.0)
    pub threshold: f32,
    /// Scale factors applied to the template before matching
    pub scales: Vec<f32>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            scales: vec![1.0],
        }
    }
}

/// Challenge banner: small rendered text on a filtered mask, wide scale sweep
pub fn banner_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.6,
        scales: vec![0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0],
    }
}

/// Per-creature icon, rendered at native size
pub fn creature_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.7,
        scales: vec![1.0],
    }
}

/// Selectable marker icons (pokeballs); the template is a large render
pub fn marker_config() -> MatchConfig {
    MatchConfig {
        threshold: 0.7,
        scales: vec![0.35, 0.4, 0.45, 0.5, 0.6],
    }
}
