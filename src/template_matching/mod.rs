/// Template matching module for locating banners, creatures and markers
///
/// This module provides:
/// - Zero-mean normalized cross-correlation with optional validity masks
/// - Multi-scale search with per-scale parallelism
/// - Greedy radius-aware de-duplication of overlapping hits
pub mod config;
pub mod matcher;
pub mod nms;
pub mod types;

pub use config::{MatchConfig, banner_config, creature_config, marker_config};
pub use matcher::TemplateMatcher;
pub use nms::suppress_overlaps;
pub use types::{Match, Template, center_distance};
