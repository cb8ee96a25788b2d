//! Nearest-candidate tracking of one marker across frames

use crate::template_matching::{Match, center_distance};
use serde::Serialize;
use std::cmp::Ordering;

/// Screen position of the tracked object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackedPosition {
    pub x: i32,
    pub y: i32,
}

impl TrackedPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<&Match> for TrackedPosition {
    fn from(m: &Match) -> Self {
        Self::new(m.x, m.y)
    }
}

/// Keeps the last known position of the target marker.
///
/// Visually identical markers cannot be told apart, so the candidate nearest
/// to the previous position is taken to be the target.
#[derive(Debug, Clone, Default)]
pub struct MarkerTracker {
    position: Option<TrackedPosition>,
}

impl MarkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking from a known position
    pub fn seed(&mut self, position: TrackedPosition) {
        log::debug!("📍 Tracker seeded at ({}, {})", position.x, position.y);
        self.position = Some(position);
    }

    /// Move to the candidate nearest the current position.
    ///
    /// With no candidates (a missed frame) the position is kept and `None`
    /// is returned. An unseeded tracker takes the strongest candidate.
    pub fn reanchor(&mut self, candidates: &[Match]) -> Option<TrackedPosition> {
        let chosen = match self.position {
            Some(current) => candidates.iter().min_by(|a, b| {
                let da = center_distance((a.x, a.y), (current.x, current.y));
                let db = center_distance((b.x, b.y), (current.x, current.y));
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            }),
            None => candidates.first(),
        }?;

        let next = TrackedPosition::from(chosen);
        if self.position != Some(next) {
            log::debug!("🎯 Tracker re-anchored to ({}, {})", next.x, next.y);
        }
        self.position = Some(next);
        Some(next)
    }

    pub fn position(&self) -> Option<TrackedPosition> {
        self.position
    }

    pub fn clear(&mut self) {
        self.position = None;
    }
}
