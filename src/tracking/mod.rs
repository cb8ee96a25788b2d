// Tracking module - keeps the click target locked across frames.

pub mod tracker;

pub use tracker::{MarkerTracker, TrackedPosition};
