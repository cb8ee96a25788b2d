//! Fuzzy identification of the challenge creature from noisy OCR text.

pub mod catalog;
pub mod resolver;
pub mod selection;

pub use catalog::NameCatalog;
pub use resolver::{
    DEFAULT_MAX_DISTANCE, ResolvedName, extract_name_candidate, is_question_word, levenshtein,
    resolve,
};
pub use selection::{NameHit, NameSelection, select_name};
