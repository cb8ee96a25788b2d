//! Edit-distance lookup of noisy OCR text against the name catalog

use super::catalog::NameCatalog;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default maximum edit distance for a confident identification
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Challenge question that precedes the name ("Onde está Arcanine?")
static QUESTION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:onde\s+est[aá]|where\s+is)\b\s*").expect("static regex")
});

/// Words of the challenge question when the recognizer reports one word per hypothesis
const QUESTION_WORDS: [&str; 5] = ["onde", "está", "esta", "where", "is"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedName {
    /// Catalog entry in its original casing
    pub canonical: String,
    /// Edit distance between the normalized OCR text and the entry
    pub distance: usize,
}

/// Levenshtein distance over Unicode scalar values
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Closest catalog entry to `ocr_text`, if it is within `max_distance` edits
///
/// Text is trimmed and lowercased; catalog entries are compared lowercased.
/// On equal distance the entry that comes first in the catalog wins.
pub fn resolve(ocr_text: &str, catalog: &NameCatalog, max_distance: usize) -> Option<ResolvedName> {
    let normalized = ocr_text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    let mut best: Option<ResolvedName> = None;
    for name in catalog.iter() {
        let distance = levenshtein(&normalized, &name.to_lowercase());
        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(ResolvedName {
                canonical: name.to_string(),
                distance,
            });
            if distance == 0 {
                break;
            }
        }
    }

    match best {
        Some(name) if name.distance <= max_distance => Some(name),
        Some(name) => {
            log::debug!(
                "❓ '{}' closest to '{}' at distance {} > {}",
                normalized,
                name.canonical,
                name.distance,
                max_distance
            );
            None
        }
        None => None,
    }
}

/// Strip the challenge question and punctuation around the creature name
pub fn extract_name_candidate(text: &str) -> String {
    let without_question = QUESTION_PREFIX.replace(text, "");
    without_question
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// True when `text` is a lone word of the challenge question ("Onde", "está", ...)
pub fn is_question_word(text: &str) -> bool {
    let word = text
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    QUESTION_WORDS.contains(&word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> NameCatalog {
        NameCatalog::new(["Pikachu", "Raichu", "Arcanine", "Growlithe"])
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("pikachu", "pikachu"), 0);
        assert_eq!(levenshtein("está", "esta"), 1);
    }

    #[test]
    fn test_resolve_noisy_name() {
        let resolved = resolve("pikuchu", &NameCatalog::new(["Pikachu", "Raichu"]), 3).unwrap();
        assert_eq!(resolved.canonical, "Pikachu");
        assert_eq!(resolved.distance, 1);
    }

    #[test]
    fn test_resolve_normalizes_case_and_whitespace() {
        let resolved = resolve("  ARCANlNE \n", &catalog(), 3).unwrap();
        assert_eq!(resolved.canonical, "Arcanine");
        assert_eq!(resolved.distance, 1);
    }

    #[test]
    fn test_resolve_rejects_far_text() {
        assert_eq!(resolve("xyz123", &catalog(), 3), None);
    }

    #[test]
    fn test_resolve_boundary() {
        // "arcxxxne" is exactly three substitutions away
        assert!(resolve("arcxxxne", &catalog(), 3).is_some());
        assert!(resolve("arcxxxne", &catalog(), 2).is_none());
    }

    #[test]
    fn test_empty_text_resolves_to_none() {
        assert_eq!(resolve("   ", &catalog(), 100), None);
        assert_eq!(resolve("pikachu", &NameCatalog::default(), 3), None);
    }

    #[test]
    fn test_ties_follow_catalog_order() {
        // "ab" is one edit from both entries
        let first = resolve("ab", &NameCatalog::new(["aa", "bb"]), 3).unwrap();
        assert_eq!(first.canonical, "aa");
        let swapped = resolve("ab", &NameCatalog::new(["bb", "aa"]), 3).unwrap();
        assert_eq!(swapped.canonical, "bb");
    }

    #[test]
    fn test_extract_name_candidate() {
        assert_eq!(extract_name_candidate("Onde está Arcanine?"), "Arcanine");
        assert_eq!(extract_name_candidate("onde esta  pikachu ?"), "pikachu");
        assert_eq!(extract_name_candidate("Where is Mr. Mime?"), "Mr. Mime");
        assert_eq!(extract_name_candidate("Raichu!"), "Raichu");
        assert_eq!(extract_name_candidate("?!"), "");
    }

    #[test]
    fn test_question_words() {
        for word in ["Onde", "está", "ESTA", "where", "Is", "onde,"] {
            assert!(is_question_word(word), "{word}");
        }
        for word in ["Onix", "Pikachu", "Onde está Onix", ""] {
            assert!(!is_question_word(word), "{word}");
        }
    }
}
