//! Picking the OCR hypothesis that carries the challenge name

use super::catalog::NameCatalog;
use super::resolver::{ResolvedName, extract_name_candidate, is_question_word, resolve};
use crate::ocr::{Rect, RecognizedText};
use serde::Deserialize;
use std::cmp::Ordering;

/// Rule for choosing which recognizer hypothesis names the target
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSelection {
    /// Hypothesis at a fixed position in the recognizer output. Unverified:
    /// recognizers do not promise a stable order.
    Index(usize),
    /// Hypotheses whose box center lies inside this region of the text view,
    /// highest confidence first
    Region(Rect),
    /// Resolve every hypothesis and keep the closest catalog hit
    #[default]
    BestResolved,
}

/// A resolved name together with the hypothesis it came from
#[derive(Debug, Clone, PartialEq)]
pub struct NameHit {
    pub name: ResolvedName,
    pub source: RecognizedText,
}

/// Apply `selection` to the hypotheses and resolve the chosen text
pub fn select_name(
    hypotheses: &[RecognizedText],
    selection: &NameSelection,
    catalog: &NameCatalog,
    max_distance: usize,
) -> Option<NameHit> {
    let candidates: Vec<&RecognizedText> = match selection {
        NameSelection::Index(index) => hypotheses.get(*index).into_iter().collect(),
        NameSelection::Region(region) => {
            let mut inside: Vec<&RecognizedText> = hypotheses
                .iter()
                .filter(|h| {
                    let (cx, cy) = h.bbox.center();
                    region.contains_point(cx, cy) && !is_question_word(&h.text)
                })
                .collect();
            inside.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            });
            inside
        }
        // Word-level recognizers split the question off the name; those words
        // would otherwise resolve on their own ("Onde" is close to "Onix")
        NameSelection::BestResolved => hypotheses
            .iter()
            .filter(|h| !is_question_word(&h.text))
            .collect(),
    };

    let mut best: Option<NameHit> = None;
    for hypothesis in candidates {
        let cleaned = extract_name_candidate(&hypothesis.text);
        let Some(name) = resolve(&cleaned, catalog, max_distance) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(current) => {
                name.distance < current.name.distance
                    || (name.distance == current.name.distance
                        && hypothesis.confidence > current.source.confidence)
            }
        };
        if better {
            best = Some(NameHit {
                name,
                source: hypothesis.clone(),
            });
        }
        // Region and Index use the first usable hypothesis only
        if !matches!(selection, NameSelection::BestResolved) && best.is_some() {
            break;
        }
    }
    best
}
