// OCR module - the text recognizer capability used to read the challenge name.
// The session only depends on the `TextRecognizer` trait; the tesseract
// backend is the reference implementation used by the CLI.

pub mod tesseract;
pub mod types;

pub use tesseract::{DEFAULT_LANGUAGE, TesseractRecognizer};
pub use types::{Rect, RecognizedText, TextRecognizer};
