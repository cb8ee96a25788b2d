//! Text recognizer backed by the `tesseract` command line tool.

use super::types::{Rect, RecognizedText, TextRecognizer};
use crate::error::{CaptchaError, CaptchaResult};
use image::RgbImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

/// Runs `tesseract <png> stdout ... tsv` and reports one hypothesis per word
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    executable: PathBuf,
    language: String,
    tessdata_dir: Option<PathBuf>,
}

/// The challenge overlay is Portuguese ("Onde está ...?")
pub const DEFAULT_LANGUAGE: &str = "por";

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            language: DEFAULT_LANGUAGE.to_string(),
            tessdata_dir: None,
        }
    }
}

impl TesseractRecognizer {
    pub fn new(executable: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            language: language.into(),
            tessdata_dir: None,
        }
    }

    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &RgbImage) -> CaptchaResult<Vec<RecognizedText>> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image
            .save(temp_input.path())
            .map_err(|e| CaptchaError::RecognizerFailure {
                description: format!("could not write OCR input: {e}"),
            })?;

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg("stdout");
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        // psm 11: sparse text, the banner words are scattered over the overlay
        command
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("11")
            .arg("tsv");

        let output = command.output().map_err(|e| CaptchaError::RecognizerFailure {
            description: format!("could not run {:?}: {e}", self.executable),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptchaError::RecognizerFailure {
                description: format!("tesseract failed: {}", stderr.trim()),
            });
        }

        let hypotheses = parse_tsv_output(&String::from_utf8_lossy(&output.stdout));
        log::debug!("📝 tesseract returned {} words", hypotheses.len());
        Ok(hypotheses)
    }
}

/// Parses Tesseract TSV output into word-level hypotheses
fn parse_tsv_output(tsv: &str) -> Vec<RecognizedText> {
    let mut words = Vec::new();

    for line in tsv.lines().skip(1) {
        // level, page_num, block_num, par_num, line_num, word_num,
        // left, top, width, height, conf, text
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // Level 5 = word
        if fields[0].parse::<i32>().unwrap_or(-1) != 5 {
            continue;
        }

        let text = fields[11].trim();
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let coords: Vec<u32> = fields[6..10]
            .iter()
            .map(|f| f.parse().unwrap_or(0))
            .collect();

        words.push(RecognizedText::new(
            text,
            (conf / 100.0).clamp(0.0, 1.0),
            Rect::new(coords[0], coords[1], coords[2], coords[3]),
        ));
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t400\t120\t-1\t
4\t1\t1\t1\t1\t0\t10\t20\t300\t30\t-1\t
5\t1\t1\t1\t1\t1\t10\t20\t60\t30\t91.5\tOnde
5\t1\t1\t1\t1\t2\t80\t20\t50\t30\t88\testá
5\t1\t1\t1\t1\t3\t140\t22\t120\t28\t73.25\tArcanine?
5\t1\t1\t1\t1\t4\t270\t22\t10\t28\t-1\t
";

    #[test]
    fn test_parse_words_only() {
        let words = parse_tsv_output(SAMPLE);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Onde", "está", "Arcanine?"]);
        assert_eq!(words[2].bbox, Rect::new(140, 22, 120, 28));
        assert!((words[0].confidence - 0.915).abs() < 1e-6);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_tsv_output("").is_empty());
        assert!(parse_tsv_output("header\nnot\ta\tvalid\tline").is_empty());
    }

    #[test]
    fn test_default_reads_portuguese() {
        let recognizer = TesseractRecognizer::default();
        assert_eq!(recognizer.language, "por");
        assert_eq!(TesseractRecognizer::new("tesseract", "eng").language, "eng");
    }

    #[test]
    fn test_missing_executable_is_recognizer_failure() {
        let recognizer = TesseractRecognizer::new("/nonexistent/tesseract-binary", "eng");
        let err = recognizer.recognize(&RgbImage::new(4, 4)).unwrap_err();
        assert!(matches!(err, CaptchaError::RecognizerFailure { .. }));
    }
}
