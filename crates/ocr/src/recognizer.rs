use image::DynamicImage;
use img2txt_core::Detection;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available (build with the `tesseract` feature)")]
    NotAvailable,
}

/// Abstraction over an OCR backend.
///
/// Implementations return every span they recognise, in their own reading
/// order, with a confidence in `[0, 1]`. Filtering happens downstream.
pub trait OcrBackend: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns pre-set detections regardless of the image, or a pre-set failure.
pub struct MockRecognizer {
    outcome: Result<Vec<Detection>, String>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { outcome: Ok(detections), calls: AtomicUsize::new(0) }
    }

    /// One detection per word, laid out left to right with the given confidences.
    pub fn from_words(words: &[(&str, f32)]) -> Self {
        let detections = words
            .iter()
            .enumerate()
            .map(|(i, (text, conf))| Detection::from_rect(i as f32 * 50.0, 0.0, 50.0, 20.0, *text, *conf))
            .collect();
        Self::new(detections)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()), calls: AtomicUsize::new(0) }
    }

    /// Number of `detect` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrBackend for MockRecognizer {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map_err(OcrError::Engine)
    }
}

// ── Tesseract TSV output ──────────────────────────────────────────────────────

/// Tesseract's page-iterator level for single words.
const TSV_WORD_LEVEL: &str = "5";

/// Parse Tesseract's TSV dump into word-level detections.
///
/// Columns: `level page block par line word left top width height conf text`.
/// Rows that are not words, have a negative confidence, or carry blank text
/// are skipped. Tesseract reports confidence as 0–100.
pub fn parse_tsv(tsv: &str) -> Vec<Detection> {
    tsv.lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 12 || cols[0] != TSV_WORD_LEVEL {
                return None;
            }
            let num = |i: usize| cols[i].trim().parse::<f32>().ok();
            let (left, top, width, height, conf) = (num(6)?, num(7)?, num(8)?, num(9)?, num(10)?);
            let text = cols[11..].join("\t");
            let text = text.trim();
            if conf < 0.0 || text.is_empty() {
                return None;
            }
            Some(Detection::from_rect(left, top, width, height, text, conf / 100.0))
        })
        .collect()
}

/// Map two-letter language codes to Tesseract's traineddata names and join them with `+`.
pub fn tesseract_languages(codes: &[String]) -> String {
    codes
        .iter()
        .map(|c| match c.as_str() {
            "en" => "eng",
            "fr" => "fra",
            "es" => "spa",
            "de" => "deu",
            "hi" => "hin",
            "ja" => "jpn",
            "ar" => "ara",
            "zh" | "zh-CN" => "chi_sim",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("+")
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{parse_tsv, tesseract_languages, OcrBackend, OcrError};
    use image::DynamicImage;
    use img2txt_core::Detection;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        /// Validates that the requested traineddata can be loaded.
        pub fn new(data_path: Option<String>, languages: &[String]) -> Result<Self, OcrError> {
            let lang = tesseract_languages(languages);
            LepTess::new(data_path.as_deref(), &lang).map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(Self { data_path, lang })
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, OcrError> {
            let png = crate::preprocess::encode_as_png(image)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let tsv = lt.get_tsv_text(0).map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(parse_tsv(&tsv))
        }
    }
}

/// Build the default backend for this build.
pub fn default_backend(
    data_path: Option<&std::path::Path>,
    languages: &[String],
) -> Result<Box<dyn OcrBackend>, OcrError> {
    #[cfg(feature = "tesseract")]
    {
        let data_path = data_path.map(|p| p.display().to_string());
        Ok(Box::new(tesseract_backend::TesseractRecognizer::new(data_path, languages)?))
    }
    #[cfg(not(feature = "tesseract"))]
    {
        let _ = (data_path, languages);
        Err(OcrError::NotAvailable)
    }
}
