use std::path::{Path, PathBuf};

use image::DynamicImage;
use img2txt_core::{Detection, ExtractionResult, DEFAULT_CONFIDENCE_THRESHOLD};
use thiserror::Error;

use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Image file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Runs a backend and keeps only detections at or above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtractor {
    threshold: f32,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self { threshold: DEFAULT_CONFIDENCE_THRESHOLD }
    }
}

impl TextExtractor {
    pub fn new(threshold: f32) -> Self {
        Self { threshold: threshold.clamp(0.0, 1.0) }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Drop detections below the threshold, preserving order.
    pub fn filter(&self, detections: Vec<Detection>) -> ExtractionResult {
        detections
            .into_iter()
            .filter(|d| d.confidence >= self.threshold)
            .collect()
    }

    pub fn try_extract(
        &self,
        backend: &dyn OcrBackend,
        image: &DynamicImage,
    ) -> Result<ExtractionResult, ExtractError> {
        let detections = backend.detect(image)?;
        let total = detections.len();
        let kept = self.filter(detections);
        tracing::debug!(total, kept = kept.len(), threshold = self.threshold, "OCR detections filtered");
        Ok(kept)
    }

    pub fn try_extract_path(
        &self,
        backend: &dyn OcrBackend,
        path: &Path,
    ) -> Result<ExtractionResult, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }
        let image = preprocess::load_image(path)?;
        self.try_extract(backend, &image)
    }

    /// Like [`try_extract`](Self::try_extract) but reports failures and returns an empty result.
    pub fn extract(&self, backend: &dyn OcrBackend, image: &DynamicImage) -> ExtractionResult {
        report(self.try_extract(backend, image))
    }

    /// Like [`try_extract_path`](Self::try_extract_path) but reports failures and returns an empty result.
    pub fn extract_path(&self, backend: &dyn OcrBackend, path: &Path) -> ExtractionResult {
        report(self.try_extract_path(backend, path))
    }
}

fn report(outcome: Result<ExtractionResult, ExtractError>) -> ExtractionResult {
    match outcome {
        Ok(result) => result,
        Err(e @ ExtractError::NotFound(_)) => {
            tracing::error!("Error: {e}");
            ExtractionResult::empty()
        }
        Err(e) => {
            tracing::error!("Error processing image: {e}");
            ExtractionResult::empty()
        }
    }
}
