use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use img2txt_core::{ExtractionResult, TextCleaner};

use crate::engine::EngineHandle;
use crate::extract::{ExtractError, TextExtractor};
use crate::preprocess;

/// Per-run switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Binarize the image before OCR.
    pub preprocess: bool,
    /// Run [`TextCleaner`] over the joined text.
    pub clean: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { preprocess: false, clean: true }
    }
}

/// The result of a single image processing run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Detections that passed the confidence threshold, in engine order.
    pub detections: ExtractionResult,
    /// Detections joined with single spaces.
    pub raw_text: String,
    /// `raw_text` after cleanup (identical when cleaning is off).
    pub text: String,
    /// The binarized image as PNG, when pre-processing ran.
    pub processed_png: Option<Vec<u8>>,
}

/// Orchestrates: load → (binarize) → OCR → confidence filter → join → clean.
///
/// Cheap to clone; clones share the same engine handle.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    engine: Arc<EngineHandle>,
    extractor: TextExtractor,
}

impl ExtractionPipeline {
    pub fn new(engine: Arc<EngineHandle>, extractor: TextExtractor) -> Self {
        Self { engine, extractor }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn extractor(&self) -> TextExtractor {
        self.extractor
    }

    /// Process an already-decoded image.
    pub fn try_run(&self, image: &DynamicImage, options: PipelineOptions) -> Result<PipelineOutput, ExtractError> {
        let (ocr_input, processed_png) = prepare(image, options)?;
        let output = self.recognize(&ocr_input, options)?;
        Ok(PipelineOutput { processed_png, ..output })
    }

    /// Process raw upload bytes.
    pub fn try_run_bytes(&self, data: &[u8], options: PipelineOptions) -> Result<PipelineOutput, ExtractError> {
        let image = preprocess::load_image_from_bytes(data)?;
        self.try_run(&image, options)
    }

    pub fn try_run_path(&self, path: &Path, options: PipelineOptions) -> Result<PipelineOutput, ExtractError> {
        let image = load_path(path)?;
        self.try_run(&image, options)
    }

    /// Run on a file; failures are reported and produce an empty output.
    pub fn run_path(&self, path: &Path, options: PipelineOptions) -> PipelineOutput {
        match load_path(path) {
            Ok(image) => self.run_image(&image, options),
            Err(e) => {
                report(&e);
                PipelineOutput::default()
            }
        }
    }

    /// Run on upload bytes; failures are reported and produce an empty output.
    pub fn run_bytes(&self, data: &[u8], options: PipelineOptions) -> PipelineOutput {
        match preprocess::load_image_from_bytes(data) {
            Ok(image) => self.run_image(&image, options),
            Err(e) => {
                report(&ExtractError::from(e));
                PipelineOutput::default()
            }
        }
    }

    /// Like [`try_run`](Self::try_run), but an OCR failure only empties the
    /// text side. The processed image survives so it can still be shown.
    fn run_image(&self, image: &DynamicImage, options: PipelineOptions) -> PipelineOutput {
        let (ocr_input, processed_png) = match prepare(image, options) {
            Ok(prepared) => prepared,
            Err(e) => {
                report(&e);
                return PipelineOutput::default();
            }
        };
        let output = self.recognize(&ocr_input, options).unwrap_or_else(|e| {
            report(&e);
            PipelineOutput::default()
        });
        PipelineOutput { processed_png, ..output }
    }

    fn recognize(&self, image: &DynamicImage, options: PipelineOptions) -> Result<PipelineOutput, ExtractError> {
        let engine = self.engine.get()?;
        let detections = self.extractor.try_extract(engine.as_ref(), &preprocess::fit_for_ocr(image))?;
        let raw_text = detections.joined_text();
        let text = if options.clean { TextCleaner::clean(&raw_text) } else { raw_text.clone() };

        Ok(PipelineOutput { detections, raw_text, text, processed_png: None })
    }

    /// [`run_path`](Self::run_path) on the blocking thread pool.
    pub async fn process_file(&self, path: &Path, options: PipelineOptions) -> PipelineOutput {
        let pipeline = self.clone();
        let path = path.to_path_buf();
        match tokio::task::spawn_blocking(move || pipeline.run_path(&path, options)).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Error processing image: OCR task failed: {e}");
                PipelineOutput::default()
            }
        }
    }

    /// [`run_bytes`](Self::run_bytes) on the blocking thread pool.
    pub async fn process_bytes(&self, data: Vec<u8>, options: PipelineOptions) -> PipelineOutput {
        let pipeline = self.clone();
        match tokio::task::spawn_blocking(move || pipeline.run_bytes(&data, options)).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Error processing image: OCR task failed: {e}");
                PipelineOutput::default()
            }
        }
    }
}

/// Binarize when asked; returns the OCR input and the PNG to display.
fn prepare(image: &DynamicImage, options: PipelineOptions) -> Result<(Cow<'_, DynamicImage>, Option<Vec<u8>>), ExtractError> {
    if !options.preprocess {
        return Ok((Cow::Borrowed(image), None));
    }
    let binary = DynamicImage::ImageLuma8(preprocess::binarize(image));
    let png = preprocess::encode_as_png(&binary)?;
    Ok((Cow::Owned(binary), Some(png)))
}

fn load_path(path: &Path) -> Result<DynamicImage, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }
    Ok(preprocess::load_image(path)?)
}

fn report(e: &ExtractError) {
    match e {
        ExtractError::NotFound(_) => tracing::error!("Error: {e}"),
        _ => tracing::error!("Error processing image: {e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
