//! A single command-line extraction run, independent of how the engines are built.

use std::path::Path;
use std::sync::Arc;

use img2txt_core::{report, TranslationRequest};
use img2txt_ocr::{EngineHandle, ExtractionPipeline, PipelineOptions, TextExtractor};
use img2txt_translate::{TranslationBackend, TranslationPolicy, Translator};

/// Extract text from `image_path`, translate it when a target is given, and
/// render the report that follows the run header.
///
/// Translation uses the batch policy: a failure prints the untranslated text.
/// Nothing is translated when no text passed the threshold.
pub async fn extract_and_report(
    engine: EngineHandle,
    translation: Arc<dyn TranslationBackend>,
    threshold: f32,
    image_path: &Path,
    translate_to: Option<&str>,
    options: PipelineOptions,
) -> String {
    let pipeline = ExtractionPipeline::new(Arc::new(engine), TextExtractor::new(threshold));
    tracing::debug!(?options, "Starting extraction");
    let output = pipeline.process_file(image_path, options).await;

    let translated = match translate_to {
        Some(code) if !output.detections.is_empty() => {
            let translator = Translator::new(translation, TranslationPolicy::batch());
            let request = TranslationRequest::new(output.text.clone(), code);
            Some((code, translator.translate_request(&request).await))
        }
        _ => None,
    };

    report::cli_report(
        &output.detections,
        &output.text,
        translated.as_ref().map(|(code, text)| (*code, text.as_str())),
    )
}
