use std::sync::Arc;

use img2txt_core::Config;
use img2txt_ocr::{EngineHandle, ExtractionPipeline, OcrBackend, TextExtractor};
use img2txt_translate::{GoogleTranslator, TranslationBackend, TranslationPolicy, Translator};
use tokio::sync::Mutex;

/// Everything a request handler needs. Cloned per request; clones share state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ExtractionPipeline,
    pub translator: Translator,
    /// Serialises extraction runs, one interaction at a time.
    pub run_lock: Arc<Mutex<()>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(engine: EngineHandle, translation: Arc<dyn TranslationBackend>, config: &Config) -> Self {
        Self {
            pipeline: ExtractionPipeline::new(
                Arc::new(engine),
                TextExtractor::new(config.web_confidence_threshold),
            ),
            translator: Translator::new(translation, TranslationPolicy::interactive()),
            run_lock: Arc::new(Mutex::new(())),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Production wiring: the build's default OCR engine and Google Translate.
    pub fn from_config(config: &Config) -> Self {
        let tessdata = config.tessdata_path.clone();
        let languages = config.ocr_languages.clone();
        let engine = EngineHandle::new(move || {
            img2txt_ocr::default_backend(tessdata.as_deref(), &languages).map(Arc::<dyn OcrBackend>::from)
        });
        let translation = Arc::new(GoogleTranslator::new(config.translate_endpoint.clone()));
        Self::new(engine, translation, config)
    }
}
