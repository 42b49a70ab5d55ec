pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use engine::EngineHandle;
pub use extract::{ExtractError, TextExtractor};
pub use pipeline::{ExtractionPipeline, PipelineOptions, PipelineOutput};
pub use preprocess::{binarize, binarize_bytes, PreprocessError};
pub use recognizer::{default_backend, MockRecognizer, OcrBackend, OcrError};
