pub mod clean;
pub mod config;
pub mod language;
pub mod report;
pub mod types;

pub use clean::TextCleaner;
pub use config::{Config, ConfigError, DEFAULT_CONFIDENCE_THRESHOLD};
pub use language::{default_language, find_language, Language, SOURCE_LANGUAGE, UI_LANGUAGES};
pub use types::{Detection, ExtractionResult, Point, TranslationRequest};
