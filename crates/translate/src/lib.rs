pub mod backend;
pub mod google;
pub mod policy;

pub use backend::{MockTranslator, TranslateError, TranslationBackend, MAX_TEXT_CHARS};
pub use google::GoogleTranslator;
pub use policy::{EmptyInput, OnFailure, TranslationPolicy, Translator, NO_TEXT_DETECTED};
