use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Prefix of every environment override, e.g. `IMG2TXT_CONFIDENCE_THRESHOLD`.
pub const ENV_PREFIX: &str = "IMG2TXT_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Settings shared by the CLI and the web server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detections below this confidence are discarded.
    pub confidence_threshold: f32,
    /// Threshold used by the web UI, which keeps every detection by default.
    pub web_confidence_threshold: f32,
    /// Languages the OCR engine is asked to recognise (ISO 639-1 codes).
    pub ocr_languages: Vec<String>,
    /// Directory holding Tesseract `*.traineddata` files. `None` uses the system default.
    pub tessdata_path: Option<PathBuf>,
    pub translate_endpoint: String,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            web_confidence_threshold: 0.0,
            ocr_languages: vec!["en".to_string()],
            tessdata_path: None,
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            bind_addr: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional TOML file, apply `IMG2TXT_*` environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Override fields from `lookup`, which maps full variable names to values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "confidence_threshold",
                reason: format!("'{v}' is not a number"),
            })?;
        }
        if let Some(v) = var("WEB_CONFIDENCE_THRESHOLD") {
            self.web_confidence_threshold = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "web_confidence_threshold",
                reason: format!("'{v}' is not a number"),
            })?;
        }
        if let Some(v) = var("OCR_LANGUAGES") {
            self.ocr_languages = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = var("TESSDATA_PATH") {
            self.tessdata_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("TRANSLATE_ENDPOINT") {
            self.translate_endpoint = v;
        }
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = var("MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "max_upload_bytes",
                reason: format!("'{v}' is not a byte count"),
            })?;
        }
        if let Some(v) = var("LOG_FILTER") {
            self.log_filter = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid {
                key: "confidence_threshold",
                reason: format!("{} is outside 0.0..=1.0", self.confidence_threshold),
            });
        }
        if !(0.0..=1.0).contains(&self.web_confidence_threshold) {
            return Err(ConfigError::Invalid {
                key: "web_confidence_threshold",
                reason: format!("{} is outside 0.0..=1.0", self.web_confidence_threshold),
            });
        }
        if self.ocr_languages.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ocr_languages",
                reason: "at least one language is required".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "max_upload_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
