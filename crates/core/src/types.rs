use serde::{Deserialize, Serialize};

/// A vertex of a detection's bounding polygon, in source-image pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognised text span as reported by the OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    /// Ordered corners of the bounding region (usually four, clockwise from top-left).
    pub polygon: Vec<Point>,
    pub text: String,
    /// Engine confidence (0.0–1.0).
    pub confidence: f32,
}

impl Detection {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Axis-aligned rectangle given as `(x, y, width, height)`.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32, text: impl Into<String>, confidence: f32) -> Self {
        let polygon = vec![
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ];
        Self::new(polygon, text, confidence)
    }
}

/// Detections in the order the engine returned them. Never re-sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    detections: Vec<Detection>,
}

impl ExtractionResult {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.text.as_str())
    }

    /// All recognised spans joined with a single space.
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join(" ")
    }

    pub fn into_inner(self) -> Vec<Detection> {
        self.detections
    }
}

impl IntoIterator for ExtractionResult {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExtractionResult {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

impl FromIterator<Detection> for ExtractionResult {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        Self { detections: iter.into_iter().collect() }
    }
}

/// A single translation job. The source language is always auto-detected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source_text: String,
    pub target_language: String,
}

impl TranslationRequest {
    pub const AUTO_SOURCE: &'static str = "auto";

    pub fn new(source_text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_language: target_language.into(),
        }
    }
}
