use std::fmt::Write as _;
use std::path::Path;

use crate::language::Language;
use crate::types::ExtractionResult;

pub const NO_TEXT_DETECTED: &str = "No text detected with sufficient confidence in the image.";

const RULE_WIDTH: usize = 50;

fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

/// Format a confidence in `[0, 1]` as a percentage with two decimals (`0.95` → `95.00%`).
pub fn percent(confidence: f32) -> String {
    format!("{:.2}%", f64::from(confidence) * 100.0)
}

// ── Command line ─────────────────────────────────────────────────────────────

/// Lines printed before extraction starts.
pub fn cli_header(image_path: &Path, threshold: f32, translate_to: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Processing image: {}", image_path.display());
    let _ = writeln!(
        out,
        "Extracting text with confidence >= {:.0}%",
        f64::from(threshold) * 100.0
    );
    if let Some(code) = translate_to {
        let _ = writeln!(out, "Translating to: {code}");
    }
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "Extracted Text:");
    let _ = write!(out, "{}", rule('-'));
    out
}

/// Numbered detections, the extracted text, and an optional `(code, translated)` line.
///
/// `text` is what gets printed as the extracted text; callers pass the joined
/// detections, cleaned or not.
pub fn cli_report(result: &ExtractionResult, text: &str, translation: Option<(&str, &str)>) -> String {
    if result.is_empty() {
        return NO_TEXT_DETECTED.to_string();
    }

    let mut lines = vec!["Individual Extractions:".to_string(), rule('-')];
    for (i, d) in result.iter().enumerate() {
        lines.push(format!("{}. Text: '{}' - Confidence: {}", i + 1, d.text, percent(d.confidence)));
    }
    lines.push(String::new());
    lines.push(rule('='));
    lines.push(String::new());
    lines.push(format!("Extracted Text: {text}"));

    if let Some((code, translated)) = translation {
        lines.push(format!("Translated ({code}): {translated}"));
    }

    lines.join("\n")
}

// ── Web download ─────────────────────────────────────────────────────────────

/// Body of the downloadable result file.
pub fn download_body(extracted: &str, translated: &str, language: &Language) -> String {
    format!(
        "Source:\n{extracted}\n\nTranslation ({}):\n{translated}",
        language.name
    )
}

pub fn download_file_name(language: &Language) -> String {
    format!("translation_{}.txt", language.slug())
}
