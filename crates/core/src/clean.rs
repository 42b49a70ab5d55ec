use std::sync::OnceLock;

use regex::Regex;

// ── Known misreads ───────────────────────────────────────────────────────────

/// Literal misreadings of "START GAME", applied in this order.
const START_GAME_MISREADS: &[&str] = &[
    "GTARTGAMB",
    "STARTG AME",
    "STARTGAMB",
    "GTART GAME",
    "ST ART GAME",
];

const START_GAME: &str = "START GAME";

fn misread_patterns() -> &'static [(Regex, &'static str)] {
    static R: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    R.get_or_init(|| {
        START_GAME_MISREADS
            .iter()
            .map(|p| {
                let re = Regex::new(&format!("(?i){}", regex::escape(p))).expect("invalid regex");
                (re, START_GAME)
            })
            .collect()
    })
}

// ── Public API ───────────────────────────────────────────────────────────────

pub struct TextCleaner;

impl TextCleaner {
    /// Normalise whitespace, then rewrite known OCR misreads.
    ///
    /// Each replacement runs once over the output of the previous one; there is
    /// no fixed-point loop.
    pub fn clean(raw: &str) -> String {
        let mut cleaned = Self::collapse_whitespace(raw);
        for (re, replacement) in misread_patterns() {
            cleaned = re.replace_all(&cleaned, *replacement).into_owned();
        }
        cleaned
    }

    /// Collapse runs of whitespace into single spaces and trim both ends.
    pub fn collapse_whitespace(raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
