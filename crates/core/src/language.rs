use serde::Serialize;
use std::fmt;

/// A selectable translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

impl Language {
    pub const fn new(name: &'static str, code: &'static str) -> Self {
        Language { name, code }
    }

    /// Lowercased display name, as used in download file names.
    pub fn slug(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn is_source(&self) -> bool {
        self.code == SOURCE_LANGUAGE.code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Language the interactive UI treats as "already in the source language".
pub const SOURCE_LANGUAGE: Language = Language::new("English", "en");

/// Targets offered by the web UI, in display order. The first entry is the default.
pub const UI_LANGUAGES: &[Language] = &[
    Language::new("Hindi", "hi"),
    Language::new("Spanish", "es"),
    Language::new("French", "fr"),
    Language::new("Japanese", "ja"),
    Language::new("Arabic", "ar"),
    SOURCE_LANGUAGE,
];

pub fn default_language() -> Language {
    UI_LANGUAGES[0]
}

/// Look up a UI language by display name (case-insensitive) or by code.
pub fn find_language(name_or_code: &str) -> Option<Language> {
    let needle = name_or_code.trim();
    UI_LANGUAGES
        .iter()
        .copied()
        .find(|l| l.name.eq_ignore_ascii_case(needle) || l.code.eq_ignore_ascii_case(needle))
}
