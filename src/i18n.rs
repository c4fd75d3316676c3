//! Internationalization (i18n) module
//!
//! Picks the UI language from the system locale. Supports English and
//! Chinese Simplified; strings live in `locales/*.yml`.
//! Note: Log messages remain in English for consistency.

use std::sync::OnceLock;
use tracing::debug;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    ChineseSimplified,
}

impl Language {
    /// Locale code used by the translation files
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::ChineseSimplified => "zh-CN",
        }
    }

    /// Map a BCP 47 tag such as `zh-Hans-CN` or `en_US.UTF-8`
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_lowercase();
        if tag.starts_with("zh") || tag.contains("hans") || tag.contains("chinese") {
            Language::ChineseSimplified
        } else {
            Language::English
        }
    }
}

/// Global language instance
static LANGUAGE: OnceLock<Language> = OnceLock::new();

/// Get the current language based on system locale
pub fn get_language() -> Language {
    *LANGUAGE.get_or_init(detect_language)
}

/// Detect system language, falling back to the usual environment variables
fn detect_language() -> Language {
    let tag = sys_locale::get_locale()
        .or_else(|| std::env::var("LC_ALL").ok())
        .or_else(|| std::env::var("LANG").ok())
        .unwrap_or_default();
    Language::from_tag(&tag)
}

/// Apply the detected language to the translation tables
pub fn init_locale() {
    let language = get_language();
    rust_i18n::set_locale(language.code());
    debug!(locale = language.code(), "Locale initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_tag() {
        assert_eq!(Language::from_tag("zh-Hans-CN"), Language::ChineseSimplified);
        assert_eq!(Language::from_tag("zh_CN.UTF-8"), Language::ChineseSimplified);
        assert_eq!(Language::from_tag("en-US"), Language::English);
        assert_eq!(Language::from_tag("de_DE"), Language::English);
        assert_eq!(Language::from_tag(""), Language::English);
    }

    #[test]
    fn test_codes_have_translations() {
        for language in [Language::English, Language::ChineseSimplified] {
            let text = rust_i18n::t!("menu_start", locale = language.code());
            assert!(!text.contains("menu_start"), "{text}");
        }
    }
}
