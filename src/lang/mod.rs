//! Language tables and script-variant handling
//!
//! This module holds the static table of supported content-source languages,
//! the mapping from requested language variants onto the source's canonical
//! language editions, and the text normalizer for script variants that share
//! one canonical edition.

mod normalize;

pub use normalize::{NormalizeError, TableNormalizer, VariantNormalizer};

/// Supported content-source languages with their native display names.
///
/// Order: English first, then Traditional Chinese, Simplified Chinese, then
/// the remaining editions.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("zh-tw", "繁體中文 (Traditional Chinese)"),
    ("zh", "简体中文 (Simplified Chinese)"),
    ("ja", "日本語 (Japanese)"),
    ("ko", "한국어 (Korean)"),
    ("es", "Español (Spanish)"),
    ("fr", "Français (French)"),
    ("de", "Deutsch (German)"),
    ("ru", "Русский (Russian)"),
    ("pt", "Português (Portuguese)"),
    ("it", "Italiano (Italian)"),
    ("ar", "العربية (Arabic)"),
    ("hi", "हिन्दी (Hindi)"),
    ("vi", "Tiếng Việt (Vietnamese)"),
    ("th", "ไทย (Thai)"),
    ("id", "Bahasa Indonesia"),
    ("tr", "Türkçe (Turkish)"),
    ("pl", "Polski (Polish)"),
    ("nl", "Nederlands (Dutch)"),
    ("sv", "Svenska (Swedish)"),
    ("uk", "Українська (Ukrainian)"),
];

/// Script variant of a language that shares a canonical source edition
/// with its sibling variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptVariant {
    Simplified,
    Traditional,
}

/// Returns the full table of supported languages
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_LANGUAGES
}

/// Returns true if the language code is in the supported table
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Returns the native display name for a language code
pub fn display_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Maps a requested language code onto the canonical source edition.
///
/// Both Chinese variants resolve through the single `zh` edition; every
/// other code is its own edition.
pub fn canonical_code(code: &str) -> &str {
    match code {
        "zh-tw" => "zh",
        other => other,
    }
}

/// Returns the script variant of a requested language code, if the code is
/// a variant of a shared canonical edition
pub fn script_variant(code: &str) -> Option<ScriptVariant> {
    match code {
        "zh" => Some(ScriptVariant::Simplified),
        "zh-tw" => Some(ScriptVariant::Traditional),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_is_first() {
        assert_eq!(SUPPORTED_LANGUAGES[0].0, "en");
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported("en"));
        assert!(is_supported("zh"));
        assert!(is_supported("zh-tw"));
        assert!(is_supported("uk"));

        assert!(!is_supported("tlh"));
        assert!(!is_supported(""));
        assert!(!is_supported("EN"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("en"), Some("English"));
        assert_eq!(display_name("ja"), Some("日本語 (Japanese)"));
        assert_eq!(display_name("xx"), None);
    }

    #[test]
    fn test_canonical_code() {
        assert_eq!(canonical_code("zh-tw"), "zh");
        assert_eq!(canonical_code("zh"), "zh");
        assert_eq!(canonical_code("en"), "en");
        assert_eq!(canonical_code("fr"), "fr");
    }

    #[test]
    fn test_script_variant() {
        assert_eq!(script_variant("zh"), Some(ScriptVariant::Simplified));
        assert_eq!(script_variant("zh-tw"), Some(ScriptVariant::Traditional));
        assert_eq!(script_variant("en"), None);
        assert_eq!(script_variant("ja"), None);
    }

    #[test]
    fn test_variants_share_canonical_edition() {
        for (code, _) in SUPPORTED_LANGUAGES {
            if script_variant(code).is_some() {
                assert_eq!(canonical_code(code), "zh");
            }
        }
    }
}
