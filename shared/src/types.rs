//! Common types for the shared crate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text keyed by language code (e.g. `{"en": "Noodles", "zh": "面条"}`)
///
/// The remote API delivers every display string in this form. Lookup
/// falls back to English, then to any available translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    /// Build from a single English string (test and fixture helper)
    pub fn en(text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("en".to_string(), text.into());
        Self(map)
    }

    /// Resolve for a display language, falling back to `en`, then to
    /// the first available entry
    pub fn get(&self, lang: Language) -> &str {
        self.0
            .get(lang.as_str())
            .or_else(|| self.0.get("en"))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Display language supported by the frontend bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    It,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::It => "it",
        }
    }

    /// Parse a stored language tag, `None` for unsupported tags
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Language::En),
            "zh" => Some(Language::Zh),
            "it" => Some(Language::It),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display symbol for a store currency code
///
/// Fixed lookup table, case-insensitive. Unknown codes render as `$`.
pub fn currency_symbol(code: &str) -> &'static str {
    match code.to_ascii_uppercase().as_str() {
        "USD" | "CAD" | "AUD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "RUB" => "₽",
        _ => "$",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_text_fallback() {
        let mut map = BTreeMap::new();
        map.insert("zh".to_string(), "面条".to_string());
        map.insert("en".to_string(), "Noodles".to_string());
        let text = LocalizedText(map);

        assert_eq!(text.get(Language::Zh), "面条");
        assert_eq!(text.get(Language::It), "Noodles");

        let zh_only = LocalizedText(BTreeMap::from([("zh".to_string(), "面".to_string())]));
        assert_eq!(zh_only.get(Language::En), "面");
        assert_eq!(LocalizedText::default().get(Language::En), "");
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("gbp"), "£");
        assert_eq!(currency_symbol("JPY"), "¥");
        assert_eq!(currency_symbol("cny"), "¥");
        assert_eq!(currency_symbol("RUB"), "₽");
        assert_eq!(currency_symbol("CHF"), "$");
        assert_eq!(currency_symbol(""), "$");
    }

    #[test]
    fn test_language_round_trip() {
        for lang in [Language::En, Language::Zh, Language::It] {
            assert_eq!(Language::parse(lang.as_str()), Some(lang));
        }
        assert_eq!(Language::parse("fr"), None);
    }
}
