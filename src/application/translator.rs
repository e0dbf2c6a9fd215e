// Port for the locale/translation provider
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    pub fn parse(value: &str) -> Language {
        match value {
            "hindi" => Language::Hindi,
            _ => Language::English,
        }
    }
}

/// Key-based string lookup. The pipeline never hardcodes user-facing text;
/// warning and recommendation strings are assembled from keys resolved
/// through this provider.
pub trait Translator: Send + Sync {
    fn translate(&self, language: Language, key: &str) -> String;
}
