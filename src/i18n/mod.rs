//! Internationalization (i18n) support
//!
//! English and Brazilian Portuguese are built in; a site can override or
//! add languages with `languages/<lang>.yml` files.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Languages embedded in the binary
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("en", include_str!("languages/en.yml")),
    ("pt-BR", include_str!("languages/pt-BR.yml")),
];

type Translations = HashMap<String, serde_yaml::Value>;

/// Internationalization handler
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, Translations>,
}

impl I18n {
    /// Create a handler with the built-in languages loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in BUILTIN_LANGUAGES {
            match serde_yaml::from_str::<Translations>(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::error!("Built-in language {} is invalid: {}", lang, e),
            }
        }

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, merging them over the
    /// built-in translations key by key
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let lang = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("en")
                .to_string();

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Translations>(&content) {
                Ok(data) => {
                    self.translations.entry(lang).or_default().extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key; nested keys use dots, e.g. "months.short"
    pub fn get(&self, key: &str) -> String {
        self.lookup(key)
            .map(yaml_value_to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Localized month name for a 1-based month number
    pub fn month_name(&self, month: u32, short: bool) -> String {
        let key = if short { "months.short" } else { "months.long" };
        let index = month.saturating_sub(1) as usize;

        self.lookup(key)
            .and_then(|v| v.as_sequence())
            .and_then(|months| months.get(index))
            .map(yaml_value_to_string)
            .unwrap_or_else(|| format!("{:02}", month))
    }

    /// All top-level string translations for the current language, with
    /// English filling the gaps
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();

        for lang in [self.language.as_str(), "en"] {
            if let Some(data) = self.translations.get(lang) {
                for (key, value) in data {
                    if !matches!(value, serde_yaml::Value::Mapping(_) | serde_yaml::Value::Sequence(_)) {
                        result
                            .entry(key.clone())
                            .or_insert_with(|| yaml_value_to_string(value));
                    }
                }
            }
        }

        result
    }

    /// Find a key in the current language, then in English
    fn lookup(&self, key: &str) -> Option<&serde_yaml::Value> {
        [self.language.as_str(), "en"].into_iter().find_map(|lang| {
            self.translations
                .get(lang)
                .and_then(|data| get_nested_value(data, key))
        })
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(data: &'a Translations, key: &str) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}
