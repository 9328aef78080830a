//! Run configuration.
//!
//! Handles loading, validating, and merging `wordflash.toml`. Stock defaults
//! are serialized to a TOML table, the user file is merged on top, and the
//! result is deserialized and validated. Command-line flags are applied last
//! by the binary.
//!
//! ## Config File Location
//!
//! `wordflash.toml` is picked up from the directory of the input file, or
//! passed explicitly with `--config`:
//!
//! ```text
//! lists/
//! ├── wordflash.toml          # Run config (optional)
//! ├── animals.yaml            # Vocabulary list
//! └── presidents.yaml         # Quiz list
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [approval]
//! mode = "auto"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::entry::MediaConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up next to the input document.
pub const CONFIG_FILENAME: &str = "wordflash.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(std::path::PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full run configuration. Every field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WordflashConfig {
    /// Deck naming and output location.
    pub deck: DeckConfig,
    /// Default speech languages.
    pub languages: LanguagesConfig,
    /// Image approval behaviour.
    pub approval: ApprovalConfig,
    /// Image search settings.
    pub images: ImagesConfig,
    /// Speech synthesis settings.
    pub audio: AudioConfig,
    /// Card layout for vocabulary lists.
    pub vocab: VocabConfig,
    /// Media cache shared across runs.
    pub cache: CacheConfig,
}

impl WordflashConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deck.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "deck.output_dir must not be empty".into(),
            ));
        }
        if let Some(name) = &self.deck.name
            && name.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "deck.name must not be blank".into(),
            ));
        }
        if self.languages.source.trim().is_empty() || self.languages.target.trim().is_empty() {
            return Err(ConfigError::Validation(
                "languages.source and languages.target must be set".into(),
            ));
        }
        if !(3..=200).contains(&self.images.per_page) {
            return Err(ConfigError::Validation(
                "images.per_page must be 3-200".into(),
            ));
        }
        if self.images.timeout_secs == 0 || self.audio.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be at least one second".into(),
            ));
        }
        if self.cache.enabled && self.cache.dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cache.dir must be set when the cache is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    /// Deck name. When absent, derived from the input file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Directory receiving the `.apkg` file.
    pub output_dir: String,
    /// Keep downloaded media next to the package instead of deleting it.
    pub keep_media: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            name: None,
            output_dir: "output".to_string(),
            keep_media: false,
        }
    }
}

/// Speech languages.
///
/// Vocabulary: the source word is spoken in `source`, the translation in
/// `target`. Quizzes: questions default to `source`, answers to `target`;
/// entries may override either with `question_lang` / `answer_lang`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguagesConfig {
    pub source: String,
    pub target: String,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            source: "de".to_string(),
            target: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Show each candidate and ask the operator.
    #[default]
    Interactive,
    /// Take the first candidate without asking.
    Auto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApprovalConfig {
    pub mode: ApprovalMode,
    /// Image viewer command. When absent the platform opener is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Master switch for image lookup. Entries asking for images get none.
    pub enabled: bool,
    /// Pixabay API key. `PIXABAY_API_KEY` in the environment wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixabay_key: Option<String>,
    /// Number of Pixabay hits offered as candidates (Pixabay allows 3-200).
    pub per_page: u32,
    /// Append Unsplash and Picsum candidates after the Pixabay hits.
    pub fallbacks: bool,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pixabay_key: None,
            per_page: 3,
            fallbacks: true,
            timeout_secs: 30,
        }
    }
}

/// Which phrase the speech synthesizer reads for a face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// The face text verbatim.
    #[default]
    Text,
    /// The image search term of that face, falling back to the text.
    SearchTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub enabled: bool,
    pub source: AudioSource,
    /// Ask the TTS service for slower speech.
    pub slow: bool,
    pub timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: AudioSource::Text,
            slow: false,
            timeout_secs: 30,
        }
    }
}

/// Face layout for vocabulary entries: the front shows the translation
/// (as a picture by default), the back shows and speaks the source word.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VocabConfig {
    pub front: MediaConfig,
    pub back: MediaConfig,
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            front: MediaConfig {
                text: false,
                audio: false,
                image: true,
            },
            back: MediaConfig {
                text: true,
                audio: true,
                image: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory, relative to the working directory of the process.
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: ".wordflash-cache".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WordflashConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<WordflashConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: WordflashConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `wordflash.toml` from `dir`, or the stock defaults if there is none.
pub fn load_config(dir: &Path) -> Result<WordflashConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return resolve_config(None);
    }
    load_config_file(&config_path)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<WordflashConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `wordflash.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# WordFlash Configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Place this file next to your word list as wordflash.toml, or pass
# --config <file>. Command-line flags override anything set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Deck
# ---------------------------------------------------------------------------
[deck]
# Deck name shown in Anki. Defaults to the input file name
# (animals_de.yaml -> "animals de").
# name = "German Animals"

# Directory receiving the generated .apkg file.
output_dir = "output"

# Keep downloaded images and audio in <output_dir>/media after the run.
keep_media = false

# ---------------------------------------------------------------------------
# Speech languages
# ---------------------------------------------------------------------------
[languages]
# Vocabulary: the word you are learning is spoken in `source`.
# Quizzes: questions default to `source`, answers to `target`.
source = "de"
target = "en"

# ---------------------------------------------------------------------------
# Image approval
# ---------------------------------------------------------------------------
[approval]
# "interactive" shows every candidate image and asks y / n / skip.
# "auto" takes the first search result without asking.
mode = "interactive"

# Command used to show candidates. Defaults to xdg-open / open / start.
# viewer = "feh"

# ---------------------------------------------------------------------------
# Image search
# ---------------------------------------------------------------------------
[images]
enabled = true

# Pixabay API key. The PIXABAY_API_KEY environment variable wins.
# pixabay_key = "..."

# Pixabay results offered per entry (3-200).
per_page = 3

# Offer Unsplash and Picsum images after the Pixabay results.
fallbacks = true

timeout_secs = 30

# ---------------------------------------------------------------------------
# Pronunciation audio
# ---------------------------------------------------------------------------
[audio]
enabled = true

# Which phrase is spoken: "text" reads the card text verbatim,
# "search_term" reads the image search term when the entry has one.
source = "text"

slow = false
timeout_secs = 30

# ---------------------------------------------------------------------------
# Vocabulary card layout
# ---------------------------------------------------------------------------
[vocab.front]
text = false
audio = false
image = true

[vocab.back]
text = true
audio = true
image = false

# ---------------------------------------------------------------------------
# Media cache (approved images and synthesized audio are reused across runs)
# ---------------------------------------------------------------------------
[cache]
enabled = true
dir = ".wordflash-cache"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = WordflashConfig::default();
        assert_eq!(config.deck.output_dir, "output");
        assert!(config.deck.name.is_none());
        assert_eq!(config.languages.source, "de");
        assert_eq!(config.approval.mode, ApprovalMode::Interactive);
        assert_eq!(config.images.per_page, 3);
        assert_eq!(config.audio.source, AudioSource::Text);
        assert!(config.cache.enabled);
    }

    #[test]
    fn default_vocab_layout_is_picture_front() {
        let vocab = VocabConfig::default();
        assert!(vocab.front.image && !vocab.front.text);
        assert!(vocab.back.text && vocab.back.audio);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[approval]
mode = "auto"
"#;
        let config: WordflashConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.approval.mode, ApprovalMode::Auto);
        // Defaults preserved
        assert_eq!(config.images.per_page, 3);
        assert_eq!(config.deck.output_dir, "output");
    }

    #[test]
    fn parse_audio_source_search_term() {
        let toml = r#"
[audio]
source = "search_term"
"#;
        let config: WordflashConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.audio.source, AudioSource::SearchTerm);
        assert!(config.audio.enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[images]
perpage = 5
"#;
        assert!(toml::from_str::<WordflashConfig>(toml).is_err());
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let value = stock_defaults_value();
        let table = value.as_table().unwrap();
        assert!(table.contains_key("deck"));
        assert!(table.contains_key("vocab"));
        // Optional values are omitted rather than serialized
        assert!(!table["deck"].as_table().unwrap().contains_key("name"));
    }

    #[test]
    fn merge_toml_overrides_nested_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[deck]
output_dir = "output"
keep_media = false
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[deck]
keep_media = true
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let deck = merged["deck"].as_table().unwrap();
        assert_eq!(deck["output_dir"].as_str(), Some("output"));
        assert_eq!(deck["keep_media"].as_bool(), Some(true));
    }

    #[test]
    fn resolve_config_with_vocab_override() {
        let overlay: toml::Value = toml::from_str(
            r#"
[vocab.front]
text = true
"#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        // Overlay merged over the stock front layout, not over MediaConfig::default()
        assert!(config.vocab.front.text);
        assert!(config.vocab.front.image);
    }

    #[test]
    fn validate_rejects_per_page_out_of_range() {
        let mut config = WordflashConfig::default();
        config.images.per_page = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_deck_name() {
        let mut config = WordflashConfig::default();
        config.deck.name = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = WordflashConfig::default();
        config.audio.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.deck.output_dir, "output");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[deck]
name = "Animals"

[languages]
source = "fr"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.deck.name.as_deref(), Some("Animals"));
        assert_eq!(config.languages.source, "fr");
        assert_eq!(config.languages.target, "en");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_file_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_from_fixture_dir() {
        let tmp = crate::test_helpers::setup_fixtures();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.approval.mode, ApprovalMode::Auto);
        assert_eq!(config.deck.output_dir, "decks");
        assert!(!config.images.fallbacks);
        assert!(config.images.enabled);

        fs::remove_file(tmp.path().join(CONFIG_FILENAME)).unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.approval.mode, ApprovalMode::Interactive);
    }

    #[test]
    fn stock_config_toml_is_valid() {
        let config: WordflashConfig = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.images.per_page, 3);
        assert_eq!(config.vocab.front, VocabConfig::default().front);
    }
}
