//! Centralized naming for media files, decks and packages.
//!
//! Anki stores all media of a collection in one flat folder, so every file
//! name must be unique and filesystem-safe while staying recognizable:
//!
//! - `"Apfel"` → `Apfel_<hash8>.mp3`
//! - `"ice cream"` → `icecream_<hash8>.jpg`
//! - `"?!"` → `media_<hash8>.jpg`
//!
//! The hash is taken over the full phrase, so phrases sharing a sanitized
//! stem (`"ice cream"` / `"icecream"`) still get distinct names.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Longest sanitized stem kept in a media file name, in characters.
const MAX_STEM_CHARS: usize = 20;

/// Deck name used when nothing better can be derived.
pub const DEFAULT_DECK_NAME: &str = "WordFlash Deck";

/// First eight hex digits of the SHA-256 of `text`.
pub fn short_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{:x}", digest)[..8].to_string()
}

/// Keep alphanumerics, dashes and underscores; cap the length.
pub fn sanitize_stem(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_STEM_CHARS)
        .collect()
}

/// Media file name for a phrase: `<stem>_<hash>.<ext>`.
pub fn media_filename(phrase: &str, extension: &str) -> String {
    media_filename_keyed(phrase, phrase, extension)
}

/// Like [`media_filename`], but hashing `key` instead of the label.
///
/// Used when one label maps to several files, e.g. image candidates for the
/// same search term (keyed by URL) or the same phrase in two languages.
pub fn media_filename_keyed(label: &str, key: &str, extension: &str) -> String {
    let stem = sanitize_stem(label);
    let stem = if stem.is_empty() { "media" } else { &stem };
    format!("{}_{}.{}", stem, short_hash(key), extension)
}

/// Derive a deck name from the input file: `animals_de.yaml` → `"animals de"`.
pub fn deck_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        DEFAULT_DECK_NAME.to_string()
    } else {
        name
    }
}

/// Package file name for a deck: spaces become underscores, separators are dropped.
pub fn package_filename(deck_name: &str) -> String {
    let base: String = deck_name
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let base = if base.is_empty() {
        package_filename(DEFAULT_DECK_NAME)
            .trim_end_matches(".apkg")
            .to_string()
    } else {
        base
    };
    format!("{base}.apkg")
}
