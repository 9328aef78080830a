//! Entry model shared by the loader, the resolver and the deck builder.
//!
//! An [`Entry`] is one question/answer pair (or one vocabulary word) with an
//! independent [`MediaConfig`] per side. Entries are immutable once loaded;
//! [`Category`] keeps them in file order, and that order is the card order of
//! the final deck.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntryError {
    #[error("question text is empty")]
    MissingQuestion,
    #[error("answer text is empty")]
    MissingAnswer,
}

/// Which kinds of media a card face should carry.
///
/// Keys missing from an input document fall back to text-only, so a bare
/// `question_media: { image: true }` still shows the question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub text: bool,
    pub audio: bool,
    pub image: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            text: true,
            audio: false,
            image: false,
        }
    }
}

impl MediaConfig {
    /// A face with nothing on it. Legal, renders as an empty side.
    pub const fn none() -> Self {
        Self {
            text: false,
            audio: false,
            image: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.text || self.audio || self.image)
    }
}

/// One question/answer pair with per-side media configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub question: String,
    pub question_media: MediaConfig,
    pub answer: String,
    pub answer_media: MediaConfig,
    /// Search phrase for the answer-side image. Falls back to the answer text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_search_term: Option<String>,
    /// Search phrase for the question-side image. Falls back to the question text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image_search_term: Option<String>,
    /// TTS language for the question side, overriding the run default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_lang: Option<String>,
    /// TTS language for the answer side, overriding the run default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entry {
    /// Plain text-only entry. Mostly useful for tests and simple callers.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            question_media: MediaConfig::default(),
            answer: answer.into(),
            answer_media: MediaConfig::default(),
            image_search_term: None,
            question_image_search_term: None,
            question_lang: None,
            answer_lang: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    pub fn with_media(mut self, question_media: MediaConfig, answer_media: MediaConfig) -> Self {
        self.question_media = question_media;
        self.answer_media = answer_media;
        self
    }

    /// An entry is usable when both sides have text to show or search for.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.question.trim().is_empty() {
            return Err(EntryError::MissingQuestion);
        }
        if self.answer.trim().is_empty() {
            return Err(EntryError::MissingAnswer);
        }
        Ok(())
    }

    /// Short label for progress output: the question, cut at 60 characters.
    pub fn label(&self) -> String {
        let text = if self.question.trim().is_empty() {
            self.answer.trim()
        } else {
            self.question.trim()
        };
        match text.char_indices().nth(60) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }
}

/// A named, ordered group of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Category {
    pub fn new(name: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

/// Total entry count across categories.
pub fn entry_count(categories: &[Category]) -> usize {
    categories.iter().map(|c| c.entries.len()).sum()
}
