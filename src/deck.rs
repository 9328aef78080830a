//! Deck building.
//!
//! Walks categories and their entries in file order, resolves both faces of
//! every entry, assembles the card and appends it. The resulting deck has
//! exactly the input order minus the entries that were skipped.
//!
//! An entry that fails validation is skipped with a [`BuildWarning`]; the
//! run carries on. Media problems never skip an entry, they only leave a
//! face without that medium (see [`crate::resolve`]).
//!
//! Progress is reported through a [`BuildEvent`] callback so the binary can
//! print it without the builder knowing about the terminal.

use crate::card::{Card, assemble};
use crate::config::LanguagesConfig;
use crate::entry::{Category, Entry, entry_count};
use crate::naming::deck_name_from_path;
use crate::resolve::MediaResolver;
use std::fmt;
use std::path::{Path, PathBuf};

/// Ordered cards of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every media file referenced by the deck, first use first, no duplicates.
    pub fn media_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = Vec::new();
        for path in self.cards.iter().flat_map(Card::media_paths) {
            if !files.iter().any(|f| f == path) {
                files.push(path.to_path_buf());
            }
        }
        files
    }
}

/// A skipped entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildWarning {
    pub category: String,
    /// Position of the entry inside its category, starting at 1.
    pub index: usize,
    pub message: String,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}: {}", self.category, self.index, self.message)
    }
}

#[derive(Debug)]
pub enum BuildEvent<'a> {
    EntryStarted {
        /// 1-based position over the whole run.
        position: usize,
        total: usize,
        category: &'a str,
        label: String,
    },
    MediaResolved {
        position: usize,
        card: &'a Card,
    },
    EntrySkipped {
        position: usize,
        warning: &'a BuildWarning,
    },
}

#[derive(Debug)]
pub struct BuildReport {
    pub deck: Deck,
    pub warnings: Vec<BuildWarning>,
}

/// Deck name: explicit name if given, otherwise derived from the input file.
pub fn deck_name(explicit: Option<&str>, input: &Path) -> String {
    explicit
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| deck_name_from_path(input))
}

/// Build a deck from `categories`.
///
/// Faces without an explicit language use `languages.source` for the
/// question and `languages.target` for the answer.
pub fn build<F>(
    name: &str,
    categories: &[Category],
    resolver: &mut MediaResolver<'_>,
    languages: &LanguagesConfig,
    mut on_event: F,
) -> BuildReport
where
    F: FnMut(BuildEvent<'_>),
{
    let total = entry_count(categories);
    let mut deck = Deck::new(name);
    let mut warnings = Vec::new();
    let mut position = 0;

    for category in categories {
        for (i, entry) in category.entries.iter().enumerate() {
            position += 1;
            on_event(BuildEvent::EntryStarted {
                position,
                total,
                category: &category.name,
                label: entry.label(),
            });

            if let Err(e) = entry.validate() {
                let warning = BuildWarning {
                    category: category.name.clone(),
                    index: i + 1,
                    message: format!("skipped, {e}"),
                };
                log::warn!("{}", warning);
                on_event(BuildEvent::EntrySkipped {
                    position,
                    warning: &warning,
                });
                warnings.push(warning);
                continue;
            }

            let card = build_card(entry, resolver, languages);
            on_event(BuildEvent::MediaResolved {
                position,
                card: &card,
            });
            deck.cards.push(card);
        }
    }

    log::info!(
        "Built deck '{}' with {} cards ({} skipped)",
        deck.name,
        deck.len(),
        warnings.len()
    );
    BuildReport { deck, warnings }
}

fn build_card(entry: &Entry, resolver: &mut MediaResolver<'_>, languages: &LanguagesConfig) -> Card {
    let question_lang = entry.question_lang.as_deref().unwrap_or(&languages.source);
    let answer_lang = entry.answer_lang.as_deref().unwrap_or(&languages.target);
    let front = resolver.resolve(
        &entry.question,
        &entry.question_media,
        entry.question_image_search_term.as_deref(),
        question_lang,
    );
    let back = resolver.resolve(
        &entry.answer,
        &entry.answer_media,
        entry.image_search_term.as_deref(),
        answer_lang,
    );
    assemble(front, back).with_tags(entry.tags.clone())
}
