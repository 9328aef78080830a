//! YAML input loading.
//!
//! Two document kinds are understood, each in a few shapes:
//!
//! ```yaml
//! # quiz
//! quizzes:
//!   - category: Presidents
//!     questions:
//!       - question: Who was the first US president?
//!         question_media: { text: true, audio: true }
//!         answer: George Washington
//!         answer_media: { text: true, image: true }
//!         answer_image_search_term: George Washington portrait
//!
//! # vocab
//! words:
//!   - source: Hund
//!     target: dog
//!     gender: masculine
//!     categories: [animals]
//!   - Katze: cat
//! ```
//!
//! A vocab file may also be a bare list of items or a flat `source: target`
//! mapping; a quiz file may be a bare list of blocks or a single block.
//! Declaration order is preserved everywhere (YAML mappings keep insertion
//! order).
//!
//! Structurally broken entries are not dropped here. They come out with empty
//! text so the deck builder can skip them with a warning; only an unreadable
//! or unparsable file is an error.

use crate::config::{LanguagesConfig, VocabConfig};
use crate::entry::{Category, Entry, MediaConfig};
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const UNCATEGORIZED_QUIZ: &str = "Uncategorized";
const UNCATEGORIZED_VOCAB: &str = "uncategorized";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Unsupported document layout: {0}")]
    UnsupportedShape(String),
    #[error("No entries found in {0}")]
    Empty(PathBuf),
}

/// Kind of list a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Vocab,
    Quiz,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Vocab => write!(f, "vocab"),
            ListKind::Quiz => write!(f, "quiz"),
        }
    }
}

/// One vocabulary word with its optional grammar metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordRecord {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WordRecord {
    pub fn pair(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            gender: None,
            plural: None,
            categories: vec![UNCATEGORIZED_VOCAB.to_string()],
            notes: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.source.trim().is_empty() && !self.target.trim().is_empty()
    }

    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED_VOCAB)
    }
}

/// Read and parse a YAML document.
pub fn read_document(path: &Path) -> Result<Value, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Guess the list kind: anything mentioning `quizzes` or `questions` is a quiz.
pub fn detect_kind(doc: &Value) -> ListKind {
    let is_quiz_block = |v: &Value| v.get("questions").is_some();
    match doc {
        Value::Mapping(_) if doc.get("quizzes").is_some() || is_quiz_block(doc) => ListKind::Quiz,
        Value::Sequence(items) if items.iter().any(is_quiz_block) => ListKind::Quiz,
        _ => ListKind::Vocab,
    }
}

/// Load a document into categories, detecting the kind unless one is given.
pub fn load_categories(
    path: &Path,
    kind: Option<ListKind>,
    languages: &LanguagesConfig,
    vocab: &VocabConfig,
) -> Result<(ListKind, Vec<Category>), LoadError> {
    let doc = read_document(path)?;
    let kind = kind.unwrap_or_else(|| detect_kind(&doc));
    let categories = match kind {
        ListKind::Quiz => parse_quiz(&doc, languages)?,
        ListKind::Vocab => vocab_categories(&parse_vocabulary(&doc)?, vocab, languages),
    };
    if categories.iter().all(|c| c.entries.is_empty()) {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    log::info!(
        "Loaded {} {} entries in {} categories from {}",
        crate::entry::entry_count(&categories),
        kind,
        categories.len(),
        path.display()
    );
    Ok((kind, categories))
}

/// Load a vocabulary document as word records (used by `analyze`).
pub fn load_vocabulary(path: &Path) -> Result<Vec<WordRecord>, LoadError> {
    let doc = read_document(path)?;
    let words = parse_vocabulary(&doc)?;
    if words.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(words)
}

// =============================================================================
// Quiz documents
// =============================================================================

/// Parse a quiz document into categories, one per block.
pub fn parse_quiz(doc: &Value, languages: &LanguagesConfig) -> Result<Vec<Category>, LoadError> {
    let blocks: Vec<&Value> = match doc {
        Value::Mapping(_) => match doc.get("quizzes") {
            Some(Value::Sequence(items)) => items.iter().collect(),
            Some(_) => {
                return Err(LoadError::UnsupportedShape(
                    "`quizzes` must be a list".into(),
                ));
            }
            None => vec![doc],
        },
        Value::Sequence(items) => items.iter().collect(),
        _ => {
            return Err(LoadError::UnsupportedShape(
                "quiz file must be a mapping or a list".into(),
            ));
        }
    };

    let mut categories = Vec::new();
    for block in blocks {
        let Some(questions) = block.get("questions") else {
            log::debug!("Ignoring quiz block without questions");
            continue;
        };
        let name = block
            .get("category")
            .and_then(scalar_string)
            .unwrap_or_else(|| UNCATEGORIZED_QUIZ.to_string());
        let entries = match questions {
            Value::Sequence(items) => items
                .iter()
                .map(|item| parse_question(item, &name, languages))
                .collect(),
            _ => Vec::new(),
        };
        categories.push(Category::new(name, entries));
    }
    Ok(categories)
}

fn parse_question(item: &Value, category: &str, languages: &LanguagesConfig) -> Entry {
    let field = |key: &str| item.get(key).and_then(scalar_string);

    let answer_media_value = item.get("answer_media");
    let image_search_term = field("answer_image_search_term")
        .or_else(|| field("image_search_term"))
        .or_else(|| {
            answer_media_value
                .and_then(|m| m.get("image_search_term"))
                .and_then(scalar_string)
        });
    let question_image_search_term = field("question_image_search_term").or_else(|| {
        item.get("question_media")
            .and_then(|m| m.get("image_search_term"))
            .and_then(scalar_string)
    });

    Entry {
        question: field("question").unwrap_or_default(),
        question_media: parse_media(item.get("question_media")),
        answer: field("answer").unwrap_or_default(),
        answer_media: parse_media(answer_media_value),
        image_search_term,
        question_image_search_term,
        question_lang: Some(field("question_lang").unwrap_or_else(|| languages.source.clone())),
        answer_lang: Some(field("answer_lang").unwrap_or_else(|| languages.target.clone())),
        tags: vec![tag_from(category)],
        notes: field("notes"),
    }
}

/// Overlay the boolean keys of a media map onto the text-only default.
fn parse_media(value: Option<&Value>) -> MediaConfig {
    let mut media = MediaConfig::default();
    let Some(value) = value else {
        return media;
    };
    if let Some(b) = value.get("text").and_then(Value::as_bool) {
        media.text = b;
    }
    if let Some(b) = value.get("audio").and_then(Value::as_bool) {
        media.audio = b;
    }
    if let Some(b) = value.get("image").and_then(Value::as_bool) {
        media.image = b;
    }
    media
}

// =============================================================================
// Vocabulary documents
// =============================================================================

/// Parse a vocabulary document into word records, in file order.
pub fn parse_vocabulary(doc: &Value) -> Result<Vec<WordRecord>, LoadError> {
    match doc {
        Value::Mapping(map) => match doc.get("words") {
            Some(Value::Sequence(items)) => Ok(items.iter().map(parse_word_item).collect()),
            Some(_) => Err(LoadError::UnsupportedShape(
                "`words` must be a list".into(),
            )),
            None => Ok(map
                .iter()
                .map(|(source, target)| {
                    WordRecord::pair(
                        scalar_string(source).unwrap_or_default(),
                        scalar_string(target).unwrap_or_default(),
                    )
                })
                .collect()),
        },
        Value::Sequence(items) => Ok(items.iter().map(parse_word_item).collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(LoadError::UnsupportedShape(
            "vocabulary file must be a mapping or a list".into(),
        )),
    }
}

fn parse_word_item(item: &Value) -> WordRecord {
    let Value::Mapping(map) = item else {
        return WordRecord::pair("", "");
    };
    if item.get("source").is_some() || item.get("target").is_some() {
        let field = |key: &str| item.get(key).and_then(scalar_string);
        let categories = match item.get("categories") {
            Some(Value::Sequence(list)) => list.iter().filter_map(scalar_string).collect(),
            Some(other) => scalar_string(other).into_iter().collect(),
            None => Vec::new(),
        };
        return WordRecord {
            source: field("source").unwrap_or_default(),
            target: field("target").unwrap_or_default(),
            gender: field("gender"),
            plural: field("plural"),
            categories: if categories.is_empty() {
                vec![UNCATEGORIZED_VOCAB.to_string()]
            } else {
                categories
            },
            notes: field("notes"),
        };
    }
    match map.iter().next() {
        Some((source, target)) if map.len() == 1 => WordRecord::pair(
            scalar_string(source).unwrap_or_default(),
            scalar_string(target).unwrap_or_default(),
        ),
        _ => WordRecord::pair("", ""),
    }
}

/// Turn word records into categories of cards.
///
/// The front shows the translation (searched as an image), the back the
/// source word. Consecutive words sharing a primary category form one
/// category so file order is kept exactly.
pub fn vocab_categories(
    words: &[WordRecord],
    vocab: &VocabConfig,
    languages: &LanguagesConfig,
) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    for word in words {
        let entry = Entry {
            question: word.target.clone(),
            question_media: vocab.front,
            answer: word.source.clone(),
            answer_media: vocab.back,
            image_search_term: None,
            question_image_search_term: None,
            question_lang: Some(languages.target.clone()),
            answer_lang: Some(languages.source.clone()),
            tags: word.categories.iter().map(|c| tag_from(c)).collect(),
            notes: word_notes(word),
        };
        match categories.last_mut() {
            Some(last) if last.name == word.primary_category() => last.entries.push(entry),
            _ => categories.push(Category::new(word.primary_category(), vec![entry])),
        }
    }
    categories
}

fn word_notes(word: &WordRecord) -> Option<String> {
    let parts: Vec<String> = [
        word.gender.as_ref().map(|g| format!("gender: {g}")),
        word.plural.as_ref().map(|p| format!("plural: {p}")),
        word.notes.clone(),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

// =============================================================================
// Helpers
// =============================================================================

/// Render a YAML scalar as a string. Numbers and booleans are accepted
/// because word lists happily contain `1: one` or `yes: ja`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Anki tags cannot contain spaces.
fn tag_from(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_category, fixture_path, questions};

    fn langs() -> LanguagesConfig {
        LanguagesConfig::default()
    }

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    // =========================================================================
    // Kind detection
    // =========================================================================

    #[test]
    fn detect_quiz_documents() {
        assert_eq!(detect_kind(&doc("quizzes: []")), ListKind::Quiz);
        assert_eq!(detect_kind(&doc("questions: []")), ListKind::Quiz);
        assert_eq!(
            detect_kind(&doc("- category: A\n  questions: []")),
            ListKind::Quiz
        );
    }

    #[test]
    fn detect_vocab_documents() {
        assert_eq!(detect_kind(&doc("Hund: dog")), ListKind::Vocab);
        assert_eq!(detect_kind(&doc("words: []")), ListKind::Vocab);
        assert_eq!(detect_kind(&doc("- Hund: dog")), ListKind::Vocab);
    }

    // =========================================================================
    // Quiz parsing
    // =========================================================================

    #[test]
    fn quiz_blocks_keep_order_and_media() {
        let categories = parse_quiz(
            &doc(r#"
quizzes:
  - category: Presidents
    questions:
      - question: Who was the first US president?
        question_media: { audio: true }
        answer: George Washington
        answer_media: { text: true, image: true, image_search_term: Washington portrait }
      - question: Who freed the slaves?
        answer: Abraham Lincoln
  - category: Capitals
    questions:
      - question: Capital of France?
        answer: Paris
"#),
            &langs(),
        )
        .unwrap();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Presidents");
        assert_eq!(categories[1].name, "Capitals");

        let first = &categories[0].entries[0];
        assert_eq!(first.answer, "George Washington");
        assert!(first.question_media.text && first.question_media.audio);
        assert!(first.answer_media.image);
        assert_eq!(first.image_search_term.as_deref(), Some("Washington portrait"));
        assert_eq!(first.tags, vec!["Presidents"]);

        assert_eq!(categories[0].entries[1].answer, "Abraham Lincoln");
        assert_eq!(categories[0].entries[1].answer_media, MediaConfig::default());
    }

    #[test]
    fn quiz_single_block_and_defaults() {
        let categories = parse_quiz(
            &doc(r#"
questions:
  - question: 2 + 2
    answer: 4
"#),
            &langs(),
        )
        .unwrap();
        assert_eq!(categories[0].name, "Uncategorized");
        let entry = &categories[0].entries[0];
        assert_eq!(entry.answer, "4");
        assert_eq!(entry.question_lang.as_deref(), Some("de"));
        assert_eq!(entry.answer_lang.as_deref(), Some("en"));
    }

    #[test]
    fn quiz_entry_languages_override_defaults() {
        let categories = parse_quiz(
            &doc(r#"
questions:
  - question: Bonjour?
    question_lang: fr
    answer: Hello
"#),
            &langs(),
        )
        .unwrap();
        assert_eq!(categories[0].entries[0].question_lang.as_deref(), Some("fr"));
    }

    #[test]
    fn quiz_answer_search_term_aliases() {
        let categories = parse_quiz(
            &doc(r#"
questions:
  - question: Q1
    answer: A1
    answer_image_search_term: first
  - question: Q2
    answer: A2
    image_search_term: second
  - question: Q3
    answer: A3
    question_image_search_term: third
"#),
            &langs(),
        )
        .unwrap();
        let entries = &categories[0].entries;
        assert_eq!(entries[0].image_search_term.as_deref(), Some("first"));
        assert_eq!(entries[1].image_search_term.as_deref(), Some("second"));
        assert_eq!(entries[2].question_image_search_term.as_deref(), Some("third"));
        assert!(entries[2].image_search_term.is_none());
    }

    #[test]
    fn quiz_malformed_entries_are_kept_empty() {
        let categories = parse_quiz(
            &doc(r#"
questions:
  - question: Has no answer
  - just a string
  - question: Fine
    answer: Yes
"#),
            &langs(),
        )
        .unwrap();
        let entries = &categories[0].entries;
        assert_eq!(entries.len(), 3);
        assert!(entries[0].validate().is_err());
        assert!(entries[1].validate().is_err());
        assert!(entries[2].validate().is_ok());
    }

    #[test]
    fn quiz_block_without_questions_is_ignored() {
        let categories = parse_quiz(
            &doc(r#"
- category: Empty
- category: Real
  questions:
    - question: Q
      answer: A
"#),
            &langs(),
        )
        .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Real");
    }

    #[test]
    fn quiz_category_becomes_tag_without_spaces() {
        let categories = parse_quiz(
            &doc(r#"
category: World Capitals
questions:
  - question: Q
    answer: A
"#),
            &langs(),
        )
        .unwrap();
        assert_eq!(categories[0].entries[0].tags, vec!["World_Capitals"]);
    }

    #[test]
    fn quiz_scalar_document_is_unsupported() {
        assert!(matches!(
            parse_quiz(&doc("just text"), &langs()),
            Err(LoadError::UnsupportedShape(_))
        ));
    }

    // =========================================================================
    // Vocabulary parsing
    // =========================================================================

    #[test]
    fn vocab_flat_mapping_keeps_order() {
        let words = parse_vocabulary(&doc("Hund: dog\nKatze: cat\nApfel: apple")).unwrap();
        let sources: Vec<&str> = words.iter().map(|w| w.source.as_str()).collect();
        assert_eq!(sources, vec!["Hund", "Katze", "Apfel"]);
        assert_eq!(words[2].target, "apple");
    }

    #[test]
    fn vocab_enhanced_items() {
        let words = parse_vocabulary(&doc(r#"
words:
  - source: Hund
    target: dog
    gender: masculine
    plural: Hunde
    categories: [animals, pets]
  - Katze: cat
  - source: Wal
    target: whale
    categories: sea_animals
"#))
        .unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].gender.as_deref(), Some("masculine"));
        assert_eq!(words[0].categories, vec!["animals", "pets"]);
        assert_eq!(words[1].categories, vec!["uncategorized"]);
        assert_eq!(words[2].categories, vec!["sea_animals"]);
    }

    #[test]
    fn vocab_numbers_become_text() {
        let words = parse_vocabulary(&doc("- eins: 1")).unwrap();
        assert_eq!(words[0].target, "1");
    }

    #[test]
    fn vocab_broken_items_are_incomplete() {
        let words = parse_vocabulary(&doc(r#"
- source: Hund
- {a: 1, b: 2}
- 42
"#))
        .unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| !w.is_complete()));
    }

    #[test]
    fn vocab_categories_group_consecutive_words() {
        let words = vec![
            WordRecord {
                categories: vec!["animals".into()],
                ..WordRecord::pair("Hund", "dog")
            },
            WordRecord {
                categories: vec!["animals".into()],
                ..WordRecord::pair("Katze", "cat")
            },
            WordRecord {
                categories: vec!["food".into()],
                ..WordRecord::pair("Brot", "bread")
            },
            WordRecord {
                categories: vec!["animals".into()],
                ..WordRecord::pair("Maus", "mouse")
            },
        ];
        let categories = vocab_categories(&words, &VocabConfig::default(), &langs());
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["animals", "food", "animals"]);
        assert_eq!(categories[0].entries.len(), 2);
    }

    #[test]
    fn vocab_entry_layout() {
        let word = WordRecord {
            gender: Some("masculine".into()),
            plural: Some("Hunde".into()),
            ..WordRecord::pair("Hund", "dog")
        };
        let categories = vocab_categories(&[word], &VocabConfig::default(), &langs());
        let entry = &categories[0].entries[0];
        assert_eq!(entry.question, "dog");
        assert_eq!(entry.answer, "Hund");
        assert!(entry.question_media.image);
        assert!(entry.answer_media.audio);
        assert_eq!(entry.answer_lang.as_deref(), Some("de"));
        assert_eq!(
            entry.notes.as_deref(),
            Some("gender: masculine; plural: Hunde")
        );
    }

    // =========================================================================
    // File loading
    // =========================================================================

    #[test]
    fn load_quiz_fixture() {
        let (kind, categories) = load_categories(
            &fixture_path("quiz.yaml"),
            None,
            &langs(),
            &VocabConfig::default(),
        )
        .unwrap();
        assert_eq!(kind, ListKind::Quiz);
        assert_eq!(categories[0].name, "Presidents");
        assert_eq!(categories[1].name, "Capitals");

        let presidents = find_category(&categories, "Presidents");
        assert_eq!(presidents.entries.len(), 3);
        assert_eq!(
            presidents.entries[0].image_search_term.as_deref(),
            Some("George Washington portrait")
        );
        let capitals = find_category(&categories, "Capitals");
        assert_eq!(
            questions(capitals),
            ["What is the capital of France?", "What is the capital of Japan?"]
        );
        assert_eq!(capitals.entries[0].answer_lang.as_deref(), Some("fr"));
        assert_eq!(capitals.entries[1].answer_lang.as_deref(), Some("en"));
    }

    #[test]
    fn load_vocab_fixture() {
        let (kind, categories) = load_categories(
            &fixture_path("animals_de.yaml"),
            None,
            &langs(),
            &VocabConfig::default(),
        )
        .unwrap();
        assert_eq!(kind, ListKind::Vocab);
        assert_eq!(categories[0].entries[0].answer, "Hund");
        assert_eq!(questions(find_category(&categories, "animals")), ["dog", "cat", "horse"]);
        assert_eq!(questions(find_category(&categories, "farm")), ["cow"]);
        assert_eq!(find_category(&categories, "uncategorized").entries[0].answer, "Apfel");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = load_vocabulary(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn load_empty_document_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("empty.yaml");
        fs::write(&path, "").unwrap();
        assert!(matches!(load_vocabulary(&path), Err(LoadError::Empty(_))));
    }

    #[test]
    fn load_invalid_yaml_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "words: [unclosed").unwrap();
        assert!(matches!(load_vocabulary(&path), Err(LoadError::Yaml(_))));
    }
}
