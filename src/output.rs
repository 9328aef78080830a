//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is **content-centric, not file-centric**. Every entity (category,
//! entry, note) is shown by positional index and its own text, with media
//! file names as indented context lines. This keeps the output readable as
//! an inventory of the deck while still showing where each file came from.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Quiz: lists/presidents.yaml
//! 001 Presidents (2 entries)
//!     001 Who was the first US president? → George Washington
//!         Front: text, audio | Back: text, image
//!     002 (empty) → Abraham Lincoln
//!         Invalid: question text is empty
//! ```
//!
//! ## Build
//!
//! ```text
//! [001/120] animals: dog
//!     Image: dog_1a2b3c4d.jpg
//!     Audio: Hund_5e6f7a8b.mp3
//! [002/120] animals: (empty)
//!     Skipped: answer text is empty
//!
//! Wrote output/animals_de.apkg (119 cards, 238 media files)
//! Media cache: 80 reused, 158 fetched (238 total)
//! Skipped 1 entry
//!     animals #2: skipped, answer text is empty
//! ```
//!
//! ## Inspect
//!
//! ```text
//! Deck: animals de (119 notes, 238 media files)
//! 001 dog → Hund
//!     Media: dog_1a2b3c4d.jpg, Hund_5e6f7a8b.mp3
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::analyze::Analysis;
use crate::cache::CacheStats;
use crate::deck::{BuildEvent, BuildWarning};
use crate::entry::{Category, MediaConfig};
use crate::loader::{ListKind, WordRecord};
use crate::package::{PackageContents, PackageSummary, plain_text};
use crate::store::UpsertSummary;
use std::path::Path;

/// Multi-category words listed before the output is cut short.
const MULTI_CATEGORY_SHOWN: usize = 20;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Singular or plural noun for a count: `1 entry`, `2 entries`.
fn count_noun(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

/// Format a category header: positional index + name + entry count.
///
/// ```text
/// 001 Presidents (5 entries)
/// ```
fn category_header(index: usize, name: &str, count: usize) -> String {
    format!(
        "{} {} ({})",
        format_index(index),
        name,
        count_noun(count, "entry", "entries")
    )
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Display text for one side of an entry or note; blank shows as `(empty)`.
fn side_text(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        "(empty)".to_string()
    } else {
        truncate_text(text, 50)
    }
}

/// `text, audio`, or `nothing` for an all-off face.
fn media_summary(media: &MediaConfig) -> String {
    let parts: Vec<&str> = [
        (media.text, "text"),
        (media.image, "image"),
        (media.audio, "audio"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the inventory of a loaded list.
pub fn format_check_output(kind: ListKind, categories: &[Category], source: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let title = match kind {
        ListKind::Quiz => "Quiz",
        ListKind::Vocab => "Vocabulary",
    };
    lines.push(format!("{}: {}", title, source.display()));

    let mut invalid = 0;
    for (i, category) in categories.iter().enumerate() {
        lines.push(category_header(i + 1, &category.name, category.entries.len()));
        for (j, entry) in category.entries.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(j + 1),
                side_text(&entry.question),
                side_text(&entry.answer)
            ));
            lines.push(format!(
                "{}Front: {} | Back: {}",
                indent(2),
                media_summary(&entry.question_media),
                media_summary(&entry.answer_media)
            ));
            if let Err(e) = entry.validate() {
                invalid += 1;
                lines.push(format!("{}Invalid: {}", indent(2), e));
            }
        }
    }

    let total = crate::entry::entry_count(categories);
    lines.push(String::new());
    lines.push(format!(
        "{} in {}, {} invalid",
        count_noun(total, "entry", "entries"),
        count_noun(categories.len(), "category", "categories"),
        invalid
    ));
    lines
}

pub fn print_check_output(kind: ListKind, categories: &[Category], source: &Path) {
    print_lines(format_check_output(kind, categories, source));
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent<'_>) -> Vec<String> {
    match event {
        BuildEvent::EntryStarted {
            position,
            total,
            category,
            label,
        } => {
            let width = total.to_string().len().max(3);
            vec![format!(
                "[{:0>width$}/{:0>width$}] {}: {}",
                position,
                total,
                category,
                side_text(label),
                width = width
            )]
        }
        BuildEvent::MediaResolved { card, .. } => {
            let mut lines = Vec::new();
            for face in [&card.front, &card.back] {
                if let Some(name) = face.image_name() {
                    lines.push(format!("{}Image: {}", indent(1), name));
                }
                if let Some(name) = face.audio_name() {
                    lines.push(format!("{}Audio: {}", indent(1), name));
                }
            }
            lines
        }
        BuildEvent::EntrySkipped { warning, .. } => {
            let reason = warning
                .message
                .strip_prefix("skipped, ")
                .unwrap_or(&warning.message);
            vec![format!("{}Skipped: {}", indent(1), reason)]
        }
    }
}

pub fn print_build_event(event: &BuildEvent<'_>) {
    print_lines(format_build_event(event));
}

/// Format the end-of-run summary.
pub fn format_build_summary(
    summary: &PackageSummary,
    warnings: &[BuildWarning],
    cache: Option<CacheStats>,
) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Wrote {} ({}, {})",
            summary.path.display(),
            count_noun(summary.notes, "card", "cards"),
            count_noun(summary.media, "media file", "media files")
        ),
    ];
    if let Some(stats) = cache
        && stats.total() > 0
    {
        lines.push(format!("Media cache: {}", stats));
    }
    if !warnings.is_empty() {
        lines.push(format!(
            "Skipped {}",
            count_noun(warnings.len(), "entry", "entries")
        ));
        for warning in warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

pub fn print_build_summary(
    summary: &PackageSummary,
    warnings: &[BuildWarning],
    cache: Option<CacheStats>,
) {
    print_lines(format_build_summary(summary, warnings, cache));
}

// ============================================================================
// Analyze
// ============================================================================

fn header(title: &str) -> Vec<String> {
    vec![String::new(), title.to_string(), "=".repeat(title.chars().count())]
}

/// Format a full vocabulary analysis report.
pub fn format_analysis(analysis: &Analysis, source: &Path) -> Vec<String> {
    let stats = &analysis.stats;
    let mut lines = vec![format!("Vocabulary: {}", source.display())];

    lines.extend(header("Statistics"));
    lines.push(format!("Total words: {}", stats.total_words));
    lines.push(format!("Unique source words: {}", stats.unique_sources));
    lines.push(format!("Multi-category words: {}", stats.multi_category_words));
    lines.push(format!("Total categories: {}", stats.categories.len()));
    if stats.incomplete > 0 {
        lines.push(format!("Incomplete entries: {}", stats.incomplete));
    }

    lines.extend(header("Categories"));
    for (i, (category, count)) in analysis.category_distribution.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            category,
            count_noun(*count, "word", "words")
        ));
    }

    lines.extend(header("Duplicate Words"));
    if analysis.duplicates.is_empty() {
        lines.push("No duplicates found".to_string());
    }
    for dup in &analysis.duplicates {
        lines.push(format!(
            "{} \u{2192} {} (appears {} times)",
            dup.source, dup.target, dup.count
        ));
    }

    if !analysis.multi_category.is_empty() {
        lines.extend(header("Multi-Category Words"));
        for word in analysis.multi_category.iter().take(MULTI_CATEGORY_SHOWN) {
            lines.push(format!("{} \u{2192} {}", word.source, word.target));
            lines.push(format!("{}Categories: {}", indent(1), word.categories.join(", ")));
        }
        if analysis.multi_category.len() > MULTI_CATEGORY_SHOWN {
            lines.push(format!(
                "... and {} more",
                analysis.multi_category.len() - MULTI_CATEGORY_SHOWN
            ));
        }
    }

    lines.extend(header("Gender Distribution"));
    let gendered = analysis.gendered_words();
    if gendered == 0 {
        lines.push("No gender information found".to_string());
    } else {
        lines.push(format!("Words with gender information: {}", gendered));
        for (gender, count) in &analysis.gender_distribution {
            let percentage = *count as f64 / gendered as f64 * 100.0;
            lines.push(format!(
                "{}{:<10} {:>3} ({:>5.1}%)",
                indent(1),
                gender,
                count,
                percentage
            ));
        }
    }

    lines.extend(header("Recommendations"));
    if analysis.recommendations.is_empty() {
        lines.push("Vocabulary structure looks good!".to_string());
    }
    for (i, rec) in analysis.recommendations.iter().enumerate() {
        lines.push(format!("{}{}. {}", indent(1), i + 1, rec));
    }
    lines
}

pub fn print_analysis(analysis: &Analysis, source: &Path) {
    print_lines(format_analysis(analysis, source));
}

/// Format a filtered word list (`--search`, `--category`, `--gender`).
pub fn format_word_list(title: &str, words: &[&WordRecord]) -> Vec<String> {
    let mut lines = vec![
        title.to_string(),
        format!("Found {}", count_noun(words.len(), "word", "words")),
    ];
    for word in words {
        lines.push(String::new());
        lines.push(format!("{} \u{2192} {}", word.source, word.target));
        lines.push(format!("{}Categories: {}", indent(1), word.categories.join(", ")));
        if let Some(gender) = &word.gender {
            lines.push(format!("{}Gender: {}", indent(1), gender));
        }
        if let Some(plural) = &word.plural {
            lines.push(format!("{}Plural: {}", indent(1), plural));
        }
        if let Some(notes) = &word.notes {
            lines.push(format!("{}Notes: {}", indent(1), notes));
        }
    }
    lines
}

pub fn print_word_list(title: &str, words: &[&WordRecord]) {
    print_lines(format_word_list(title, words));
}

/// Format the result of loading a list into the word store.
///
/// ```text
/// Word store: words.sqlite (120 words)
///     Added 3 words, merged 1, skipped 0
/// ```
pub fn format_store_update(summary: &UpsertSummary, stored: usize, db: &Path) -> Vec<String> {
    vec![
        format!(
            "Word store: {} ({})",
            db.display(),
            count_noun(stored, "word", "words")
        ),
        format!(
            "{}Added {}, merged {}, skipped {}",
            indent(1),
            count_noun(summary.added, "word", "words"),
            summary.merged,
            summary.skipped
        ),
    ]
}

pub fn print_store_update(summary: &UpsertSummary, stored: usize, db: &Path) {
    print_lines(format_store_update(summary, stored, db));
}

// ============================================================================
// Inspect
// ============================================================================

/// Format the notes and media of a package.
pub fn format_inspect_output(contents: &PackageContents) -> Vec<String> {
    let mut lines = Vec::new();
    let deck = if contents.deck_names.is_empty() {
        "(unnamed)".to_string()
    } else {
        contents.deck_names.join(", ")
    };
    lines.push(format!(
        "Deck: {} ({}, {})",
        deck,
        count_noun(contents.notes.len(), "note", "notes"),
        count_noun(contents.media.len(), "media file", "media files")
    ));
    for (i, note) in contents.notes.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            side_text(&plain_text(&note.front)),
            side_text(&plain_text(&note.back))
        ));
        let media: Vec<&str> = contents
            .media
            .iter()
            .map(String::as_str)
            .filter(|name| note.front.contains(name) || note.back.contains(name))
            .collect();
        if !media.is_empty() {
            lines.push(format!("{}Media: {}", indent(1), media.join(", ")));
        }
        if !note.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), note.tags.join(" ")));
        }
    }
    lines
}

pub fn print_inspect_output(contents: &PackageContents) {
    print_lines(format_inspect_output(contents));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze;
    use crate::card::{ResolvedMedia, assemble};
    use crate::entry::Entry;
    use crate::package::StoredNote;
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn category_header_counts() {
        assert_eq!(category_header(1, "Presidents", 1), "001 Presidents (1 entry)");
        assert_eq!(category_header(2, "Capitals", 3), "002 Capitals (3 entries)");
    }

    #[test]
    fn truncate_text_long() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("abc", 3), "abc");
        assert_eq!(truncate_text("äöüß", 2), "äö...");
    }

    #[test]
    fn media_summary_lists_enabled() {
        assert_eq!(media_summary(&MediaConfig::default()), "text");
        assert_eq!(media_summary(&MediaConfig::none()), "nothing");
        let all = MediaConfig {
            text: true,
            audio: true,
            image: true,
        };
        assert_eq!(media_summary(&all), "text, image, audio");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_output_lists_entries_and_problems() {
        let categories = vec![Category::new(
            "Presidents",
            vec![
                Entry::new("Who was first?", "George Washington"),
                Entry::new("", "Abraham Lincoln"),
            ],
        )];
        let lines = format_check_output(ListKind::Quiz, &categories, Path::new("p.yaml"));
        assert_eq!(lines[0], "Quiz: p.yaml");
        assert_eq!(lines[1], "001 Presidents (2 entries)");
        assert_eq!(lines[2], "    001 Who was first? \u{2192} George Washington");
        assert_eq!(lines[3], "        Front: text | Back: text");
        assert_eq!(lines[4], "    002 (empty) \u{2192} Abraham Lincoln");
        assert_eq!(lines[6], "        Invalid: question text is empty");
        assert_eq!(lines.last().unwrap(), "2 entries in 1 category, 1 invalid");
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn build_event_lines() {
        let started = BuildEvent::EntryStarted {
            position: 3,
            total: 10,
            category: "animals",
            label: "dog".into(),
        };
        assert_eq!(format_build_event(&started), vec!["[003/010] animals: dog"]);

        let card = assemble(
            ResolvedMedia {
                image_path: Some(PathBuf::from("/w/images/dog_1.jpg")),
                ..ResolvedMedia::default()
            },
            ResolvedMedia {
                text: Some("Hund".into()),
                image_path: None,
                audio_path: Some(PathBuf::from("/w/audio/Hund_2.mp3")),
            },
        );
        let resolved = BuildEvent::MediaResolved {
            position: 3,
            card: &card,
        };
        assert_eq!(
            format_build_event(&resolved),
            vec!["    Image: dog_1.jpg", "    Audio: Hund_2.mp3"]
        );

        let warning = BuildWarning {
            category: "animals".into(),
            index: 2,
            message: "skipped, answer text is empty".into(),
        };
        let skipped = BuildEvent::EntrySkipped {
            position: 4,
            warning: &warning,
        };
        assert_eq!(
            format_build_event(&skipped),
            vec!["    Skipped: answer text is empty"]
        );
    }

    #[test]
    fn build_summary_lists_warnings() {
        let summary = PackageSummary {
            path: PathBuf::from("output/animals.apkg"),
            notes: 9,
            media: 1,
        };
        let warnings = vec![BuildWarning {
            category: "Mixed".into(),
            index: 5,
            message: "skipped, question text is empty".into(),
        }];
        let stats = CacheStats { hits: 2, misses: 1 };
        let lines = format_build_summary(&summary, &warnings, Some(stats));
        assert_eq!(lines[1], "Wrote output/animals.apkg (9 cards, 1 media file)");
        assert_eq!(lines[2], "Media cache: 2 reused, 1 fetched (3 total)");
        assert_eq!(lines[3], "Skipped 1 entry");
        assert_eq!(lines[4], "    Mixed #5: skipped, question text is empty");
    }

    #[test]
    fn build_summary_hides_unused_cache() {
        let summary = PackageSummary {
            path: PathBuf::from("a.apkg"),
            notes: 1,
            media: 0,
        };
        let lines = format_build_summary(&summary, &[], Some(CacheStats::default()));
        assert_eq!(lines.len(), 2);
    }

    // =========================================================================
    // Analyze
    // =========================================================================

    #[test]
    fn analysis_report_sections() {
        let words = vec![
            WordRecord {
                gender: Some("masculine".into()),
                ..WordRecord::pair("Hund", "dog")
            },
            WordRecord::pair("Hund", "dog"),
        ];
        let lines = format_analysis(&analyze(&words), Path::new("v.yaml"));
        assert!(lines.contains(&"Total words: 1".to_string()));
        assert!(lines.contains(&"Hund \u{2192} dog (appears 2 times)".to_string()));
        assert!(lines.contains(&"    masculine    1 (100.0%)".to_string()));
        assert!(lines.iter().any(|l| l.contains("Review 1 duplicate entries")));
    }

    #[test]
    fn word_list_shows_metadata() {
        let word = WordRecord {
            plural: Some("Hunde".into()),
            ..WordRecord::pair("Hund", "dog")
        };
        let lines = format_word_list("Search results for 'hund'", &[&word]);
        assert_eq!(lines[1], "Found 1 word");
        assert!(lines.contains(&"    Plural: Hunde".to_string()));
    }

    #[test]
    fn store_update_counts() {
        let summary = UpsertSummary {
            added: 1,
            merged: 2,
            skipped: 0,
        };
        assert_eq!(
            format_store_update(&summary, 1, Path::new("words.sqlite")),
            vec![
                "Word store: words.sqlite (1 word)",
                "    Added 1 word, merged 2, skipped 0"
            ]
        );
    }

    // =========================================================================
    // Inspect
    // =========================================================================

    #[test]
    fn inspect_shows_notes_and_their_media() {
        let contents = PackageContents {
            deck_names: vec!["animals".into()],
            notes: vec![StoredNote {
                front: r#"<div class="image"><img src="dog_1.jpg"></div>"#.into(),
                back: r#"<div class="text">Hund</div>[sound:Hund_2.mp3]"#.into(),
                tags: vec!["animals".into()],
            }],
            media: vec!["dog_1.jpg".into(), "Hund_2.mp3".into()],
        };
        let lines = format_inspect_output(&contents);
        assert_eq!(lines[0], "Deck: animals (1 note, 2 media files)");
        assert_eq!(lines[1], "001 (empty) \u{2192} Hund");
        assert_eq!(lines[2], "    Media: dog_1.jpg, Hund_2.mp3");
        assert_eq!(lines[3], "    Tags: animals");
    }
}
