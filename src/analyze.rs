//! Vocabulary analysis for `wordflash analyze`.
//!
//! Works on the [`WordRecord`]s of a vocabulary file and reports what a
//! list author wants to know before building a deck: how many words and
//! categories there are, which pairs are listed twice, which words sit in
//! several categories, and how grammatical gender is spread. Search and
//! filter helpers back the `--search`, `--category` and `--gender` flags.
//!
//! A word is identified by its lowercased source and target. Records that
//! share that key are one word: [`merge_words`] unions their categories and
//! fills gaps in gender, plural and notes from later records. Everything
//! except the duplicate report is computed on the merged words.
//!
//! Everything here is pure; printing lives in [`crate::output`].

use crate::loader::WordRecord;
use std::collections::{BTreeMap, HashMap};

/// Categories with fewer words than this are flagged as thin.
pub const SMALL_CATEGORY_WORDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyStats {
    pub total_words: usize,
    pub unique_sources: usize,
    pub multi_category_words: usize,
    /// Sorted, deduplicated.
    pub categories: Vec<String>,
    /// Records missing a source or target; excluded from everything else.
    pub incomplete: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub source: String,
    pub target: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub stats: VocabularyStats,
    pub duplicates: Vec<Duplicate>,
    pub multi_category: Vec<WordRecord>,
    pub category_distribution: BTreeMap<String, usize>,
    pub gender_distribution: BTreeMap<String, usize>,
    pub missing_gender: usize,
    pub recommendations: Vec<String>,
}

impl Analysis {
    pub fn gendered_words(&self) -> usize {
        self.gender_distribution.values().sum()
    }
}

/// Which side of a word `--search` looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    Source,
    Target,
    #[default]
    Both,
}

/// Identity of a word: `source:target`, lowercased.
pub fn word_key(word: &WordRecord) -> String {
    format!(
        "{}:{}",
        word.source.trim().to_lowercase(),
        word.target.trim().to_lowercase()
    )
}

/// Fold `other` into `existing`: categories are unioned in order, missing
/// gender, plural and notes are taken from `other`.
pub fn merge_into(existing: &mut WordRecord, other: &WordRecord) {
    for category in &other.categories {
        if !existing.categories.contains(category) {
            existing.categories.push(category.clone());
        }
    }
    fill(&mut existing.gender, &other.gender);
    fill(&mut existing.plural, &other.plural);
    fill(&mut existing.notes, &other.notes);
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty && value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
        *slot = value.clone();
    }
}

/// Complete records merged by [`word_key`], in order of first appearance.
pub fn merge_words(words: &[WordRecord]) -> Vec<WordRecord> {
    let mut merged: Vec<WordRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for word in words.iter().filter(|w| w.is_complete()) {
        match index.get(&word_key(word)) {
            Some(&i) => merge_into(&mut merged[i], word),
            None => {
                index.insert(word_key(word), merged.len());
                merged.push(word.clone());
            }
        }
    }
    merged
}

pub fn analyze(words: &[WordRecord]) -> Analysis {
    let incomplete = words.iter().filter(|w| !w.is_complete()).count();

    let mut pair_counts: Vec<(&WordRecord, usize)> = Vec::new();
    let mut pair_index: HashMap<String, usize> = HashMap::new();
    for word in words.iter().filter(|w| w.is_complete()) {
        let key = word_key(word);
        match pair_index.get(&key) {
            Some(&i) => pair_counts[i].1 += 1,
            None => {
                pair_index.insert(key, pair_counts.len());
                pair_counts.push((word, 1));
            }
        }
    }
    let duplicates = pair_counts
        .iter()
        .filter(|(_, count)| *count > 1)
        .map(|(word, count)| Duplicate {
            source: word.source.clone(),
            target: word.target.clone(),
            count: *count,
        })
        .collect();

    let complete = merge_words(words);

    let mut category_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut gender_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for word in &complete {
        let mut seen: Vec<&str> = Vec::new();
        for category in &word.categories {
            if !seen.contains(&category.as_str()) {
                seen.push(category);
                *category_distribution.entry(category.clone()).or_default() += 1;
            }
        }
        if let Some(gender) = word.gender.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            *gender_distribution.entry(gender.to_lowercase()).or_default() += 1;
        }
    }

    let multi_category: Vec<WordRecord> = complete
        .iter()
        .filter(|w| w.categories.len() > 1)
        .cloned()
        .collect();

    let mut sources: Vec<&str> = complete.iter().map(|w| w.source.as_str()).collect();
    sources.sort_unstable();
    sources.dedup();

    let stats = VocabularyStats {
        total_words: complete.len(),
        unique_sources: sources.len(),
        multi_category_words: multi_category.len(),
        categories: category_distribution.keys().cloned().collect(),
        incomplete,
    };
    let missing_gender = complete.len() - gender_distribution.values().sum::<usize>();

    let mut analysis = Analysis {
        stats,
        duplicates,
        multi_category,
        category_distribution,
        gender_distribution,
        missing_gender,
        recommendations: Vec::new(),
    };
    analysis.recommendations = recommendations(&analysis);
    analysis
}

fn recommendations(analysis: &Analysis) -> Vec<String> {
    let mut recs = Vec::new();
    if analysis.stats.incomplete > 0 {
        recs.push(format!(
            "Fix {} entries missing a word or translation",
            analysis.stats.incomplete
        ));
    }
    if !analysis.duplicates.is_empty() {
        recs.push(format!(
            "Review {} duplicate entries",
            analysis.duplicates.len()
        ));
    }
    if !analysis.multi_category.is_empty() {
        recs.push(format!(
            "Consider creating specialized decks for {} multi-category words",
            analysis.multi_category.len()
        ));
    }
    if analysis.missing_gender > 0 {
        recs.push(format!(
            "Add gender information for {} words",
            analysis.missing_gender
        ));
    }
    let thin = analysis
        .category_distribution
        .values()
        .filter(|&&count| count < SMALL_CATEGORY_WORDS)
        .count();
    if thin > 0 {
        recs.push(format!(
            "Consider expanding {} categories with few words",
            thin
        ));
    }
    recs
}

/// Case-insensitive substring search.
pub fn search<'a>(words: &'a [WordRecord], query: &str, field: SearchField) -> Vec<&'a WordRecord> {
    let query = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&query);
    words
        .iter()
        .filter(|w| match field {
            SearchField::Source => hit(&w.source),
            SearchField::Target => hit(&w.target),
            SearchField::Both => hit(&w.source) || hit(&w.target),
        })
        .collect()
}

pub fn by_category<'a>(words: &'a [WordRecord], category: &str) -> Vec<&'a WordRecord> {
    words
        .iter()
        .filter(|w| w.categories.iter().any(|c| c.eq_ignore_ascii_case(category)))
        .collect()
}

pub fn by_gender<'a>(words: &'a [WordRecord], gender: &str) -> Vec<&'a WordRecord> {
    words
        .iter()
        .filter(|w| {
            w.gender
                .as_deref()
                .is_some_and(|g| g.trim().eq_ignore_ascii_case(gender.trim()))
        })
        .collect()
}
