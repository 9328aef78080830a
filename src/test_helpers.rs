//! Shared test utilities for the wordflash test suite.
//!
//! Fixture lists live under `fixtures/` at the crate root:
//!
//! ```text
//! fixtures/
//! ├── wordflash.toml     # auto approval, German → English
//! ├── quiz.yaml          # Presidents, Capitals
//! └── animals_de.yaml    # vocabulary with genders and categories
//! ```
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (_, categories) = load_categories(&fixture_path("quiz.yaml"), ...).unwrap();
//! let presidents = find_category(&categories, "Presidents");
//! assert_eq!(presidents.entries.len(), 3);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::entry::Category;

// =========================================================================
// Fixture setup
// =========================================================================

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Absolute path of a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for entry in std::fs::read_dir(fixtures_dir()).unwrap() {
        let entry = entry.unwrap();
        if entry.path().is_file() {
            std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
        }
    }
    tmp
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a category by name. Panics if not found.
pub fn find_category<'a>(categories: &'a [Category], name: &str) -> &'a Category {
    categories
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| {
            let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
            panic!("category '{name}' not found. Available: {names:?}")
        })
}

/// Question texts of a category, in order.
pub fn questions(category: &Category) -> Vec<&str> {
    category.entries.iter().map(|e| e.question.as_str()).collect()
}
