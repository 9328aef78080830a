//! # WordFlash
//!
//! Turns a YAML vocabulary list or quiz into an Anki deck. Each card face
//! can carry text, a picture found by web search, and synthesized
//! pronunciation audio. Pictures go through an approval step where the
//! operator sees each candidate and accepts, rejects or skips it.
//!
//! # Architecture: One Pass Per Entry
//!
//! ```text
//! 1. Load      list.yaml   →  categories of entries   (document → structured data)
//! 2. Build     entries     →  cards                   (media resolved per face)
//! 3. Package   cards       →  deck.apkg               (SQLite collection + media, zipped)
//! ```
//!
//! Entries are processed strictly in file order, one at a time. Card order in
//! the package is the order of the input file minus the entries that were
//! skipped for missing text.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`loader`] | Reads quiz and vocabulary documents into ordered categories |
//! | [`entry`] | `Entry`, `Category` and per-face `MediaConfig` |
//! | [`resolve`] | Resolves one card face: text, approved image, synthesized audio |
//! | [`approval`] | The image approval gate and its state machine |
//! | [`media`] | Image search, speech synthesis and preview backends behind traits |
//! | [`cache`] | Media cache reused across runs |
//! | [`card`] | Assembles resolved faces into card HTML using Maud |
//! | [`deck`] | Walks categories in order and collects cards and warnings |
//! | [`package`] | Writes and reads Anki `.apkg` files |
//! | [`workdir`] | Scoped per-run media directory and leftover cleanup |
//! | [`analyze`] | Vocabulary statistics, duplicates and filters |
//! | [`store`] | SQLite word store that merges words across lists |
//! | [`config`] | `wordflash.toml` loading, merging and validation |
//! | [`naming`] | Media file names and deck names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Media Never Fails An Entry
//!
//! A search that finds nothing, a download that breaks, a TTS request that
//! times out: each leaves the face without that medium and logs a warning.
//! Only entries without question or answer text are skipped, and only an
//! unreadable input, an invalid config or an unwritable output ends the run.
//!
//! ## Backends Behind Traits
//!
//! [`media::ImageSearch`], [`media::SpeechSynthesizer`] and
//! [`media::Previewer`] are the seams to the outside world. The resolver and
//! the approval gate only see the traits, so every test runs against
//! recording mocks with no network and no display.
//!
//! ## Scoped Working Directory
//!
//! Media for a run is written to a [`tempfile::TempDir`] inside the output
//! directory and removed when the run ends. Ctrl-C removes it along with any
//! unfinished package before exiting. Leftovers of killed runs carry a fixed
//! prefix and are swept at the next start.
//!
//! ## Atomic Packages
//!
//! The `.apkg` is written next to its final path and renamed into place, so
//! an existing deck is either replaced completely or left untouched.

pub mod analyze;
pub mod approval;
pub mod cache;
pub mod card;
pub mod config;
pub mod deck;
pub mod entry;
pub mod loader;
pub mod media;
pub mod naming;
pub mod output;
pub mod package;
pub mod resolve;
pub mod store;
pub mod workdir;

#[cfg(test)]
pub(crate) mod test_helpers;
