//! Media collaborator traits and shared types.
//!
//! The resolver only talks to these three traits, so the rest of the
//! pipeline never knows which web service or viewer sits behind them:
//!
//! | Trait | Production implementation |
//! |---|---|
//! | [`ImageSearch`] | [`WebImageSearch`](super::web_search::WebImageSearch) (Pixabay + fallbacks) |
//! | [`SpeechSynthesizer`] | [`GoogleTts`](super::tts::GoogleTts) |
//! | [`Previewer`] | [`SystemPreviewer`](super::preview::SystemPreviewer) |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not an image: {0}")]
    NotAnImage(String),
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    #[error("Preview unavailable: {0}")]
    PreviewUnavailable(String),
}

/// One image search result, in relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub source_url: String,
    /// Set once the candidate has been downloaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

impl ImageCandidate {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            local_path: None,
        }
    }
}

/// Image lookup and download.
pub trait ImageSearch {
    /// Search for images of `term`, best match first. May return nothing.
    fn search(&self, term: &str) -> Result<Vec<ImageCandidate>, MediaError>;

    /// Download a candidate into `dest_dir` and return the local file.
    ///
    /// Implementations must reject payloads that are not decodable images.
    fn download(
        &self,
        candidate: &ImageCandidate,
        term: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, MediaError>;
}

/// Text-to-speech.
pub trait SpeechSynthesizer {
    /// Speak `text` in `lang` and return the audio file written to `dest_dir`.
    fn synthesize(&self, text: &str, lang: &str, dest_dir: &Path) -> Result<PathBuf, MediaError>;
}

/// Shows a local image to the operator.
pub trait Previewer {
    fn preview(&self, path: &Path) -> Result<(), MediaError>;
}
