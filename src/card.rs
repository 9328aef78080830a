//! Card assembly.
//!
//! A card face is rendered from the media resolved for it, always in the
//! same order: text, then the image, then the audio clip. Anki stores media
//! flat next to the collection, so faces reference files by name only:
//!
//! ```html
//! <div class="text">der Hund</div>
//! <div class="image"><img src="dog_1a2b3c4d.jpg"></div>
//! [sound:Hund_5e6f7a8b.mp3]
//! ```
//!
//! Assembly is pure. It never touches the files, and identical input gives
//! identical output.

use maud::html;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Media gathered for one face. Absent media is `None`, never an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub text: Option<String>,
    pub image_path: Option<PathBuf>,
    pub audio_path: Option<PathBuf>,
}

impl ResolvedMedia {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image_path.is_none() && self.audio_path.is_none()
    }

    pub fn image_name(&self) -> Option<String> {
        self.image_path.as_deref().and_then(file_name)
    }

    pub fn audio_name(&self) -> Option<String> {
        self.audio_path.as_deref().and_then(file_name)
    }

    /// Local media files of this face, image first.
    pub fn media_paths(&self) -> impl Iterator<Item = &Path> {
        self.image_path
            .as_deref()
            .into_iter()
            .chain(self.audio_path.as_deref())
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub front: ResolvedMedia,
    pub back: ResolvedMedia,
    pub front_html: String,
    pub back_html: String,
    pub tags: Vec<String>,
}

impl Card {
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn media_paths(&self) -> impl Iterator<Item = &Path> {
        self.front.media_paths().chain(self.back.media_paths())
    }
}

/// Build a card from its two faces.
pub fn assemble(front: ResolvedMedia, back: ResolvedMedia) -> Card {
    Card {
        front_html: render_face(&front),
        back_html: render_face(&back),
        front,
        back,
        tags: Vec::new(),
    }
}

/// Render one face as Anki field HTML. An empty face renders as "".
pub fn render_face(face: &ResolvedMedia) -> String {
    html! {
        @if let Some(text) = &face.text {
            div.text { (text) }
        }
        @if let Some(name) = face.image_name() {
            div.image { img src=(name); }
        }
        @if let Some(name) = face.audio_name() {
            "[sound:" (name) "]"
        }
    }
    .into_string()
}
