//! Media resolution for one card face.
//!
//! [`MediaResolver::resolve`] turns a face's text and [`MediaConfig`] into
//! [`ResolvedMedia`]:
//!
//! - **text**: copied verbatim.
//! - **audio**: the face text (or its search term, see [`AudioSource`]) is
//!   synthesized in the face language. Failure leaves the face silent.
//! - **image**: candidates for the search term go through the
//!   [`ApprovalGate`]. Search failure, rejection of every candidate, or a
//!   skip leave the face without an image.
//!
//! Nothing in here is fatal. Every failure degrades the face and is logged,
//! so one bad entry never stops a deck.
//!
//! An image accepted for a search term is reused for every later face with
//! the same term in the run, so a repeated word never re-downloads over a
//! picture an earlier card already shows.
//!
//! With a [`MediaCache`], an image approved in an earlier run for the same
//! search term is reused without searching or asking again, and audio for
//! the same phrase and language is not synthesized twice.

use crate::approval::{ApprovalGate, Selection};
use crate::cache::{MediaCache, audio_key, image_key};
use crate::card::ResolvedMedia;
use crate::config::{AudioSource, WordflashConfig};
use crate::entry::MediaConfig;
use crate::media::{ImageSearch, SpeechSynthesizer};
use crate::workdir::WorkDir;
use std::collections::HashMap;
use std::path::PathBuf;

/// Run-wide switches layered over the per-face media config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub images: bool,
    pub audio: bool,
    pub audio_source: AudioSource,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            images: true,
            audio: true,
            audio_source: AudioSource::Text,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &WordflashConfig) -> Self {
        Self {
            images: config.images.enabled,
            audio: config.audio.enabled,
            audio_source: config.audio.source,
        }
    }
}

pub struct MediaResolver<'a> {
    images: &'a dyn ImageSearch,
    speech: &'a dyn SpeechSynthesizer,
    gate: ApprovalGate<'a>,
    workdir: &'a WorkDir,
    cache: Option<&'a mut MediaCache>,
    /// Images accepted in this run, by image cache key.
    accepted: HashMap<String, PathBuf>,
    options: ResolveOptions,
}

impl<'a> MediaResolver<'a> {
    pub fn new(
        images: &'a dyn ImageSearch,
        speech: &'a dyn SpeechSynthesizer,
        gate: ApprovalGate<'a>,
        workdir: &'a WorkDir,
    ) -> Self {
        Self {
            images,
            speech,
            gate,
            workdir,
            cache: None,
            accepted: HashMap::new(),
            options: ResolveOptions::default(),
        }
    }

    pub fn with_cache(mut self, cache: &'a mut MediaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve one face.
    ///
    /// `search_term` overrides `text` for the image search; `lang` is the
    /// speech language of this face.
    pub fn resolve(
        &mut self,
        text: &str,
        config: &MediaConfig,
        search_term: Option<&str>,
        lang: &str,
    ) -> ResolvedMedia {
        let search_term = search_term.map(str::trim).filter(|t| !t.is_empty());
        let mut media = ResolvedMedia::default();

        if config.text {
            media.text = Some(text.to_string());
        }
        if config.image && self.options.images {
            media.image_path = self.resolve_image(search_term.unwrap_or(text));
        }
        if config.audio && self.options.audio {
            let phrase = match self.options.audio_source {
                AudioSource::Text => text,
                AudioSource::SearchTerm => search_term.unwrap_or(text),
            };
            media.audio_path = self.resolve_audio(phrase, lang);
        }
        media
    }

    fn resolve_image(&mut self, term: &str) -> Option<PathBuf> {
        let dest = self.workdir.images_dir();
        let key = image_key(term);
        if let Some(path) = self.accepted.get(&key).filter(|p| p.exists()) {
            log::debug!("Reusing image accepted earlier for '{}'", term);
            return Some(path.clone());
        }
        if let Some(cache) = self.cache.as_deref_mut()
            && let Some(path) = cache.restore(&key, &dest)
        {
            log::debug!("Reusing cached image for '{}'", term);
            self.accepted.insert(key, path.clone());
            return Some(path);
        }

        let candidates = match self.images.search(term) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Image search for '{}' failed: {}", term, e);
                return None;
            }
        };
        if candidates.is_empty() {
            log::warn!("No images found for '{}'", term);
            return None;
        }

        let images = self.images;
        match self
            .gate
            .select(term, &candidates, |c| images.download(c, term, &dest))
        {
            Selection::Accepted { candidate, path } => {
                log::info!("Image for '{}': {}", term, candidate.source_url);
                self.accepted.insert(key.clone(), path.clone());
                if let Some(cache) = self.cache.as_deref_mut()
                    && let Err(e) = cache.store(key, &path, term)
                {
                    log::warn!("Could not cache image for '{}': {}", term, e);
                }
                Some(path)
            }
            Selection::Exhausted => {
                log::warn!("No acceptable image for '{}'", term);
                None
            }
            Selection::Skipped => {
                log::info!("Image skipped for '{}'", term);
                None
            }
        }
    }

    fn resolve_audio(&mut self, phrase: &str, lang: &str) -> Option<PathBuf> {
        let dest = self.workdir.audio_dir();
        let key = audio_key(phrase, lang);
        if let Some(cache) = self.cache.as_deref_mut()
            && let Some(path) = cache.restore(&key, &dest)
        {
            return Some(path);
        }
        match self.speech.synthesize(phrase, lang, &dest) {
            Ok(path) => {
                if let Some(cache) = self.cache.as_deref_mut()
                    && let Err(e) = cache.store(key, &path, phrase)
                {
                    log::warn!("Could not cache audio for '{}': {}", phrase, e);
                }
                Some(path)
            }
            Err(e) => {
                log::warn!("Audio synthesis for '{}' ({}) failed: {}", phrase, lang, e);
                None
            }
        }
    }
}
