//! Pronunciation audio via the Google Translate TTS endpoint.
//!
//! The endpoint only accepts short texts, so longer phrases are split on word
//! boundaries into chunks of at most [`MAX_CHUNK_CHARS`] characters. Each
//! chunk comes back as a standalone MP3 stream; MP3 frames concatenate
//! cleanly, so the chunks are simply appended into one file.
//!
//! Files are named after the phrase and keyed by language, and an existing
//! file is reused as is.

use super::backend::{MediaError, SpeechSynthesizer};
use crate::naming::media_filename_keyed;
use reqwest::blocking::Client;
use std::path::{Path, PathBuf};

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";
pub const MAX_CHUNK_CHARS: usize = 100;

pub struct GoogleTts {
    client: Client,
    slow: bool,
}

impl GoogleTts {
    pub fn new(client: Client, slow: bool) -> Self {
        Self { client, slow }
    }

    fn fetch_chunk(
        &self,
        chunk: &str,
        lang: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, MediaError> {
        let speed = if self.slow { "0.24" } else { "1" };
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let bytes = self
            .client
            .get(TTS_ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("q", chunk),
                ("tl", lang),
                ("ttsspeed", speed),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()?
            .error_for_status()?
            .bytes()?;
        if bytes.is_empty() {
            return Err(MediaError::EmptyResponse(TTS_ENDPOINT.to_string()));
        }
        Ok(bytes.to_vec())
    }
}

/// File name for a phrase spoken in `lang`.
pub fn audio_filename(text: &str, lang: &str) -> String {
    media_filename_keyed(text, &format!("{lang}:{text}"), "mp3")
}

impl SpeechSynthesizer for GoogleTts {
    fn synthesize(&self, text: &str, lang: &str, dest_dir: &Path) -> Result<PathBuf, MediaError> {
        let path = dest_dir.join(audio_filename(text, lang));
        if path.exists() {
            return Ok(path);
        }
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(MediaError::EmptyResponse("nothing to speak".into()));
        }
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, lang, idx, chunks.len())?);
        }
        std::fs::write(&path, audio)?;
        log::debug!("Synthesized '{}' ({}) -> {}", text, lang, path.display());
        Ok(path)
    }
}

/// Split `text` into chunks of at most `max` characters on word boundaries.
///
/// Words longer than `max` are cut hard. Whitespace is normalized to single
/// spaces; empty input yields no chunks.
pub fn split_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
