//! Media cache for repeated runs.
//!
//! Image approval is the slow part of building a deck: every word costs a
//! search, a few downloads and a human decision. This module lets a later
//! run reuse what an earlier run already settled, so re-building a list
//! after adding three words only asks about those three.
//!
//! # Design
//!
//! Two kinds of media are cached:
//!
//! - **Approved images**, keyed by search term. A skipped or exhausted
//!   search is not cached, so the next run asks again.
//! - **Synthesized audio**, keyed by language and phrase.
//!
//! ## Cache keys
//!
//! Keys are SHA-256 digests over a kind tag and the inputs (see
//! [`image_key`] and [`audio_key`]). Changing the search term of an entry
//! therefore produces a fresh search, while renaming the input file or the
//! deck changes nothing.
//!
//! A cache hit requires:
//! 1. An entry with the key exists in the manifest
//! 2. The cached file is still on disk
//!
//! On a hit the cached file is copied into the run's working directory, so
//! the package never points into the cache itself.
//!
//! ## Storage
//!
//! The cache directory holds the media files plus a JSON manifest,
//! `manifest.json`. A corrupt or outdated manifest is treated as empty.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build`, or set `cache.enabled = false`, to search
//! and synthesize everything again. Nothing is read from or written to the
//! cache in that case.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the cache directory.
const MANIFEST_FILENAME: &str = "manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached media file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// File name inside the cache directory.
    pub file: String,
    /// What the file was made from: search term or phrase, for humans.
    pub label: String,
}

/// On-disk manifest mapping cache keys to files.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (first run or unreadable manifest).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(cache_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Ignoring unreadable cache manifest: {}", e);
                return Self::empty();
            }
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(cache_dir), json)
    }

    /// Cached file for `key`, if the manifest knows it and it is still on disk.
    pub fn find_cached(&self, key: &str, cache_dir: &Path) -> Option<PathBuf> {
        let entry = self.entries.get(key)?;
        let path = cache_dir.join(&entry.file);
        path.is_file().then_some(path)
    }

    pub fn insert(&mut self, key: String, file: String, label: String) {
        self.entries.insert(key, CacheEntry { file, label });
    }
}

/// Cache key for the approved image of a search term.
pub fn image_key(term: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"image\0");
    hasher.update(term.trim().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache key for a phrase spoken in a language.
pub fn audio_key(text: &str, lang: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"audio\0");
    hasher.update(lang.as_bytes());
    hasher.update(b"\0");
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache use for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} reused, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.misses)
        }
    }
}

/// Cache directory plus its loaded manifest.
#[derive(Debug)]
pub struct MediaCache {
    dir: PathBuf,
    manifest: CacheManifest,
    stats: CacheStats,
}

impl MediaCache {
    /// Open (creating if needed) the cache at `dir`.
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        let manifest = CacheManifest::load(&dir);
        log::debug!(
            "Media cache at {} with {} entries",
            dir.display(),
            manifest.entries.len()
        );
        Ok(Self {
            dir,
            manifest,
            stats: CacheStats::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Copy the cached file for `key` into `dest_dir`.
    ///
    /// Returns `None` on a miss. A failed copy is logged and counted as a miss.
    pub fn restore(&mut self, key: &str, dest_dir: &Path) -> Option<PathBuf> {
        let Some(cached) = self.manifest.find_cached(key, &self.dir) else {
            self.stats.miss();
            return None;
        };
        let Some(name) = cached.file_name() else {
            self.stats.miss();
            return None;
        };
        let dest = dest_dir.join(name);
        match std::fs::copy(&cached, &dest) {
            Ok(_) => {
                self.stats.hit();
                Some(dest)
            }
            Err(e) => {
                log::warn!("Could not restore {} from cache: {}", cached.display(), e);
                self.stats.miss();
                None
            }
        }
    }

    /// Copy `file` into the cache under `key`.
    pub fn store(&mut self, key: String, file: &Path, label: &str) -> io::Result<()> {
        let name = file
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "media path has no file name"))?
            .to_string_lossy()
            .into_owned();
        std::fs::copy(file, self.dir.join(&name))?;
        self.manifest.insert(key, name, label.to_string());
        Ok(())
    }

    /// Write the manifest back to disk.
    pub fn save(&self) -> io::Result<()> {
        self.manifest.save(&self.dir)
    }
}

/// Resolve the cache manifest path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}
