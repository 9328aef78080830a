//! Per-run media storage.
//!
//! Downloaded images and synthesized audio are written to a working
//! directory that lives exactly as long as the [`WorkDir`] value. The scoped
//! variant is a [`tempfile::TempDir`] created inside the output directory and
//! removed on drop, which covers normal completion, early returns and panics.
//!
//! Ctrl-C terminates the process without running destructors, so scratch
//! directories and unfinished packages are also registered in
//! [`leftovers`]. The handler installed by [`install_interrupt_cleanup`]
//! removes whatever is registered and exits with status 130.
//!
//! A kill that cannot be caught still leaves files behind. Scratch
//! directories carry the [`WORKDIR_PREFIX`] and unfinished packages the
//! [`PACKAGE_TMP_SUFFIX`], so [`sweep_stale`] discards them at the start of
//! the next run. Only one run per output directory is assumed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::TempDir;

pub const WORKDIR_PREFIX: &str = ".wordflash-work-";
pub const PACKAGE_TMP_SUFFIX: &str = ".apkg.tmp";

/// Exit status after an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

const IMAGES_DIR: &str = "images";
const AUDIO_DIR: &str = "audio";

#[derive(Debug)]
enum Storage {
    /// Removed when dropped.
    Scoped(TempDir),
    /// Left on disk for inspection (`keep_media`).
    Kept(PathBuf),
}

/// Working directory holding this run's media.
#[derive(Debug)]
pub struct WorkDir {
    storage: Storage,
}

impl WorkDir {
    /// Create a scratch directory inside `parent`, deleted on drop.
    pub fn scoped_in(parent: &Path) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(parent)?;
        leftovers().track(dir.path());
        let work = Self {
            storage: Storage::Scoped(dir),
        };
        work.create_layout()?;
        Ok(work)
    }

    /// Use `dir` as a persistent media directory.
    pub fn persistent(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let work = Self {
            storage: Storage::Kept(dir),
        };
        work.create_layout()?;
        Ok(work)
    }

    fn create_layout(&self) -> io::Result<()> {
        fs::create_dir_all(self.images_dir())?;
        fs::create_dir_all(self.audio_dir())
    }

    pub fn path(&self) -> &Path {
        match &self.storage {
            Storage::Scoped(dir) => dir.path(),
            Storage::Kept(dir) => dir,
        }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.path().join(IMAGES_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.path().join(AUDIO_DIR)
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self.storage, Storage::Scoped(_))
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Storage::Scoped(dir) = &self.storage {
            leftovers().untrack(dir.path());
        }
    }
}

/// Paths that must not outlive an interrupted run.
#[derive(Debug, Default)]
pub struct Leftovers {
    paths: Mutex<Vec<PathBuf>>,
}

impl Leftovers {
    pub const fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn track(&self, path: &Path) {
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_path_buf());
        }
    }

    pub fn untrack(&self, path: &Path) {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|p| p != path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p == path)
    }

    /// Remove every tracked file or directory and forget it. Returns how many
    /// existed and were removed.
    pub fn remove_all(&self) -> usize {
        let paths = std::mem::take(&mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner));
        let mut removed = 0;
        for path in paths {
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else if path.exists() {
                fs::remove_file(&path)
            } else {
                continue;
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
        removed
    }
}

static LEFTOVERS: Leftovers = Leftovers::new();

/// Process-wide registry cleaned by the interrupt handler.
pub fn leftovers() -> &'static Leftovers {
    &LEFTOVERS
}

/// On Ctrl-C, remove everything in [`leftovers`] and exit with
/// [`INTERRUPTED_EXIT_CODE`].
pub fn install_interrupt_cleanup() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        let removed = leftovers().remove_all();
        eprintln!("\nInterrupted, removed {} unfinished file(s)", removed);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// Remove scratch directories and package temp files left by interrupted runs.
///
/// Returns how many leftovers were removed. Entries that cannot be removed
/// are logged and skipped.
pub fn sweep_stale(parent: &Path) -> io::Result<usize> {
    if !parent.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let result = if name.starts_with(WORKDIR_PREFIX) && path.is_dir() {
            fs::remove_dir_all(&path)
        } else if name.ends_with(PACKAGE_TMP_SUFFIX) && path.is_file() {
            fs::remove_file(&path)
        } else {
            continue;
        };
        match result {
            Ok(()) => {
                log::info!("Removed leftover {}", path.display());
                removed += 1;
            }
            Err(e) => log::warn!("Could not remove leftover {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
