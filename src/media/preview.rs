//! Local image preview through an external viewer.

use super::backend::{MediaError, Previewer};
use std::path::Path;
use std::process::Command;

/// Opens images with a configured viewer command or the platform opener.
///
/// A configured viewer is split on whitespace and the image path appended,
/// so `viewer = "feh --scale-down"` works. The viewer runs detached; the
/// platform opener is waited on because it returns immediately anyway.
#[derive(Debug, Clone, Default)]
pub struct SystemPreviewer {
    viewer: Option<String>,
}

impl SystemPreviewer {
    pub fn new(viewer: Option<String>) -> Self {
        Self {
            viewer: viewer.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Command line used to show `path`, or why there is none.
    pub fn command_for(&self, path: &Path) -> Result<Command, MediaError> {
        if let Some(viewer) = &self.viewer {
            let mut parts = viewer.split_whitespace();
            let program = parts
                .next()
                .ok_or_else(|| MediaError::PreviewUnavailable("empty viewer command".into()))?;
            let mut cmd = Command::new(program);
            cmd.args(parts).arg(path);
            return Ok(cmd);
        }
        platform_opener(path)
    }
}

#[cfg(target_os = "macos")]
fn platform_opener(path: &Path) -> Result<Command, MediaError> {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    Ok(cmd)
}

#[cfg(target_os = "windows")]
fn platform_opener(path: &Path) -> Result<Command, MediaError> {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    Ok(cmd)
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_opener(path: &Path) -> Result<Command, MediaError> {
    let has_display = ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()));
    if !has_display {
        return Err(MediaError::PreviewUnavailable("no graphical display".into()));
    }
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    Ok(cmd)
}

impl Previewer for SystemPreviewer {
    fn preview(&self, path: &Path) -> Result<(), MediaError> {
        let mut cmd = self.command_for(path)?;
        if self.viewer.is_some() {
            cmd.spawn()?;
            return Ok(());
        }
        let status = cmd.status()?;
        if !status.success() {
            return Err(MediaError::PreviewUnavailable(format!(
                "opener exited with {status}"
            )));
        }
        Ok(())
    }
}
