//! Font file I/O shared by the pipeline stages.

use std::{
    fs::{create_dir_all, read, remove_file, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;
use log::{debug, warn};

/// A font file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().unwrap_or_default().to_string_lossy().into_owned()
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Writes `data`, creating the parent directory first.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data)
            .with_context(|| format!("Failed to write font: {}", self.path.display()))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Find fonts matching a glob pattern in a directory.
pub fn glob_fonts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    let mut paths: Vec<_> = glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();
    Ok(paths)
}

/// Files written during one style pass, removed once the pass is over.
#[derive(Debug, Default)]
pub struct Intermediates {
    paths: Vec<PathBuf>,
}

impl Intermediates {
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Deletes every recorded file; failures are logged, not returned.
    pub fn remove_all(&mut self) {
        for path in self.paths.drain(..) {
            match remove_file(&path) {
                Ok(()) => debug!("Removed intermediate {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {e}", path.display()),
            }
        }
    }
}

impl Drop for Intermediates {
    fn drop(&mut self) {
        self.remove_all();
    }
}
