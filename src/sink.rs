//! Where finished files go.
//!
//! The export orchestrator hands every finished byte stream (a single
//! converted image or a whole archive) to a [`FileSink`] together with a
//! suggested file name. [`DirectorySink`] writes it into a directory.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Refusing to save '{0}': not a plain file name")]
    InvalidName(String),
}

pub trait FileSink: Sync {
    /// Save `bytes` under `name`, returning where they landed.
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError>;
}

/// Writes files into one directory, creating it on first use.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// One normal path component: no separators, no `.` or `..`.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl FileSink for DirectorySink {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        if !is_plain_file_name(name) {
            return Err(SinkError::InvalidName(name.to_string()));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
