//! Zip packaging for bulk export.
//!
//! Entries are written in the order given. Directory entries implied by
//! entry names (`converted-images/` for `converted-images/a.webp`) are added
//! once, before the first file that lives in them.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// One named file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Package entries into a zip byte stream.
pub fn pack_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut dirs = BTreeSet::new();

    for entry in entries {
        for dir in parent_dirs(&entry.name) {
            if dirs.insert(dir.clone()) {
                writer.add_directory(dir, options)?;
            }
        }
        writer.start_file(entry.name.as_str(), options)?;
        writer.write_all(&entry.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// `a/b/c.png` → `["a/", "a/b/"]`
fn parent_dirs(name: &str) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut prefix = String::new();
    let mut parts: Vec<&str> = name.split('/').collect();
    parts.pop();
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        prefix.push_str(part);
        prefix.push('/');
        dirs.push(prefix.clone());
    }
    dirs
}
