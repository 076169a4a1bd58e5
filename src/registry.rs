//! The image registry: an ordered, editable list of admitted images.
//!
//! Order is significant. Export walks records in registry order, and
//! [`Registry::reorder`] / [`Registry::move_onto`] are how a user rearranges
//! them.
//!
//! ## Ids
//!
//! Each registry owns its own counter. Ids are issued in admission order,
//! start at `0`, and are never reused, not even after [`Registry::remove`] or
//! [`Registry::clear`]. Two registries never share a counter.
//!
//! ## Admission
//!
//! [`Registry::add`] filters incoming files on their declared MIME type, then
//! identifies the admitted ones in parallel. Anything that fails either step
//! comes back as a [`Rejection`] instead of a record; nothing panics.
//!
//! ## Aspect lock
//!
//! With the lock on (the default), [`Registry::set_width`] and
//! [`Registry::set_height`] recompute the other dimension from the record's
//! natural aspect ratio. [`Registry::resize`] always sets both as given.

use crate::format::{self, TargetFormat};
use crate::imaging::{BackendError, Dimensions, ImageBackend, height_for_width, width_for_height};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no image with id {0}")]
    NotFound(RecordId),
    #[error("position {index} is out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Stable identifier of a record within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An uploaded file: name, declared MIME type, and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file, declaring its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, format::declared_mime(path), bytes))
    }

    pub fn declared_format(&self) -> Option<TargetFormat> {
        TargetFormat::from_mime(&self.mime)
    }
}

/// One tracked image with its current export dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub id: RecordId,
    #[serde(serialize_with = "serialize_source")]
    pub source: SourceImage,
    /// Decoded size. Never changes after admission.
    pub natural: Dimensions,
    pub width: u32,
    pub height: u32,
}

fn serialize_source<S: Serializer>(source: &SourceImage, serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeStruct;
    let mut s = serializer.serialize_struct("SourceImage", 3)?;
    s.serialize_field("name", &source.name)?;
    s.serialize_field("mime", &source.mime)?;
    s.serialize_field("size", &source.bytes.len())?;
    s.end()
}

impl ImageRecord {
    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType(String),
    Undecodable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedType(mime) => write!(f, "unsupported type {mime}"),
            RejectReason::Undecodable(msg) => write!(f, "could not be decoded ({msg})"),
        }
    }
}

/// A file that was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

/// What [`Registry::add`] did with each incoming file.
#[derive(Debug, Default)]
pub struct AddOutcome {
    pub added: Vec<RecordId>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug)]
pub struct Registry {
    records: Vec<ImageRecord>,
    next_id: u64,
    aspect_lock: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_aspect_lock(true)
    }

    pub fn with_aspect_lock(aspect_lock: bool) -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
            aspect_lock,
        }
    }

    pub fn aspect_lock(&self) -> bool {
        self.aspect_lock
    }

    pub fn set_aspect_lock(&mut self, locked: bool) {
        self.aspect_lock = locked;
    }

    /// Admit files: filter on declared type, identify, append in input order.
    pub fn add(&mut self, codec: &impl ImageBackend, files: Vec<SourceImage>) -> AddOutcome {
        let mut outcome = AddOutcome::default();

        let (accepted, unsupported): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|f| format::is_supported_mime(&f.mime));
        outcome
            .rejected
            .extend(unsupported.into_iter().map(|f| Rejection {
                reason: RejectReason::UnsupportedType(f.mime),
                name: f.name,
            }));

        let identified: Vec<(SourceImage, Result<Dimensions, BackendError>)> = accepted
            .into_par_iter()
            .map(|file| {
                let dims = codec.identify(&file.bytes);
                (file, dims)
            })
            .collect();

        for (file, dims) in identified {
            match dims {
                Ok(natural) => {
                    let id = self.issue_id();
                    self.records.push(ImageRecord {
                        id,
                        source: file,
                        natural,
                        width: natural.width,
                        height: natural.height,
                    });
                    outcome.added.push(id);
                }
                Err(e) => outcome.rejected.push(Rejection {
                    name: file.name,
                    reason: RejectReason::Undecodable(e.to_string()),
                }),
            }
        }

        outcome
    }

    fn issue_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    fn position(&self, id: RecordId) -> Result<usize, RegistryError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    fn record_mut(&mut self, id: RecordId) -> Result<&mut ImageRecord, RegistryError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    pub fn remove(&mut self, id: RecordId) -> Result<ImageRecord, RegistryError> {
        let pos = self.position(id)?;
        Ok(self.records.remove(pos))
    }

    /// Replace both stored dimensions. Source bytes are untouched.
    pub fn resize(&mut self, id: RecordId, width: u32, height: u32) -> Result<(), RegistryError> {
        let record = self.record_mut(id)?;
        record.width = width;
        record.height = height;
        Ok(())
    }

    /// Edit the width; with the aspect lock on, the height follows.
    pub fn set_width(&mut self, id: RecordId, width: u32) -> Result<Dimensions, RegistryError> {
        let locked = self.aspect_lock;
        let record = self.record_mut(id)?;
        record.width = width;
        if locked {
            record.height = height_for_width(record.natural, width);
        }
        Ok(record.dimensions())
    }

    /// Edit the height; with the aspect lock on, the width follows.
    pub fn set_height(&mut self, id: RecordId, height: u32) -> Result<Dimensions, RegistryError> {
        let locked = self.aspect_lock;
        let record = self.record_mut(id)?;
        record.height = height;
        if locked {
            record.width = width_for_height(record.natural, height);
        }
        Ok(record.dimensions())
    }

    /// Move the record at `from` to `to`, shifting the ones in between.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), RegistryError> {
        let len = self.records.len();
        for index in [from, to] {
            if index >= len {
                return Err(RegistryError::IndexOutOfRange { index, len });
            }
        }
        let record = self.records.remove(from);
        self.records.insert(to, record);
        Ok(())
    }

    /// Drag-and-drop style reorder: move `active` into the slot held by `over`.
    pub fn move_onto(&mut self, active: RecordId, over: RecordId) -> Result<(), RegistryError> {
        let from = self.position(active)?;
        let to = self.position(over)?;
        if from != to {
            self.reorder(from, to)?;
        }
        Ok(())
    }

    /// Drop every record. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn list(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
