//! Export orchestration: single-file download and bulk zip.
//!
//! ## Single
//!
//! [`export_single`] converts one record and hands the result to the sink as
//! `converted-image-<id>.<ext>`. Failure is returned to the caller.
//!
//! ## Bulk
//!
//! [`export_bulk`] converts every record in parallel, waits for all of them,
//! then packages the successes into one archive:
//!
//! ```text
//! converted-images.zip
//! └── converted-images/
//!     ├── converted-image-0.webp
//!     └── converted-image-1.webp
//! ```
//!
//! A record that fails to convert is reported and left out; the rest of the
//! batch is unaffected. Entries keep registry order.
//!
//! ## Progress
//!
//! Both paths accept an optional `Sender<ExportEvent>`. The binary drains it on
//! a printer thread; library callers can pass `None`.

use crate::archive::{self, ArchiveEntry, ArchiveError};
use crate::format::TargetFormat;
use crate::imaging::{
    BackendError, ConvertParams, EncodedImage, Filter, ImageBackend, Quality,
};
use crate::registry::{ImageRecord, RecordId, Registry, RegistryError};
use crate::selection::Selection;
use crate::sink::{FileSink, SinkError};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Converting image {id} failed: {source}")]
    Conversion {
        id: RecordId,
        #[source]
        source: BackendError,
    },
    #[error("Archive packaging failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Saving failed: {0}")]
    Sink(#[from] SinkError),
    #[error("Nothing to export: no images loaded")]
    EmptyRegistry,
}

/// File names used for exported output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub archive_name: String,
    pub archive_folder: String,
    pub entry_prefix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            archive_name: "converted-images.zip".to_string(),
            archive_folder: "converted-images".to_string(),
            entry_prefix: "converted-image".to_string(),
        }
    }
}

impl Naming {
    /// `converted-image-3.webp`
    pub fn file_name(&self, id: RecordId, format: TargetFormat) -> String {
        format!("{}-{}.{}", self.entry_prefix, id, format.extension())
    }

    /// `converted-images/converted-image-3.webp`, or the bare file name when
    /// no folder is configured.
    pub fn entry_name(&self, id: RecordId, format: TargetFormat) -> String {
        let file = self.file_name(id, format);
        if self.archive_folder.is_empty() {
            file
        } else {
            format!("{}/{}", self.archive_folder, file)
        }
    }
}

/// Encoding settings shared by every conversion in a run.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub quality: Quality,
    pub filter: Filter,
    pub naming: Naming,
}

/// Progress of an export, in the order things happen.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Started {
        total: usize,
        format: TargetFormat,
    },
    Converted {
        /// 1-based position in the registry.
        index: usize,
        id: RecordId,
        name: String,
        entry: String,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Failed {
        index: usize,
        id: RecordId,
        name: String,
        reason: String,
    },
    Saved {
        path: PathBuf,
        entries: usize,
    },
}

#[derive(Debug)]
pub struct SingleReport {
    pub id: RecordId,
    pub path: PathBuf,
    pub image: EncodedImage,
}

#[derive(Debug)]
pub struct BulkReport {
    pub archive: PathBuf,
    pub converted: Vec<RecordId>,
    pub failed: Vec<(RecordId, String)>,
}

fn emit(events: Option<&Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        // Receiver gone just means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Convert one record at the size the selection resolves to.
pub fn convert_record(
    codec: &impl ImageBackend,
    record: &ImageRecord,
    selection: &Selection,
    aspect_lock: bool,
    options: &ExportOptions,
) -> Result<EncodedImage, BackendError> {
    let size = selection.resolve(record, aspect_lock);
    codec.convert(&ConvertParams {
        source: record.source.bytes.clone(),
        format: selection.format,
        width: size.width,
        height: size.height,
        quality: options.quality,
        filter: options.filter,
    })
}

/// Convert one record and save it as its own file.
pub fn export_single(
    codec: &impl ImageBackend,
    registry: &Registry,
    id: RecordId,
    selection: &Selection,
    options: &ExportOptions,
    sink: &impl FileSink,
    events: Option<Sender<ExportEvent>>,
) -> Result<SingleReport, ExportError> {
    let index = registry
        .list()
        .iter()
        .position(|r| r.id == id)
        .ok_or(RegistryError::NotFound(id))?;
    let record = &registry.list()[index];
    emit(
        events.as_ref(),
        ExportEvent::Started {
            total: 1,
            format: selection.format,
        },
    );

    let image = match convert_record(codec, record, selection, registry.aspect_lock(), options) {
        Ok(image) => image,
        Err(source) => {
            emit(
                events.as_ref(),
                ExportEvent::Failed {
                    index: index + 1,
                    id,
                    name: record.name().to_string(),
                    reason: source.to_string(),
                },
            );
            return Err(ExportError::Conversion { id, source });
        }
    };

    let file_name = options.naming.file_name(id, selection.format);
    emit(
        events.as_ref(),
        ExportEvent::Converted {
            index: index + 1,
            id,
            name: record.name().to_string(),
            entry: file_name.clone(),
            width: image.width,
            height: image.height,
            bytes: image.bytes.len(),
        },
    );
    let path = sink.save(&file_name, &image.bytes)?;
    emit(
        events.as_ref(),
        ExportEvent::Saved {
            path: path.clone(),
            entries: 1,
        },
    );
    Ok(SingleReport { id, path, image })
}

/// Convert every record, then zip the successes and save the archive.
pub fn export_bulk(
    codec: &impl ImageBackend,
    registry: &Registry,
    selection: &Selection,
    options: &ExportOptions,
    sink: &impl FileSink,
    events: Option<Sender<ExportEvent>>,
) -> Result<BulkReport, ExportError> {
    if registry.is_empty() {
        return Err(ExportError::EmptyRegistry);
    }
    let aspect_lock = registry.aspect_lock();
    emit(
        events.as_ref(),
        ExportEvent::Started {
            total: registry.len(),
            format: selection.format,
        },
    );

    // All conversions are in flight at once; collect() is the join point.
    let results: Vec<(&ImageRecord, Result<EncodedImage, BackendError>)> = registry
        .list()
        .par_iter()
        .enumerate()
        .map_with(events.clone(), |tx, (i, record)| {
            let result = convert_record(codec, record, selection, aspect_lock, options);
            let event = match &result {
                Ok(image) => ExportEvent::Converted {
                    index: i + 1,
                    id: record.id,
                    name: record.name().to_string(),
                    entry: options.naming.entry_name(record.id, selection.format),
                    width: image.width,
                    height: image.height,
                    bytes: image.bytes.len(),
                },
                Err(e) => ExportEvent::Failed {
                    index: i + 1,
                    id: record.id,
                    name: record.name().to_string(),
                    reason: e.to_string(),
                },
            };
            emit(tx.as_ref(), event);
            (record, result)
        })
        .collect();

    let mut entries = Vec::new();
    let mut converted = Vec::new();
    let mut failed = Vec::new();
    for (record, result) in results {
        match result {
            Ok(image) => {
                entries.push(ArchiveEntry {
                    name: options.naming.entry_name(record.id, selection.format),
                    bytes: image.bytes,
                });
                converted.push(record.id);
            }
            Err(e) => failed.push((record.id, e.to_string())),
        }
    }

    let archive_bytes = archive::pack_zip(&entries)?;
    let path = sink.save(&options.naming.archive_name, &archive_bytes)?;
    emit(
        events.as_ref(),
        ExportEvent::Saved {
            path: path.clone(),
            entries: entries.len(),
        },
    );

    Ok(BulkReport {
        archive: path,
        converted,
        failed,
    })
}
