//! # recast
//!
//! Batch image format conversion. Load a set of raster images, arrange and
//! resize them, then convert the lot to one format and download them one by
//! one or as a single zip.
//!
//! # Architecture: Registry → Selection → Export
//!
//! ```text
//! 1. Admit     files     →  Registry       (type check, identify, assign ids)
//! 2. Edit      Registry  →  Registry       (resize, reorder, remove)
//! 3. Export    Registry  →  file or .zip   (convert each record, package, save)
//! ```
//!
//! Conversion itself is delegated to an [`ImageBackend`](imaging::ImageBackend):
//! decode, draw at the requested size, re-encode. Everything else is
//! bookkeeping around it, and all of that bookkeeping is testable against the
//! mock backend without touching pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`format`] | The six supported formats: MIME types, extensions, admission check |
//! | [`imaging`] | `ImageBackend` trait, the `image`-crate backend, aspect-ratio math |
//! | [`registry`] | Ordered list of admitted images with per-instance id counter |
//! | [`selection`] | Target format and optional global size, resolved per record |
//! | [`export`] | Single-file and bulk zip export, progress events |
//! | [`archive`] | Zip packaging |
//! | [`sink`] | `FileSink` trait and the directory writer |
//! | [`config`] | `recast.toml` loading, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures Stay Local
//!
//! A file that can't be admitted is reported and skipped. A record that fails
//! to convert during bulk export is reported and left out of the archive. No
//! single image can abort a batch.
//!
//! ## Parallel, Then Join
//!
//! Identification on admission and conversion on bulk export run on rayon's
//! pool. Results are collected before anything is applied, so the registry
//! and the archive both keep input order regardless of which image finished
//! first.
//!
//! ## Quality Only Where It Means Something
//!
//! JPEG is the only lossy target and the only one that takes a quality value
//! (default 80). WebP is written losslessly by the `image` crate encoder.

pub mod archive;
pub mod config;
pub mod export;
pub mod format;
pub mod imaging;
pub mod output;
pub mod registry;
pub mod selection;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_helpers;
