//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every record is shown by its positional index and name first, with id,
//! dimensions and type as indented context lines. The same header shape is
//! used when listing the registry and when reporting export progress, so a
//! record reads the same in both places.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! 001 dawn.jpg
//!     Id: 0
//!     Size: 1600x1200 (natural 1600x1200)
//!     Type: image/jpeg
//! 002 dusk.png
//!     Id: 1
//!     Size: 800x600 (natural 1600x1200)
//!     Type: image/png
//! ```
//!
//! ## Export
//!
//! ```text
//! Converting 2 images to webp
//!     001 dawn.jpg → converted-images/converted-image-0.webp (1600x1200, 183 KB)
//!     002 dusk.png: FAILED (Failed to decode image: ...)
//! Saved out/converted-images.zip (1 entry)
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and are pure; `print_*` wrappers
//! write them out.

use crate::export::ExportEvent;
use crate::registry::{ImageRecord, Rejection};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Format the registry as a numbered inventory.
pub fn format_registry(records: &[ImageRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No images loaded".to_string()];
    }
    let mut lines = Vec::new();
    for (i, record) in records.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), record.name()));
        lines.push(format!("{}Id: {}", indent(1), record.id));
        lines.push(format!(
            "{}Size: {}x{} (natural {})",
            indent(1),
            record.width,
            record.height,
            record.natural
        ));
        lines.push(format!("{}Type: {}", indent(1), record.source.mime));
    }
    lines
}

pub fn print_registry(records: &[ImageRecord]) {
    for line in format_registry(records) {
        println!("{}", line);
    }
}

/// Format admission rejections as warnings.
pub fn format_rejections(rejected: &[Rejection]) -> Vec<String> {
    rejected
        .iter()
        .map(|r| format!("warning: skipped {}: {}", r.name, r.reason))
        .collect()
}

pub fn print_rejections(rejected: &[Rejection]) {
    for line in format_rejections(rejected) {
        eprintln!("{}", line);
    }
}

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { total, format } => {
            vec![format!("Converting {} to {}", plural(*total, "image", "images"), format)]
        }
        ExportEvent::Converted {
            index,
            name,
            entry,
            width,
            height,
            bytes,
            ..
        } => vec![format!(
            "{}{} {} → {} ({}x{}, {})",
            indent(1),
            format_index(*index),
            name,
            entry,
            width,
            height,
            human_size(*bytes)
        )],
        ExportEvent::Failed {
            index,
            name,
            reason,
            ..
        } => vec![format!(
            "{}{} {}: FAILED ({})",
            indent(1),
            format_index(*index),
            name,
            reason
        )],
        ExportEvent::Saved { path, entries } => vec![format!(
            "Saved {} ({})",
            path.display(),
            plural(*entries, "entry", "entries")
        )],
    }
}
