use clap::{Parser, Subcommand};
use recast::config::{self, RecastConfig};
use recast::export::{self, ExportEvent};
use recast::format::TargetFormat;
use recast::imaging::RustBackend;
use recast::registry::{RecordId, Registry, SourceImage};
use recast::selection::Selection;
use recast::sink::DirectorySink;
use recast::{format, output};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

/// Inputs and config shared by commands that load images.
#[derive(clap::Args, Clone)]
struct LoadArgs {
    /// Image files or directories (directories are searched recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory containing recast.toml
    #[arg(long, default_value = ".")]
    config: PathBuf,
}

/// Registry edits, applied in the order: resize, set-width, set-height, remove, move.
#[derive(clap::Args, Clone, Default)]
struct EditArgs {
    /// Set both dimensions of one image, e.g. `--resize 0=640x480`
    #[arg(long, value_name = "ID=WxH", value_parser = parse_resize)]
    resize: Vec<(RecordId, u32, u32)>,

    /// Set the width of one image, e.g. `--set-width 0=640`
    #[arg(long, value_name = "ID=W", value_parser = parse_assignment)]
    set_width: Vec<(RecordId, u32)>,

    /// Set the height of one image, e.g. `--set-height 0=480`
    #[arg(long, value_name = "ID=H", value_parser = parse_assignment)]
    set_height: Vec<(RecordId, u32)>,

    /// Drop an image before exporting
    #[arg(long, value_name = "ID")]
    remove: Vec<RecordId>,

    /// Move the image at position FROM to position TO (0-based)
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    moves: Vec<(usize, usize)>,

    /// Turn off the aspect-ratio lock for single-dimension edits
    #[arg(long)]
    no_aspect_lock: bool,
}

#[derive(Parser)]
#[command(name = "recast")]
#[command(about = "Batch image format conversion")]
#[command(long_about = "\
Batch image format conversion

Load PNG, JPEG, WebP, BMP, GIF or TIFF images, resize and reorder them, and
convert them all to one format. Images get ids 0, 1, 2, ... in the order they
are loaded; use `recast list` to see them.

By default every image is converted and the results are written as one zip:

  out/converted-images.zip
  └── converted-images/
      ├── converted-image-0.webp
      └── converted-image-1.webp

With --only ID, just that image is converted and written as a plain file.

Run 'recast gen-config' to generate a documented recast.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert images and save them as a zip (or a single file with --only)
    Convert {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        edits: EditArgs,

        /// Target format: png, jpeg, webp, bmp, gif, tiff
        #[arg(long, short)]
        format: Option<TargetFormat>,

        /// Output width for every image
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        width: Option<u32>,

        /// Output height for every image
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        height: Option<u32>,

        /// JPEG quality (1-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,

        /// Export only this image, as a single file
        #[arg(long, value_name = "ID")]
        only: Option<RecordId>,

        /// Output directory
        #[arg(long, short, default_value = "out")]
        output: PathBuf,
    },
    /// Load images and show the resulting list
    List {
        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        edits: EditArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock recast.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            load,
            edits,
            format,
            width,
            height,
            quality,
            only,
            output,
        } => {
            let mut site_config = config::load_config(&load.config)?;
            if let Some(q) = quality {
                site_config.output.quality = q;
                site_config.validate()?;
            }
            init_thread_pool(&site_config.processing);

            let backend = RustBackend::new();
            let registry = load_registry(&backend, &load, &edits, &site_config)?;
            let selection = Selection::new(format.unwrap_or(site_config.output.format))
                .with_size(width, height);
            let options = site_config.export_options();
            let sink = DirectorySink::new(&output);

            let (tx, printer) = spawn_printer();
            let result = match only {
                Some(id) => export::export_single(
                    &backend,
                    &registry,
                    id,
                    &selection,
                    &options,
                    &sink,
                    Some(tx),
                )
                .map(|_| ()),
                None => {
                    export::export_bulk(&backend, &registry, &selection, &options, &sink, Some(tx))
                        .map(|report| {
                            if !report.failed.is_empty() {
                                eprintln!(
                                    "warning: {} of {} images could not be converted",
                                    report.failed.len(),
                                    report.failed.len() + report.converted.len()
                                );
                            }
                        })
                }
            };
            printer.join().ok();
            result?;
        }
        Command::List { load, edits, json } => {
            let site_config = config::load_config(&load.config)?;
            init_thread_pool(&site_config.processing);
            let backend = RustBackend::new();
            let registry = load_registry(&backend, &load, &edits, &site_config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(registry.list())?);
            } else {
                output::print_registry(registry.list());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Admit every input, report rejections, then apply edits.
fn load_registry(
    backend: &RustBackend,
    load: &LoadArgs,
    edits: &EditArgs,
    site_config: &RecastConfig,
) -> Result<Registry, Box<dyn std::error::Error>> {
    let mut registry =
        Registry::with_aspect_lock(site_config.resize.aspect_lock && !edits.no_aspect_lock);

    let files = collect_sources(&load.inputs)?;
    let outcome = registry.add(backend, files);
    output::print_rejections(&outcome.rejected);

    for &(id, w, h) in &edits.resize {
        registry.resize(id, w, h)?;
    }
    for &(id, w) in &edits.set_width {
        registry.set_width(id, w)?;
    }
    for &(id, h) in &edits.set_height {
        registry.set_height(id, h)?;
    }
    for &id in &edits.remove {
        registry.remove(id)?;
    }
    for &(from, to) in &edits.moves {
        registry.reorder(from, to)?;
    }
    Ok(registry)
}

/// Expand inputs into source images. Directories are walked recursively and
/// only files with a recognised image extension are picked up from them;
/// files named explicitly are always passed on so a bad type is reported.
fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<SourceImage>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| format::is_supported_mime(&format::declared_mime(p)))
                .collect();
            found.sort();
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(read_source(&path)?);
    }
    Ok(sources)
}

fn read_source(path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>> {
    SourceImage::from_path(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e).into())
}

/// Progress printer: drains export events on its own thread.
fn spawn_printer() -> (Sender<ExportEvent>, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_export_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn parse_assignment(s: &str) -> Result<(RecordId, u32), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{s}'"))?;
    let id = id.parse().map_err(|_| format!("invalid id '{id}'"))?;
    let value = value
        .parse()
        .map_err(|_| format!("invalid size '{value}'"))?;
    Ok((id, value))
}

fn parse_resize(s: &str) -> Result<(RecordId, u32, u32), String> {
    let (id, size) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=WxH, got '{s}'"))?;
    let id = id.parse().map_err(|_| format!("invalid id '{id}'"))?;
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{size}'"))?;
    let w = w.parse().map_err(|_| format!("invalid width '{w}'"))?;
    let h = h.parse().map_err(|_| format!("invalid height '{h}'"))?;
    Ok((id, w, h))
}

fn parse_move(s: &str) -> Result<(usize, usize), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{s}'"))?;
    let from = from
        .parse()
        .map_err(|_| format!("invalid position '{from}'"))?;
    let to = to.parse().map_err(|_| format!("invalid position '{to}'"))?;
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resize() {
        let (id, w, h) = parse_resize("3=640x480").unwrap();
        assert_eq!((id.value(), w, h), (3, 640, 480));
        assert!(parse_resize("3=640").is_err());
        assert!(parse_resize("x=1x1").is_err());
    }

    #[test]
    fn parses_assignment() {
        let (id, w) = parse_assignment("0=50").unwrap();
        assert_eq!((id.value(), w), (0, 50));
        assert!(parse_assignment("0:50").is_err());
    }

    #[test]
    fn parses_move() {
        assert_eq!(parse_move("2:0").unwrap(), (2, 0));
        assert!(parse_move("2-0").is_err());
    }

    #[test]
    fn cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "recast", "convert", "a.png", "b.jpg", "--format", "jpg", "--width", "100",
            "--resize", "0=10x20", "--move", "1:0", "--only", "1",
        ])
        .unwrap();
        match cli.command {
            Command::Convert {
                load,
                edits,
                format,
                width,
                only,
                ..
            } => {
                assert_eq!(load.inputs.len(), 2);
                assert_eq!(format, Some(TargetFormat::Jpeg));
                assert_eq!(width, Some(100));
                assert_eq!(edits.moves, vec![(1, 0)]);
                assert_eq!(only.map(|id| id.value()), Some(1));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn cli_rejects_zero_size_and_bad_quality() {
        for args in [
            ["recast", "convert", "a.png", "--width", "0"],
            ["recast", "convert", "a.png", "--height", "0"],
            ["recast", "convert", "a.png", "--quality", "0"],
            ["recast", "convert", "a.png", "--quality", "101"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?} should be rejected");
        }
        assert!(Cli::try_parse_from(["recast", "convert", "a.png", "--quality", "100"]).is_ok());
    }

    #[test]
    fn cli_requires_inputs() {
        assert!(Cli::try_parse_from(["recast", "list"]).is_err());
    }

    #[test]
    fn collect_sources_walks_directories_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("b.png"), b"b").unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"a").unwrap();
        std::fs::write(tmp.path().join("sub/c.gif"), b"c").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"skip").unwrap();

        let sources = collect_sources(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.gif"]);
        assert_eq!(sources[0].mime, "image/jpeg");
    }

    #[test]
    fn collect_sources_keeps_explicit_unsupported_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();
        let sources = collect_sources(&[path]).unwrap();
        assert_eq!(sources[0].mime, "application/octet-stream");
    }

    #[test]
    fn collect_sources_missing_file_errors() {
        let err = collect_sources(&[PathBuf::from("/nonexistent/x.png")]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.png"));
    }
}
