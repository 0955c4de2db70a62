#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use quire::{ConversionOptions, FitMode, Orientation, PageSize, Rgb, SortOrder, SourceImage};

/// Per-file size ceiling, enforced before the pipeline runs.
const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "quire", version, about = "Deterministic image-to-PDF converter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// combine images into a single PDF
    Convert {
        /// input image files or dirs (jpg, png, webp, tiff, bmp)
        images: Vec<PathBuf>,

        /// output PDF path (default: derived from the input names)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// page size
        #[arg(long, value_enum, default_value_t = PageSize::A4)]
        page_size: PageSize,

        /// page orientation
        #[arg(long, value_enum, default_value_t = Orientation::Portrait)]
        orientation: Orientation,

        /// uniform page margin in points (0-200)
        #[arg(long, default_value_t = 36.0)]
        margins: f32,

        /// image fit mode within the margins
        #[arg(long, value_enum, default_value_t = FitMode::Contain)]
        fit: FitMode,

        /// DPI used to size pages from pixel dimensions in auto mode (72-600)
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(72..=600))]
        dpi: u32,

        /// page background color as #RRGGBB
        #[arg(long, default_value = "#FFFFFF")]
        bg_color: String,

        /// page ordering
        #[arg(long, value_enum, default_value_t = SortOrder::Uploaded)]
        order: SortOrder,
    },
    /// generate shell completions
    Completions {
        /// shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// expand dirs in the input list into name-sorted image files
fn expand_image_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff", "tif", "bmp"];
    let mut result = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Cannot read directory: {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                })
                .collect();
            entries.sort();
            anyhow::ensure!(
                !entries.is_empty(),
                "No image files found in {}",
                path.display()
            );
            result.extend(entries);
        } else {
            result.push(path.clone());
        }
    }
    Ok(result)
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceImage>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let size = std::fs::metadata(path)
            .with_context(|| format!("Cannot stat {}", path.display()))?
            .len();
        anyhow::ensure!(
            size <= MAX_FILE_BYTES,
            "{} exceeds the 50MB per-file limit",
            path.display()
        );
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        sources.push(SourceImage { bytes, filename });
    }
    Ok(sources)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            images,
            output,
            page_size,
            orientation,
            margins,
            fit,
            dpi,
            bg_color,
            order,
        } => {
            anyhow::ensure!(!images.is_empty(), "No input images provided");
            let paths = expand_image_paths(&images)?;
            let sources = read_sources(&paths)?;

            let options = ConversionOptions {
                page_size,
                orientation,
                margins,
                fit,
                dpi,
                bg_color: Rgb::parse(&bg_color)?,
                order,
            };

            let converted = quire::images_to_pdf(sources, &options)?;
            let out_path = output.unwrap_or_else(|| PathBuf::from(&converted.filename));
            std::fs::write(&out_path, &converted.bytes)
                .with_context(|| format!("Failed to save {}", out_path.display()))?;
            eprintln!(
                "Wrote {} page(s) -> {}",
                converted.pages,
                out_path.display()
            );
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "quire",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
