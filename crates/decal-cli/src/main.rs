//! Command-line interface for the decal modding toolkit.
//!
//! Wraps `decal-packer` and `decal-texture` behind two subcommands: `pack`
//! (re-emit a bundle archive from a directory of payload files) and
//! `convert-texture` (produce a texture payload from a source image and
//! update its sidecar). Library crates return typed errors; this binary is
//! the only place those are flattened into `anyhow::Result` for display.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use config::DecalConfig;
use decal_packer::BundleSkeleton;
use decal_texture::{ProcessBlockCompressor, TexturePipeline};

/// Decal mod bundle toolkit
#[derive(Debug, Parser)]
#[command(name = "decal", version, about)]
struct Cli {
    /// Logging verbosity
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Override the config file path (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Logging verbosity levels exposed on the CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// Only warnings and errors
    Warn,
    /// Normal operational messages
    Info,
    /// Verbose diagnostic output
    Debug,
    /// Everything, including per-entry tracing
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Re-emit a bundle archive from a directory of per-resource payload files
    Pack {
        /// Bundle directory containing the sidecar index and per-type payload folders
        #[arg(long)]
        bundle_dir: PathBuf,

        /// Directory the repacked archive is written into (defaults to the configured output dir)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Convert a source image into a texture payload and update its sidecar
    ConvertTexture {
        /// Source image (PNG/JPEG/TGA, or an already block-compressed raster)
        #[arg(long)]
        source: PathBuf,

        /// Target sidecar file to read format/dimensions from and update
        #[arg(long)]
        sidecar: PathBuf,

        /// Path to the external block-compressor binary (defaults to the configured path)
        #[arg(long)]
        compressor: Option<PathBuf>,

        /// Confirm resampling a non-power-of-two source to the nearest power of two
        #[arg(long)]
        confirm_resample: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_level.as_filter())
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => DecalConfig::default_path().context("resolving config path")?,
    };
    let config = DecalConfig::load(&config_path).context("loading config")?;

    match cli.command {
        Commands::Pack {
            bundle_dir,
            output_dir,
        } => run_pack(&bundle_dir, output_dir.or(config.output_dir).as_deref()),
        Commands::ConvertTexture {
            source,
            sidecar,
            compressor,
            confirm_resample,
        } => run_convert_texture(
            &source,
            &sidecar,
            compressor.or(config.compressor_path).as_deref(),
            confirm_resample,
        ),
    }
}

fn find_index_file(bundle_dir: &Path, bundle_name: &str) -> Result<PathBuf> {
    let named = bundle_dir.join(format!("IDs_{bundle_name}.BIN"));
    if named.is_file() {
        return Ok(named);
    }
    let generic = bundle_dir.join("IDs.BIN");
    if generic.is_file() {
        return Ok(generic);
    }
    bail!(
        "no sidecar index found in {} (tried IDs_{bundle_name}.BIN and IDs.BIN)",
        bundle_dir.display()
    );
}

fn run_pack(bundle_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let bundle_name = bundle_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("bundle directory has no name component")?;

    let index_path = find_index_file(bundle_dir, &bundle_name)?;
    tracing::info!(index = %index_path.display(), "reading bundle skeleton");

    let index_bytes = std::fs::read(&index_path)
        .with_context(|| format!("reading {}", index_path.display()))?;
    let skeleton = BundleSkeleton::parse(&index_bytes)
        .with_context(|| format!("parsing {}", index_path.display()))?;

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| bundle_dir.to_path_buf());
    std::fs::create_dir_all(&output_dir)?;
    let output_path = output_dir.join(format!("{bundle_name}.BIN"));

    skeleton
        .repack(bundle_dir, &output_path)
        .with_context(|| format!("repacking into {}", output_path.display()))?;

    tracing::info!(output = %output_path.display(), entries = skeleton.entries.len(), "wrote archive");
    Ok(())
}

fn run_convert_texture(
    source: &Path,
    sidecar: &Path,
    compressor_path: Option<&Path>,
    confirm_resample: bool,
) -> Result<()> {
    let compressor_path = compressor_path.context(
        "no compressor path given; pass --compressor or set compressor_path in the config file",
    )?;
    let compressor = ProcessBlockCompressor::new(compressor_path);
    let pipeline = TexturePipeline::new(&compressor);

    let job = pipeline
        .prepare(source, sidecar)
        .context("preparing texture conversion")?;

    if let decal_texture::DimensionPlan::NeedsPowerOfTwoConfirmation {
        suggested_width,
        suggested_height,
    } = job.dimension_plan()
    {
        if !confirm_resample {
            bail!(
                "source is not power-of-two; rerun with --confirm-resample to resample to {suggested_width}x{suggested_height}"
            );
        }
    }

    let outcome = job
        .run(confirm_resample)
        .context("converting texture")?;

    tracing::info!(
        payload = %outcome.payload_path.display(),
        width = outcome.width,
        height = outcome.height,
        "wrote texture payload"
    );
    Ok(())
}
